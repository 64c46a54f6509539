use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{
    load_environment_config, load_server_config, ping_server, save_environment_config, save_server_config, ServerInfo,
};
use crate::cli::utils::{output_empty_collection, output_success, output_table, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Register remote server")]
    Add {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
        #[arg(help = "Server name (defaults to the URL host)")]
        name: Option<String>,
        #[arg(long, default_value = "", help = "Free-form description")]
        description: String,
    },

    #[command(about = "List registered servers")]
    List,

    #[command(about = "Switch to server (persistent selection) or show current server")]
    Use {
        #[arg(help = "Server name to switch to")]
        name: Option<String>,
    },

    #[command(about = "Remove server from registry")]
    Delete {
        #[arg(help = "Server name to delete")]
        name: String,
    },

    #[command(about = "Health check specific server (defaults to current server)")]
    Ping {
        #[arg(help = "Server name to ping")]
        name: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Add { url, name, description } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            let name = match name {
                Some(name) => name,
                None => parsed
                    .host_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("Server URL '{}' has no host; pass a name", url))?,
            };

            let mut servers = load_server_config()?;
            if servers.servers.contains_key(&name) {
                return Err(anyhow::anyhow!("Server '{}' already exists", name));
            }
            let info = ServerInfo::new(&url, description);
            let endpoint = info.url.clone();
            servers.servers.insert(name.clone(), info);
            save_server_config(&servers)?;

            let mut env = load_environment_config()?;
            if env.current_server.is_none() {
                env.current_server = Some(name.clone());
                save_environment_config(&env)?;
            }

            output_success(
                output_format,
                &format!("Added server '{}' at {}", name, endpoint),
                Some(json!({ "name": name, "url": endpoint })),
            )
        }
        ServerCommands::List => {
            let servers = load_server_config()?;
            if servers.servers.is_empty() {
                return output_empty_collection(output_format, "servers", "No servers registered");
            }
            let current = load_environment_config()?.current_server;

            let mut names: Vec<_> = servers.servers.keys().cloned().collect();
            names.sort();
            let rows: Vec<_> = names
                .iter()
                .filter_map(|name| servers.servers.get(name).map(|info| (name, info)))
                .map(|(name, info)| {
                    json!({
                        "current": if current.as_deref() == Some(name.as_str()) { "*" } else { "" },
                        "name": name,
                        "url": info.url,
                        "status": info.status,
                        "description": info.description,
                    })
                })
                .collect();
            output_table(output_format, &rows, &["current", "name", "url", "status", "description"])
        }
        ServerCommands::Use { name } => {
            let servers = load_server_config()?;
            let mut env = load_environment_config()?;

            match name {
                Some(name) => {
                    if !servers.servers.contains_key(&name) {
                        return Err(anyhow::anyhow!("Server '{}' not found", name));
                    }
                    env.current_server = Some(name.clone());
                    save_environment_config(&env)?;
                    output_success(
                        output_format,
                        &format!("Switched to server '{}'", name),
                        Some(json!({ "current_server": name })),
                    )
                }
                None => {
                    let (name, info) = env.current(&servers)?;
                    output_value(
                        output_format,
                        &json!({ "current_server": name, "url": info.url, "description": info.description }),
                    )
                }
            }
        }
        ServerCommands::Delete { name } => {
            let mut servers = load_server_config()?;
            if servers.servers.remove(&name).is_none() {
                return Err(anyhow::anyhow!("Server '{}' not found", name));
            }
            save_server_config(&servers)?;

            let mut env = load_environment_config()?;
            env.tokens.remove(&name);
            if env.current_server.as_deref() == Some(name.as_str()) {
                env.current_server = None;
            }
            save_environment_config(&env)?;

            output_success(output_format, &format!("Server '{}' deleted successfully", name), None)
        }
        ServerCommands::Ping { name } => {
            let mut servers = load_server_config()?;
            let name = match name {
                Some(name) => name,
                None => load_environment_config()?.current(&servers)?.0,
            };
            let info = servers
                .servers
                .get_mut(&name)
                .ok_or_else(|| anyhow::anyhow!("Server '{}' not found", name))?;

            let status = ping_server(info).await;
            info.update_ping(status);
            let url = info.url.clone();
            save_server_config(&servers)?;

            output_value(output_format, &json!({ "name": name, "url": url, "status": status }))
        }
    }
}
