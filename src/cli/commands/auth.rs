use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{decode_jwt, generate_jwt, Claims};
use crate::cli::config::{load_environment_config, load_server_config, save_environment_config};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::portal::models::BrokerRole;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Mint a development token signed with the configured JWT secret")]
    Token {
        #[arg(long, help = "Broker id (token subject)")]
        sub: Uuid,
        #[arg(long, help = "Broker email")]
        email: String,
        #[arg(long, help = "Issue an admin token")]
        admin: bool,
        #[arg(long, help = "Hours until expiry (defaults to the server setting)")]
        hours: Option<u64>,
        #[arg(long, help = "Store the token for the current server")]
        save: bool,
    },

    #[command(about = "Store a bearer token for the current server")]
    Login {
        #[arg(help = "Bearer token issued by the identity provider")]
        token: String,
    },

    #[command(about = "Forget the stored token for the current server")]
    Logout,

    #[command(about = "Show the claims of the stored token")]
    Status,
}

pub fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Token { sub, email, admin, hours, save } => {
            let security = &config().security;
            let role = if admin { BrokerRole::Admin } else { BrokerRole::Broker };
            let claims = Claims::new(sub, email, role, hours.unwrap_or(security.jwt_expiry_hours));
            let token = generate_jwt(&claims, &security.jwt_secret)?;

            if save {
                store_token(token.clone())?;
            }
            match output_format {
                OutputFormat::Json => output_value(output_format, &json!({ "token": token, "claims": claims })),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        AuthCommands::Login { token } => {
            let server = store_token(token)?;
            output_success(output_format, &format!("Token stored for server '{}'", server), None)
        }
        AuthCommands::Logout => {
            let servers = load_server_config()?;
            let mut env = load_environment_config()?;
            let (name, _) = env.current(&servers)?;
            env.tokens.remove(&name);
            save_environment_config(&env)?;
            output_success(output_format, &format!("Logged out of server '{}'", name), None)
        }
        AuthCommands::Status => {
            let servers = load_server_config()?;
            let env = load_environment_config()?;
            let (name, _) = env.current(&servers)?;
            let token = env
                .tokens
                .get(&name)
                .ok_or_else(|| anyhow::anyhow!("No token stored for server '{}'", name))?;

            let claims = decode_jwt(token, &config().security.jwt_secret)?;
            output_value(output_format, &json!({ "server": name, "claims": claims }))
        }
    }
}

fn store_token(token: String) -> anyhow::Result<String> {
    let servers = load_server_config()?;
    let mut env = load_environment_config()?;
    let (name, _) = env.current(&servers)?;
    env.tokens.insert(name.clone(), token);
    save_environment_config(&env)?;
    Ok(name)
}
