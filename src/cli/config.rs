use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Base URL without a trailing slash, e.g. `http://localhost:3000`.
    pub url: String,
    pub description: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub servers: HashMap<String, ServerInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub current_server: Option<String>,
    /// Bearer token per server name.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

impl ServerInfo {
    pub fn new(url: &str, description: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            description,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

impl EnvironmentConfig {
    /// Current server name and its details.
    pub fn current(&self, servers: &ServerConfig) -> anyhow::Result<(String, ServerInfo)> {
        let name = self
            .current_server
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No current server set; run `kr server use <name>`"))?;
        let info = servers
            .servers
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Server '{}' is no longer registered", name))?;
        Ok((name, info))
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("KR_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("kr").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn load_json<T: Default + serde::de::DeserializeOwned>(file_name: &str) -> anyhow::Result<T> {
    let file = get_config_dir()?.join(file_name);
    if !file.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_json<T: Serialize>(file_name: &str, value: &T) -> anyhow::Result<()> {
    let file = get_config_dir()?.join(file_name);
    fs::write(file, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    load_json("server.json")
}

pub fn save_server_config(config: &ServerConfig) -> anyhow::Result<()> {
    save_json("server.json", config)
}

pub fn load_environment_config() -> anyhow::Result<EnvironmentConfig> {
    load_json("env.json")
}

pub fn save_environment_config(config: &EnvironmentConfig) -> anyhow::Result<()> {
    save_json("env.json", config)
}

pub async fn ping_server(server_info: &ServerInfo) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = server_info.endpoint("/health");

    match client.get(&url).timeout(Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}
