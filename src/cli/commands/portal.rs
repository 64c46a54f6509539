use clap::{Subcommand, ValueEnum};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::cli::config::{load_environment_config, load_server_config};
use crate::cli::utils::{output_empty_collection, output_table, output_value, unwrap_envelope};
use crate::cli::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Clients,
    Applications,
    Lenders,
    Brokers,
}

impl RecordKind {
    fn collection_path(self) -> &'static str {
        match self {
            RecordKind::Clients => "/api/portal/clients",
            RecordKind::Applications => "/api/portal/applications",
            RecordKind::Lenders => "/api/portal/lenders",
            RecordKind::Brokers => "/api/admin/brokers",
        }
    }

    fn name(self) -> &'static str {
        match self {
            RecordKind::Clients => "clients",
            RecordKind::Applications => "applications",
            RecordKind::Lenders => "lenders",
            RecordKind::Brokers => "brokers",
        }
    }

    /// Columns shown in text listings.
    fn columns(self) -> &'static [&'static str] {
        match self {
            RecordKind::Clients => &["id", "full_name", "email", "phone", "status"],
            RecordKind::Applications => &["id", "client_id", "loan_amount", "loan_type", "status"],
            RecordKind::Lenders => &["id", "name", "region", "is_active"],
            RecordKind::Brokers => &["id", "full_name", "email", "role", "is_active"],
        }
    }
}

#[derive(Subcommand)]
pub enum PortalCommands {
    #[command(about = "List records, optionally filtered by a search string")]
    List {
        #[arg(value_enum)]
        kind: RecordKind,
        #[arg(short, long, help = "Case-insensitive search text")]
        query: Option<String>,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(value_enum)]
        kind: RecordKind,
        id: Uuid,
    },

    #[command(about = "Show the signed-in broker")]
    Me,
}

pub async fn handle(cmd: PortalCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let api = PortalClient::current()?;

    match cmd {
        PortalCommands::List { kind, query } => {
            let mut params = Vec::new();
            if let Some(q) = query.filter(|q| !q.is_empty()) {
                params.push(("q", q));
            }
            let data = api.get(kind.collection_path(), &params).await?;
            let rows = data.as_array().cloned().unwrap_or_default();
            if rows.is_empty() {
                return output_empty_collection(output_format, kind.name(), &format!("No {} found", kind.name()));
            }
            output_table(output_format, &rows, kind.columns())
        }
        PortalCommands::Get { kind, id } => {
            let data = api.get(&format!("{}/{}", kind.collection_path(), id), &[]).await?;
            output_value(output_format, &data)
        }
        PortalCommands::Me => {
            let data = api.get("/api/portal/me", &[]).await?;
            output_value(output_format, &data)
        }
    }
}

/// HTTP client bound to the current server and its stored token.
struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PortalClient {
    fn current() -> anyhow::Result<Self> {
        let servers = load_server_config()?;
        let env = load_environment_config()?;
        let (name, info) = env.current(&servers)?;
        let token = env.tokens.get(&name).cloned().ok_or_else(|| {
            anyhow::anyhow!("No token stored for server '{}'; run `kr auth login <token>`", name)
        })?;

        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, base_url: info.url, token })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).bearer_auth(&self.token).query(params).send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        unwrap_envelope(status, body)
    }
}
