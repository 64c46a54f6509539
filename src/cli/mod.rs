pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "kr")]
#[command(about = "kr - command-line companion for the kr-portal site and broker portal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Region resolution for site paths")]
    Locale {
        #[command(subcommand)]
        cmd: commands::locale::LocaleCommands,
    },

    #[command(about = "Mortgage and affordability calculators")]
    Calc {
        #[command(subcommand)]
        cmd: commands::calc::CalcCommands,
    },

    #[command(about = "Remote server management")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Development tokens and stored credentials")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Read portal records from the current server")]
    Portal {
        #[command(subcommand)]
        cmd: commands::portal::PortalCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Locale { cmd } => commands::locale::handle(cmd, output_format),
        Commands::Calc { cmd } => commands::calc::handle(cmd, output_format),
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format),
        Commands::Portal { cmd } => commands::portal::handle(cmd, output_format).await,
    }
}
