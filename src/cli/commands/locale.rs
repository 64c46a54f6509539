use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_table, output_value};
use crate::cli::OutputFormat;
use crate::locale::{currency_for, localized_path, resolve_locale, LocaleRequest, Region};

#[derive(Subcommand)]
pub enum LocaleCommands {
    #[command(about = "Resolve the region a request would be served in")]
    Resolve {
        #[arg(help = "Request path, e.g. /ca/mortgages")]
        path: String,
        #[arg(long, help = "Raw query string, e.g. loc=us")]
        query: Option<String>,
        #[arg(long, help = "Value of the region cookie")]
        cookie: Option<String>,
        #[arg(long, help = "Accept-Language header")]
        accept_language: Option<String>,
    },

    #[command(about = "Show the same path localized for every region")]
    Links {
        #[arg(help = "Site path, e.g. /contact")]
        path: String,
    },
}

pub fn handle(cmd: LocaleCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LocaleCommands::Resolve { path, query, cookie, accept_language } => {
            let request = LocaleRequest {
                path,
                query: query.map(|q| q.trim_start_matches('?').to_string()),
                cookie,
                accept_language,
            };
            let resolution = resolve_locale(&request);

            output_value(
                output_format,
                &json!({
                    "region": resolution.region,
                    "source": resolution.source,
                    "currency": currency_for(resolution.region).code,
                    "path": resolution.unprefixed_path,
                    "redirect": resolution.redirect_to,
                }),
            )
        }
        LocaleCommands::Links { path } => {
            let rows: Vec<_> = Region::ALL
                .iter()
                .map(|&region| json!({ "region": region, "href": localized_path(region, &path) }))
                .collect();
            output_table(output_format, &rows, &["region", "href"])
        }
    }
}
