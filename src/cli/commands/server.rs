use clap::Subcommand;
use reqwest::Method;

use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health from the /health endpoint")]
    Health,

    #[command(about = "Show server information from the API root endpoint")]
    Info,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health => {
            let payload = api_request(Method::GET, "/health", None).await?;

            match output_format {
                OutputFormat::Json => print_json(&payload),
                OutputFormat::Text => {
                    let status = payload
                        .pointer("/data/status")
                        .and_then(|s| s.as_str())
                        .unwrap_or("unknown");
                    println!("Server {} is {}", base_url(), status);
                    Ok(())
                }
            }
        }
        ServerCommands::Info => {
            let payload = api_request(Method::GET, "/", None).await?;

            match output_format {
                OutputFormat::Json => print_json(&payload),
                OutputFormat::Text => {
                    let name = payload
                        .pointer("/data/name")
                        .and_then(|s| s.as_str())
                        .unwrap_or("unknown");
                    let version = payload
                        .pointer("/data/version")
                        .and_then(|s| s.as_str())
                        .unwrap_or("unknown");
                    println!("{} v{} at {}", name, version, base_url());
                    Ok(())
                }
            }
        }
    }
}
