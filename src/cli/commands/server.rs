use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Register the backend server")]
    Set {
        #[arg(help = "Server URL, e.g. http://10.0.0.5:8000")]
        url: String,
        #[arg(long, default_value = "/", help = "Sub-path the application is served under")]
        base_path: String,
    },

    #[command(about = "Show the registered server and effective API base")]
    Show,

    #[command(about = "Health check the registered server")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url, base_path } => {
            reqwest::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;

            let info = ServerInfo::new(url, base_path);
            save_server_info(&info)?;

            output_success(
                &output_format,
                &format!("Server set to {}", info.url),
                Some(json!({ "url": info.url, "base_path": info.base_path })),
            )
        }
        ServerCommands::Show => {
            let info = load_server_info()?;
            let config = client_config()?;

            match output_format {
                OutputFormat::Json => output_value(&json!({
                    "server": info,
                    "api_base": config.api_base(),
                    "timeout_ms": config.timeout_ms,
                })),
                OutputFormat::Text => {
                    match &info {
                        Some(info) => {
                            println!("Server: {}", info.url);
                            println!("Base path: {}", info.base_path);
                            println!("Status: {}", info.status);
                            if let Some(last_ping) = info.last_ping {
                                println!("Last ping: {}", last_ping.format("%Y-%m-%d %H:%M:%S UTC"));
                            }
                        }
                        None => println!("No server registered, using defaults"),
                    }
                    println!("API base: {}", config.api_base());
                    println!("Timeout: {}ms", config.timeout_ms);
                    Ok(())
                }
            }
        }
        ServerCommands::Ping => {
            let config = client_config()?;
            let status = ping_server(&config.base_url).await;

            if let Some(mut info) = load_server_info()? {
                info.update_ping(status);
                save_server_info(&info)?;
            }

            match output_format {
                OutputFormat::Json => output_value(&json!({
                    "url": config.base_url,
                    "status": status,
                })),
                OutputFormat::Text => {
                    println!("{} {}", config.base_url, status);
                    Ok(())
                }
            }
        }
    }
}
