use clap::Subcommand;
use serde_json::json;

use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::router::ROUTES;

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "List screens and their access requirements")]
    List,

    #[command(about = "Show where navigating to a path would land")]
    Check {
        #[arg(help = "Screen path, e.g. /tasks")]
        path: String,
    },
}

pub async fn handle(cmd: RouteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::List => output_text_or_json(&output_format, &*ROUTES, || {
            let mut lines = vec![
                format!("{:<24} {:<20} {:<6} {:<6} {}", "PATH", "NAME", "AUTH", "ADMIN", "REDIRECT"),
                "-".repeat(70),
            ];
            for route in ROUTES.iter() {
                lines.push(format!(
                    "{:<24} {:<20} {:<6} {:<6} {}",
                    route.path,
                    route.name,
                    route.meta.requires_auth,
                    route.meta.requires_admin,
                    route.redirect.unwrap_or("")
                ));
            }
            lines.join("\n")
        }),
        RouteCommands::Check { path } => {
            let ctx = Context::load()?;
            let navigation = ctx.client.router().resolve(&path)?;

            match output_format {
                OutputFormat::Json => output_value(&json!({
                    "requested": navigation.requested,
                    "landing": navigation.path(),
                    "redirects": navigation.redirects,
                })),
                OutputFormat::Text => {
                    if navigation.was_redirected() {
                        println!("{} -> {}", navigation.requested, navigation.redirects.join(" -> "));
                    } else {
                        println!("{} allowed", navigation.requested);
                    }
                    Ok(())
                }
            }
        }
    }
}
