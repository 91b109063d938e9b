pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Parser)]
#[command(name = "wr")]
#[command(about = "wr - Command-line client for the work reporting backend")]
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
    #[command(about = "Backend server registration and health")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Login, logout and password management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Weekly reports")]
    Report {
        #[command(subcommand)]
        cmd: commands::report::ReportCommands,
    },

    #[command(about = "Daily reports")]
    Daily {
        #[command(subcommand)]
        cmd: commands::daily::DailyCommands,
    },

    #[command(about = "Tasks and progress")]
    Task {
        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },

    #[command(about = "Weekly summary, charts and Word export")]
    Summary {
        #[command(subcommand)]
        cmd: commands::summary::SummaryCommands,
    },

    #[command(about = "Project catalogue administration (admin)")]
    Project {
        #[command(subcommand)]
        cmd: commands::project::ProjectCommands,
    },

    #[command(about = "User administration (admin)")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Inspect screens and where the navigation guard sends you")]
    Route {
        #[command(subcommand)]
        cmd: commands::route::RouteCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// True when the request pipeline already put this failure in front of the user
pub fn already_reported(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ApiError>())
        .any(ApiError::is_notified)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Report { cmd } => commands::report::handle(cmd, output_format).await,
        Commands::Daily { cmd } => commands::daily::handle(cmd, output_format).await,
        Commands::Task { cmd } => commands::task::handle(cmd, output_format).await,
        Commands::Summary { cmd } => commands::summary::handle(cmd, output_format).await,
        Commands::Project { cmd } => commands::project::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Route { cmd } => commands::route::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notified_failures_are_not_reported_twice() {
        let shown = anyhow::Error::new(ApiError::Transport {
            message: "connection refused".into(),
            timeout: false,
        });
        assert!(already_reported(&shown));
        assert!(already_reported(&shown.context("Failed to load tasks")));

        let expired = anyhow::Error::new(ApiError::SessionExpired {
            path: "/tasks/my-tasks".into(),
            message: "Not authenticated".into(),
        });
        assert!(!already_reported(&expired));
        assert!(!already_reported(&anyhow::anyhow!("Not logged in")));
    }
}
