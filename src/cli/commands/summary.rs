use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

const SCREEN: &str = "/chart";

#[derive(Subcommand)]
pub enum SummaryCommands {
    #[command(about = "Weekly summary across all reports")]
    Weekly {
        #[arg(long, help = "Year")]
        year: Option<i32>,
        #[arg(long, help = "ISO week number")]
        week: Option<u32>,
    },

    #[command(about = "Dashboard figures")]
    Dashboard,

    #[command(about = "Chart series for a year")]
    Chart {
        #[arg(long, help = "Year")]
        year: Option<i32>,
    },

    #[command(about = "Most recent week with data")]
    Latest,

    #[command(about = "Weeks that have a summary")]
    Weeks,

    #[command(about = "Ask the server to (re)run the weekly analysis")]
    Analyze {
        #[arg(help = "Year")]
        year: i32,
        #[arg(help = "ISO week number")]
        week: u32,
    },

    #[command(about = "Download the weekly summary as a Word document")]
    Download {
        #[arg(help = "Year")]
        year: i32,
        #[arg(help = "ISO week number")]
        week: u32,
        #[arg(long, short, help = "Output file")]
        output: Option<PathBuf>,
    },
}

pub async fn handle(cmd: SummaryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    ctx.enter(SCREEN)?;
    let api = ctx.client.summary();

    match cmd {
        SummaryCommands::Weekly { year, week } => output_value(&api.get_weekly(year, week).await?),
        SummaryCommands::Dashboard => output_value(&api.get_dashboard().await?),
        SummaryCommands::Chart { year } => output_value(&api.get_chart_data(year).await?),
        SummaryCommands::Latest => output_value(&api.get_latest_week().await?),
        SummaryCommands::Weeks => output_value(&api.get_available_weeks().await?),
        SummaryCommands::Analyze { year, week } => {
            let response = api.trigger_analysis(year, week).await?;
            output_success(
                &output_format,
                &format!("Analysis started for {}-W{:02}", year, week),
                Some(json!({ "response": response })),
            )
        }
        SummaryCommands::Download { year, week, output } => {
            let bytes = api.download_word(year, week).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("weekly-summary-{}-W{:02}.docx", year, week)));
            std::fs::write(&path, &bytes)?;

            output_success(
                &output_format,
                &format!("Saved {} ({} bytes)", path.display(), bytes.len()),
                Some(json!({ "path": path, "bytes": bytes.len() })),
            )
        }
    }
}
