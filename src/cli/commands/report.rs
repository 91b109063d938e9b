use chrono::{Datelike, Local};
use clap::Subcommand;
use serde_json::json;

use crate::api::report::{Report, ReportCreate, ReportStatus};
use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::stores::ReportStore;

const SCREEN: &str = "/report";
const HISTORY_SCREEN: &str = "/history";

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Show this week's report")]
    Current,

    #[command(about = "List weekly reports")]
    List {
        #[arg(long, help = "Filter by year")]
        year: Option<i32>,
        #[arg(long, help = "Filter by ISO week number")]
        week: Option<u32>,
    },

    #[command(about = "Show one report")]
    Show {
        #[arg(help = "Report ID")]
        id: i64,
    },

    #[command(about = "Create or update this week's report")]
    Save {
        #[arg(long, help = "This week's work")]
        work: Option<String>,
        #[arg(long, help = "Next week's plan")]
        plan: Option<String>,
        #[arg(long, help = "Submit instead of saving a draft")]
        submit: bool,
    },

    #[command(about = "Delete a report")]
    Delete {
        #[arg(help = "Report ID")]
        id: i64,
    },

    #[command(about = "Show the submission deadline for a week")]
    Deadline {
        #[arg(help = "Year")]
        year: i32,
        #[arg(help = "ISO week number")]
        week: u32,
    },

    #[command(about = "Let the server split free text into structured items")]
    Parse {
        #[arg(help = "Report text")]
        content: String,
    },

    #[command(about = "List years that have reports")]
    Years,
}

fn render_report(report: &Report) -> String {
    let mut lines = vec![format!(
        "Report #{} ({}-W{:02}, {:?})",
        report.id, report.year, report.week_num, report.status
    )];
    if let Some(name) = &report.user_name {
        lines.push(format!("Author: {}", name));
    }
    lines.push(String::new());
    lines.push("This week:".to_string());
    lines.push(report.this_week_work.clone().unwrap_or_default());
    lines.push(String::new());
    lines.push("Next week:".to_string());
    lines.push(report.next_week_plan.clone().unwrap_or_default());
    lines.join("\n")
}

fn render_list(reports: &[Report]) -> String {
    let mut lines = vec![
        format!("{:<6} {:<10} {:<10} {}", "ID", "WEEK", "STATUS", "WORK"),
        "-".repeat(60),
    ];
    for report in reports {
        lines.push(format!(
            "{:<6} {:<10} {:<10} {}",
            report.id,
            format!("{}-W{:02}", report.year, report.week_num),
            format!("{:?}", report.status).to_lowercase(),
            excerpt(report.this_week_work.as_deref(), 40)
        ));
    }
    lines.join("\n")
}

pub async fn handle(cmd: ReportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let api = ctx.client.reports();
    let store = ReportStore::new();

    match cmd {
        ReportCommands::Current => {
            ctx.enter(SCREEN)?;
            match store.fetch_current(&api).await? {
                Some(report) => output_text_or_json(&output_format, &report, || render_report(&report)),
                None => output_text_or_json(&output_format, &json!({ "report": null }), || {
                    "No report for this week yet".to_string()
                }),
            }
        }
        ReportCommands::List { year, week } => {
            ctx.enter(HISTORY_SCREEN)?;
            let reports = store.fetch_list(&api, year, week).await?;
            if reports.is_empty() {
                return output_empty_collection(&output_format, "reports", "No reports found");
            }
            output_text_or_json(&output_format, &reports, || render_list(&reports))
        }
        ReportCommands::Show { id } => {
            ctx.enter(HISTORY_SCREEN)?;
            let report = api.get_by_id(id).await?;
            output_text_or_json(&output_format, &report, || render_report(&report))
        }
        ReportCommands::Save { work, plan, submit } => {
            ctx.enter(SCREEN)?;
            let current = store.fetch_current(&api).await?;
            let (year, week_num) = match &current {
                Some(report) => (report.year, report.week_num),
                None => {
                    let week = Local::now().date_naive().iso_week();
                    (week.year(), week.week())
                }
            };

            let data = ReportCreate {
                year,
                week_num,
                this_week_work: work,
                next_week_plan: plan,
                status: Some(if submit { ReportStatus::Submitted } else { ReportStatus::Draft }),
            };
            let saved = store.save(&api, data).await?;

            let verb = if current.is_some() { "updated" } else { "created" };
            output_success(
                &output_format,
                &format!("Report #{} {}", saved.id, verb),
                Some(json!({ "report": saved })),
            )
        }
        ReportCommands::Delete { id } => {
            ctx.enter(HISTORY_SCREEN)?;
            store.delete(&api, id).await?;
            output_success(&output_format, &format!("Report #{} deleted", id), None)
        }
        ReportCommands::Deadline { year, week } => {
            ctx.enter(SCREEN)?;
            output_value(&api.get_deadline(year, week).await?)
        }
        ReportCommands::Parse { content } => {
            ctx.enter(SCREEN)?;
            output_value(&api.parse_preview(&content).await?)
        }
        ReportCommands::Years => {
            ctx.enter(HISTORY_SCREEN)?;
            let years = api.get_years().await?;
            output_text_or_json(&output_format, &years, || {
                years.iter().map(|y| y.to_string()).collect::<Vec<_>>().join("\n")
            })
        }
    }
}
