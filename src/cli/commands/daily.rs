use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde_json::json;

use crate::api::daily_report::{DailyReport, DailyReportCreate, DailyReportItemInput, WeekDailySummary};
use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::stores::DailyReportStore;

const SCREEN: &str = "/daily-report";
const HISTORY_SCREEN: &str = "/daily-report/history";

#[derive(Subcommand)]
pub enum DailyCommands {
    #[command(about = "Show today's report")]
    Today,

    #[command(about = "List daily reports in a date range")]
    List {
        #[arg(long, help = "First day (YYYY-MM-DD)")]
        from: Option<NaiveDate>,
        #[arg(long, help = "Last day (YYYY-MM-DD)")]
        to: Option<NaiveDate>,
    },

    #[command(about = "Show the report for one day")]
    Show {
        #[arg(help = "Day (YYYY-MM-DD)")]
        date: NaiveDate,
    },

    #[command(about = "Create or update the report for a day")]
    Save {
        #[arg(long, help = "Day (YYYY-MM-DD), defaults to today")]
        date: Option<NaiveDate>,
        #[arg(long, help = "Free-text summary")]
        content: Option<String>,
        #[arg(long = "item", help = "Work item as PROJECT:CONTENT, repeatable")]
        items: Vec<String>,
    },

    #[command(about = "Delete a daily report")]
    Delete {
        #[arg(help = "Daily report ID")]
        id: i64,
    },

    #[command(about = "Summarise a week's daily reports by project")]
    Week {
        #[arg(long, help = "Year")]
        year: Option<i32>,
        #[arg(long, help = "ISO week number")]
        week: Option<u32>,
    },

    #[command(about = "Show whether a day can still be edited")]
    Deadline {
        #[arg(help = "Day (YYYY-MM-DD)")]
        date: NaiveDate,
    },

    #[command(about = "Let the server split free text into work items")]
    Parse {
        #[arg(help = "Report text")]
        content: String,
    },
}

fn parse_item(raw: &str) -> DailyReportItemInput {
    let (project_name, content) = match raw.split_once(':') {
        Some((project, content)) if !project.trim().is_empty() => {
            (Some(project.trim().to_string()), content.trim().to_string())
        }
        _ => (None, raw.trim().to_string()),
    };
    DailyReportItemInput {
        project_name,
        content,
        ..Default::default()
    }
}

fn render_report(report: &DailyReport) -> String {
    let mut lines = vec![format!("Daily report #{} for {}", report.id, report.date)];
    if !report.editable {
        lines.push("(locked)".to_string());
    }
    if let Some(content) = &report.work_content {
        lines.push(content.clone());
    }
    for item in &report.items {
        let hours = item.hours.map(|h| format!(" [{}h]", h)).unwrap_or_default();
        let project = item.project_name.as_deref().unwrap_or("-");
        lines.push(format!("  {}. {}: {}{}", item.sequence, project, item.content, hours));
    }
    lines.join("\n")
}

fn render_week(summary: &WeekDailySummary) -> String {
    let mut lines = vec![format!(
        "{}-W{:02}: {} daily reports",
        summary.year,
        summary.week_num,
        summary.daily_reports.len()
    )];
    for (project, entries) in &summary.summary_by_project {
        let hours = summary.total_hours_by_project.get(project).copied().unwrap_or(0.0);
        lines.push(format!("{} ({}h)", project, hours));
        for entry in entries {
            lines.push(format!("  - {}", entry));
        }
    }
    lines.join("\n")
}

pub async fn handle(cmd: DailyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let api = ctx.client.daily_reports();
    let store = DailyReportStore::new();

    match cmd {
        DailyCommands::Today => {
            ctx.enter(SCREEN)?;
            match store.fetch_current(&api).await? {
                Some(report) => output_text_or_json(&output_format, &report, || render_report(&report)),
                None => output_text_or_json(&output_format, &json!({ "report": null }), || {
                    "Nothing written today yet".to_string()
                }),
            }
        }
        DailyCommands::List { from, to } => {
            ctx.enter(HISTORY_SCREEN)?;
            let reports = store.fetch_list(&api, from, to).await?;
            if reports.is_empty() {
                return output_empty_collection(&output_format, "daily_reports", "No daily reports found");
            }
            output_text_or_json(&output_format, &reports, || {
                let mut lines = vec![format!("{:<6} {:<12} {:<6} {}", "ID", "DATE", "ITEMS", "CONTENT"), "-".repeat(60)];
                for report in &reports {
                    lines.push(format!(
                        "{:<6} {:<12} {:<6} {}",
                        report.id,
                        report.date,
                        report.items.len(),
                        excerpt(report.work_content.as_deref(), 40)
                    ));
                }
                lines.join("\n")
            })
        }
        DailyCommands::Show { date } => {
            ctx.enter(HISTORY_SCREEN)?;
            match store.fetch_by_date(&api, date).await? {
                Some(report) => output_text_or_json(&output_format, &report, || render_report(&report)),
                None => output_text_or_json(&output_format, &json!({ "report": null }), || {
                    format!("No daily report for {}", date)
                }),
            }
        }
        DailyCommands::Save { date, content, items } => {
            ctx.enter(SCREEN)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let existing = store.fetch_by_date(&api, date).await?;

            let items = if items.is_empty() {
                None
            } else {
                Some(items.iter().map(|raw| parse_item(raw)).collect())
            };
            let saved = store
                .save(
                    &api,
                    DailyReportCreate {
                        date,
                        work_content: content,
                        items,
                    },
                )
                .await?;

            let verb = if existing.is_some() { "updated" } else { "created" };
            output_success(
                &output_format,
                &format!("Daily report for {} {}", saved.date, verb),
                Some(json!({ "report": saved })),
            )
        }
        DailyCommands::Delete { id } => {
            ctx.enter(HISTORY_SCREEN)?;
            store.delete(&api, id).await?;
            output_success(&output_format, &format!("Daily report #{} deleted", id), None)
        }
        DailyCommands::Week { year, week } => {
            ctx.enter(SCREEN)?;
            let summary = store.fetch_week_summary(&api, year, week).await?;
            output_text_or_json(&output_format, &summary, || render_week(&summary))
        }
        DailyCommands::Deadline { date } => {
            ctx.enter(SCREEN)?;
            let info = api.get_deadline(date).await?;
            output_text_or_json(&output_format, &info, || {
                let state = if info.is_editable { "editable" } else { "locked" };
                let mut text = format!("{}: {} until {}", info.report_date, state, info.deadline);
                if let Some(reason) = &info.reason {
                    text.push_str(&format!(" ({})", reason));
                }
                text
            })
        }
        DailyCommands::Parse { content } => {
            ctx.enter(SCREEN)?;
            let parsed = api.parse_preview(&content).await?;
            output_text_or_json(&output_format, &parsed, || {
                parsed
                    .items
                    .iter()
                    .map(|item| {
                        let hours = item.hours.map(|h| format!(" [{}h]", h)).unwrap_or_default();
                        format!("{}: {}{}", item.project_name.as_deref().unwrap_or("-"), item.content, hours)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        let item = parse_item("平台: 接口联调");
        assert_eq!(item.project_name.as_deref(), Some("平台"));
        assert_eq!(item.content, "接口联调");

        let item = parse_item("no project here");
        assert_eq!(item.project_name, None);
        assert_eq!(item.content, "no project here");
    }
}
