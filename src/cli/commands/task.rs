use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;

use crate::api::task::{ProgressUpdate, Task, TaskFilter, TaskInput, TaskStatus};
use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

const SCREEN: &str = "/tasks";

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List tasks")]
    List {
        #[arg(long, help = "pending, in_progress, completed or cancelled")]
        status: Option<TaskStatus>,
        #[arg(long, help = "Filter by project")]
        project: Option<String>,
        #[arg(long, help = "Filter by assignee ID")]
        assignee: Option<i64>,
        #[arg(long, help = "Include completed tasks")]
        all: bool,
    },

    #[command(about = "List active tasks assigned to me")]
    Mine,

    #[command(about = "Show one task with its progress log")]
    Show {
        #[arg(help = "Task ID")]
        id: i64,
    },

    #[command(about = "Create a task")]
    Create {
        #[arg(help = "Title")]
        title: String,
        #[arg(long, help = "Description")]
        description: Option<String>,
        #[arg(long, help = "Project")]
        project: Option<String>,
        #[arg(long, help = "Assignee ID")]
        assignee: Option<i64>,
        #[arg(long, help = "Due date (YYYY-MM-DD)")]
        due: Option<NaiveDate>,
    },

    #[command(about = "Change task status")]
    Status {
        #[arg(help = "Task ID")]
        id: i64,
        #[arg(help = "pending, in_progress, completed or cancelled")]
        status: TaskStatus,
    },

    #[command(about = "Record progress")]
    Progress {
        #[arg(help = "Task ID")]
        id: i64,
        #[arg(help = "Progress percentage (0-100)", value_parser = clap::value_parser!(u8).range(0..=100))]
        progress: u8,
        #[arg(long, help = "What was done")]
        note: Option<String>,
    },

    #[command(about = "Delete a task")]
    Delete {
        #[arg(help = "Task ID")]
        id: i64,
    },
}

fn render_list(tasks: &[Task]) -> String {
    let mut lines = vec![
        format!("{:<6} {:<12} {:>5} {:<16} {}", "ID", "STATUS", "DONE", "PROJECT", "TITLE"),
        "-".repeat(70),
    ];
    for task in tasks {
        lines.push(format!(
            "{:<6} {:<12} {:>4}% {:<16} {}",
            task.id,
            task.status,
            task.progress,
            excerpt(task.project_name.as_deref(), 16),
            task.title
        ));
    }
    lines.join("\n")
}

fn render_task(task: &Task) -> String {
    let mut lines = vec![
        format!("Task #{}: {}", task.id, task.title),
        format!("Status: {} ({}%)", task.status, task.progress),
    ];
    if let Some(project) = &task.project_name {
        lines.push(format!("Project: {}", project));
    }
    if let Some(assignee) = task.assignee_name.as_ref().or(task.creator_name.as_ref()) {
        lines.push(format!("Owner: {}", assignee));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("Due: {}", due));
    }
    if let Some(description) = &task.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    if !task.progress_logs.is_empty() {
        lines.push(String::new());
        for log in &task.progress_logs {
            lines.push(format!(
                "{} {}% -> {}% {}",
                log.date,
                log.progress_before.unwrap_or(0),
                log.progress_after.unwrap_or(0),
                log.content.as_deref().unwrap_or("")
            ));
        }
    }
    lines.join("\n")
}

pub async fn handle(cmd: TaskCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    ctx.enter(SCREEN)?;
    let api = ctx.client.tasks();

    match cmd {
        TaskCommands::List { status, project, assignee, all } => {
            let filter = TaskFilter {
                status,
                project_name: project,
                assignee_id: assignee,
                creator_id: None,
                include_completed: all.then_some(true),
            };
            let tasks = api.get_list(&filter).await?;
            if tasks.is_empty() {
                return output_empty_collection(&output_format, "tasks", "No tasks found");
            }
            output_text_or_json(&output_format, &tasks, || render_list(&tasks))
        }
        TaskCommands::Mine => {
            let tasks = api.get_my_tasks().await?;
            if tasks.is_empty() {
                return output_empty_collection(&output_format, "tasks", "No active tasks");
            }
            output_text_or_json(&output_format, &tasks, || {
                tasks
                    .iter()
                    .map(|t| format!("{:<6} {:>4}% {}", t.id, t.progress, t.title))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        TaskCommands::Show { id } => {
            let task = api.get_by_id(id).await?;
            output_text_or_json(&output_format, &task, || render_task(&task))
        }
        TaskCommands::Create {
            title,
            description,
            project,
            assignee,
            due,
        } => {
            let input = TaskInput {
                title: Some(title),
                description,
                project_name: project,
                assignee_id: assignee,
                due_date: due,
                ..Default::default()
            };
            let task = api.create(&input).await?;
            output_success(
                &output_format,
                &format!("Task #{} created", task.id),
                Some(json!({ "task": task })),
            )
        }
        TaskCommands::Status { id, status } => {
            let input = TaskInput {
                status: Some(status),
                ..Default::default()
            };
            let task = api.update(id, &input).await?;
            output_success(
                &output_format,
                &format!("Task #{} is now {}", task.id, task.status),
                Some(json!({ "task": task })),
            )
        }
        TaskCommands::Progress { id, progress, note } => {
            let task = api
                .update_progress(id, &ProgressUpdate { progress, content: note })
                .await?;
            output_success(
                &output_format,
                &format!("Task #{} at {}%", task.id, task.progress),
                Some(json!({ "task": task })),
            )
        }
        TaskCommands::Delete { id } => {
            let response = api.delete(id).await?;
            output_success(&output_format, &response.message, None)
        }
    }
}
