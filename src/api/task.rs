use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::MessageResponse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        };
        f.pad(s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLog {
    pub id: i64,
    pub task_id: i64,
    #[serde(default)]
    pub daily_report_item_id: Option<i64>,
    pub date: NaiveDate,
    #[serde(default)]
    pub progress_before: Option<u8>,
    #[serde(default)]
    pub progress_after: Option<u8>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub creator_id: i64,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    /// Only on the single-task view
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub progress_logs: Vec<ProgressLog>,
}

/// Short form used when picking a task for a daily report item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBrief {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub project_name: Option<String>,
    pub assignee_id: Option<i64>,
    pub creator_id: Option<i64>,
    pub include_completed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub mod request {
    use super::{ProgressUpdate, TaskFilter, TaskInput};
    use crate::http::RequestEnvelope;

    pub fn get_list(filter: &TaskFilter) -> RequestEnvelope {
        RequestEnvelope::get("/tasks/")
            .query_opt("status", filter.status)
            .query_opt("project_name", filter.project_name.as_deref())
            .query_opt("assignee_id", filter.assignee_id)
            .query_opt("creator_id", filter.creator_id)
            .query_opt("include_completed", filter.include_completed)
    }

    pub fn get_my_tasks() -> RequestEnvelope {
        RequestEnvelope::get("/tasks/my-tasks")
    }

    pub fn get_by_id(id: i64) -> RequestEnvelope {
        RequestEnvelope::get(format!("/tasks/{}", id))
    }

    pub fn create(data: &TaskInput) -> RequestEnvelope {
        RequestEnvelope::post("/tasks/").json(data)
    }

    pub fn update(id: i64, data: &TaskInput) -> RequestEnvelope {
        RequestEnvelope::put(format!("/tasks/{}", id)).json(data)
    }

    pub fn update_progress(id: i64, data: &ProgressUpdate) -> RequestEnvelope {
        RequestEnvelope::put(format!("/tasks/{}/progress", id)).json(data)
    }

    pub fn delete(id: i64) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/tasks/{}", id))
    }
}

pub struct TaskApi<'a> {
    http: &'a HttpClient,
}

impl<'a> TaskApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.http.json(request::get_list(filter)).await
    }

    /// Active tasks assigned to the caller
    pub async fn get_my_tasks(&self) -> Result<Vec<TaskBrief>> {
        self.http.json(request::get_my_tasks()).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Task> {
        self.http.json(request::get_by_id(id)).await
    }

    pub async fn create(&self, data: &TaskInput) -> Result<Task> {
        self.http.json(request::create(data)).await
    }

    pub async fn update(&self, id: i64, data: &TaskInput) -> Result<Task> {
        self.http.json(request::update(id, data)).await
    }

    pub async fn update_progress(&self, id: i64, data: &ProgressUpdate) -> Result<Task> {
        self.http.json(request::update_progress(id, data)).await
    }

    pub async fn delete(&self, id: i64) -> Result<MessageResponse> {
        self.http.json(request::delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    #[test]
    fn test_filter_query() {
        let filter = TaskFilter {
            status: Some(TaskStatus::InProgress),
            project_name: Some("平台".to_string()),
            ..Default::default()
        };
        let env = request::get_list(&filter);
        assert_eq!(env.path, "/tasks/");
        assert_eq!(env.query_value("status"), Some("in_progress"));
        assert_eq!(env.query_value("project_name"), Some("平台"));
        assert_eq!(env.query_value("assignee_id"), None);
        assert_eq!(env.query.len(), 2);

        assert!(request::get_list(&TaskFilter::default()).query.is_empty());
    }

    #[test]
    fn test_progress_update() {
        let env = request::update_progress(4, &ProgressUpdate { progress: 80, content: None });
        assert_eq!(env.method, Method::PUT);
        assert_eq!(env.path, "/tasks/4/progress");
        assert_eq!(env.json_body(), Some(&json!({ "progress": 80 })));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed, TaskStatus::Cancelled] {
            assert_eq!(status.to_string().parse::<TaskStatus>(), Ok(status));
            assert_eq!(serde_json::to_value(status).unwrap(), json!(status.to_string()));
        }
    }
}
