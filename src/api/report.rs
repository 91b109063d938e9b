use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::MessageResponse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Draft,
    Submitted,
}

/// Weekly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub week_num: u32,
    #[serde(default)]
    pub this_week_work: Option<String>,
    #[serde(default)]
    pub next_week_plan: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCreate {
    pub year: i32,
    pub week_num: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub this_week_work: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_week_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub this_week_work: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_week_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

impl From<ReportCreate> for ReportUpdate {
    fn from(create: ReportCreate) -> Self {
        Self {
            this_week_work: create.this_week_work,
            next_week_plan: create.next_week_plan,
            status: create.status,
        }
    }
}

pub mod request {
    use serde_json::json;

    use super::{ReportCreate, ReportUpdate};
    use crate::config::LONG_TIMEOUT;
    use crate::http::RequestEnvelope;

    pub fn get_current() -> RequestEnvelope {
        RequestEnvelope::get("/reports/current")
    }

    pub fn get_list(year: Option<i32>, week_num: Option<u32>) -> RequestEnvelope {
        RequestEnvelope::get("/reports/")
            .query_opt("year", year)
            .query_opt("week_num", week_num)
    }

    pub fn get_by_id(id: i64) -> RequestEnvelope {
        RequestEnvelope::get(format!("/reports/{}", id))
    }

    pub fn create(data: &ReportCreate) -> RequestEnvelope {
        RequestEnvelope::post("/reports/").json(data)
    }

    pub fn update(id: i64, data: &ReportUpdate) -> RequestEnvelope {
        RequestEnvelope::put(format!("/reports/{}", id)).json(data)
    }

    pub fn delete(id: i64) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/reports/{}", id))
    }

    pub fn get_deadline(year: i32, week: u32) -> RequestEnvelope {
        RequestEnvelope::get("/reports/deadline")
            .query("year", year)
            .query("week", week)
    }

    pub fn parse_preview(content: &str) -> RequestEnvelope {
        RequestEnvelope::post("/reports/parse-preview")
            .json(&json!({ "content": content }))
            .timeout(LONG_TIMEOUT)
    }

    pub fn get_years() -> RequestEnvelope {
        RequestEnvelope::get("/reports/years")
    }

    pub fn get_projects() -> RequestEnvelope {
        RequestEnvelope::get("/reports/projects")
    }

    pub fn admin_get_user_reports(user_id: i64, year: Option<i32>) -> RequestEnvelope {
        RequestEnvelope::get(format!("/reports/admin/user/{}", user_id)).query_opt("year", year)
    }

    pub fn suggest_project(name: &str) -> RequestEnvelope {
        RequestEnvelope::post("/projects/suggest").json(&json!({ "name": name }))
    }

    pub fn suggest_sub_item(project_name: &str, sub_item_name: &str) -> RequestEnvelope {
        RequestEnvelope::post("/projects/suggest-sub-item").json(&json!({
            "project_name": project_name,
            "sub_item_name": sub_item_name,
        }))
    }
}

pub struct ReportApi<'a> {
    http: &'a HttpClient,
}

impl<'a> ReportApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// This week's report, `None` when it has not been started
    pub async fn get_current(&self) -> Result<Option<Report>> {
        self.http.json(request::get_current()).await
    }

    pub async fn get_list(&self, year: Option<i32>, week_num: Option<u32>) -> Result<Vec<Report>> {
        self.http.json(request::get_list(year, week_num)).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Report> {
        self.http.json(request::get_by_id(id)).await
    }

    pub async fn create(&self, data: &ReportCreate) -> Result<Report> {
        self.http.json(request::create(data)).await
    }

    pub async fn update(&self, id: i64, data: &ReportUpdate) -> Result<Report> {
        self.http.json(request::update(id, data)).await
    }

    pub async fn delete(&self, id: i64) -> Result<MessageResponse> {
        self.http.json(request::delete(id)).await
    }

    pub async fn get_deadline(&self, year: i32, week: u32) -> Result<Value> {
        self.http.value(request::get_deadline(year, week)).await
    }

    pub async fn parse_preview(&self, content: &str) -> Result<Value> {
        self.http.value(request::parse_preview(content)).await
    }

    pub async fn get_years(&self) -> Result<Vec<i32>> {
        self.http.json(request::get_years()).await
    }

    pub async fn get_projects(&self) -> Result<Value> {
        self.http.value(request::get_projects()).await
    }

    pub async fn admin_get_user_reports(&self, user_id: i64, year: Option<i32>) -> Result<Vec<Report>> {
        self.http.json(request::admin_get_user_reports(user_id, year)).await
    }

    pub async fn suggest_project(&self, name: &str) -> Result<Value> {
        self.http.value(request::suggest_project(name)).await
    }

    pub async fn suggest_sub_item(&self, project_name: &str, sub_item_name: &str) -> Result<Value> {
        self.http
            .value(request::suggest_sub_item(project_name, sub_item_name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_parse_preview_uses_long_timeout() {
        let env = request::parse_preview("本周完成……");
        assert_eq!(env.path, "/reports/parse-preview");
        assert_eq!(env.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_list_query() {
        assert!(request::get_list(None, None).query.is_empty());
        let env = request::get_list(Some(2025), None);
        assert_eq!(env.path, "/reports/");
        assert_eq!(env.query, vec![("year".to_string(), "2025".to_string())]);
    }

    #[test]
    fn test_admin_and_suggest_paths() {
        let env = request::admin_get_user_reports(12, Some(2024));
        assert_eq!(env.path, "/reports/admin/user/12");
        assert_eq!(env.query_value("year"), Some("2024"));

        let env = request::suggest_sub_item("平台", "接口");
        assert_eq!(env.method, Method::POST);
        assert_eq!(env.path, "/projects/suggest-sub-item");
        assert_eq!(env.json_body(), Some(&json!({ "project_name": "平台", "sub_item_name": "接口" })));
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ReportUpdate {
            status: Some(ReportStatus::Submitted),
            ..Default::default()
        };
        assert_eq!(request::update(3, &update).json_body(), Some(&json!({ "status": "submitted" })));
    }
}
