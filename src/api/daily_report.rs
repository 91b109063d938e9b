use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::MessageResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub project_name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub hours: Option<Decimal>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub task_progress: Option<u8>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub work_content: Option<String>,
    #[serde(default)]
    pub items: Vec<DailyReportItem>,
    #[serde(default = "editable_default")]
    pub editable: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Present on the admin listing only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

fn editable_default() -> bool {
    true
}

/// Item as submitted with a create or update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReportItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportCreate {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<DailyReportItemInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<DailyReportItemInput>>,
}

impl From<DailyReportCreate> for DailyReportUpdate {
    fn from(create: DailyReportCreate) -> Self {
        Self {
            work_content: create.work_content,
            items: create.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDailyWorkItem {
    #[serde(default)]
    pub project_name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub hours: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyParseResult {
    #[serde(default)]
    pub items: Vec<ParsedDailyWorkItem>,
    #[serde(default)]
    pub raw_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDailySummary {
    pub year: i32,
    pub week_num: u32,
    #[serde(default)]
    pub daily_reports: Vec<DailyReport>,
    #[serde(default)]
    pub summary_by_project: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub total_hours_by_project: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDeadlineInfo {
    pub report_date: NaiveDate,
    pub deadline: NaiveDateTime,
    pub is_editable: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

pub mod request {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{DailyReportCreate, DailyReportUpdate};
    use crate::config::LONG_TIMEOUT;
    use crate::http::RequestEnvelope;

    pub fn get_current() -> RequestEnvelope {
        RequestEnvelope::get("/daily-reports/current")
    }

    pub fn get_list(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> RequestEnvelope {
        RequestEnvelope::get("/daily-reports/")
            .query_opt("start_date", start_date)
            .query_opt("end_date", end_date)
    }

    pub fn get_by_id(id: i64) -> RequestEnvelope {
        RequestEnvelope::get(format!("/daily-reports/{}", id))
    }

    pub fn create(data: &DailyReportCreate) -> RequestEnvelope {
        RequestEnvelope::post("/daily-reports/").json(data)
    }

    pub fn update(id: i64, data: &DailyReportUpdate) -> RequestEnvelope {
        RequestEnvelope::put(format!("/daily-reports/{}", id)).json(data)
    }

    pub fn delete(id: i64) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/daily-reports/{}", id))
    }

    pub fn get_deadline(report_date: NaiveDate) -> RequestEnvelope {
        RequestEnvelope::get("/daily-reports/deadline").query("report_date", report_date)
    }

    pub fn parse_preview(work_content: &str) -> RequestEnvelope {
        RequestEnvelope::post("/daily-reports/parse-preview")
            .json(&json!({ "work_content": work_content }))
            .timeout(LONG_TIMEOUT)
    }

    pub fn get_week_summary(year: Option<i32>, week_num: Option<u32>) -> RequestEnvelope {
        RequestEnvelope::get("/daily-reports/week-summary")
            .query_opt("year", year)
            .query_opt("week_num", week_num)
    }

    pub fn admin_get_list(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> RequestEnvelope {
        RequestEnvelope::get("/daily-reports/admin/list")
            .query_opt("start_date", start_date)
            .query_opt("end_date", end_date)
    }

    pub fn admin_update_item_hours(item_id: i64, hours: Decimal) -> RequestEnvelope {
        RequestEnvelope::put(format!("/daily-reports/admin/item/{}/hours", item_id)).json(&json!({ "hours": hours }))
    }
}

pub struct DailyReportApi<'a> {
    http: &'a HttpClient,
}

impl<'a> DailyReportApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Today's report, `None` when nothing has been written yet
    pub async fn get_current(&self) -> Result<Option<DailyReport>> {
        self.http.json(request::get_current()).await
    }

    pub async fn get_list(&self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Result<Vec<DailyReport>> {
        self.http.json(request::get_list(start_date, end_date)).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<DailyReport> {
        self.http.json(request::get_by_id(id)).await
    }

    pub async fn create(&self, data: &DailyReportCreate) -> Result<DailyReport> {
        self.http.json(request::create(data)).await
    }

    pub async fn update(&self, id: i64, data: &DailyReportUpdate) -> Result<DailyReport> {
        self.http.json(request::update(id, data)).await
    }

    pub async fn delete(&self, id: i64) -> Result<MessageResponse> {
        self.http.json(request::delete(id)).await
    }

    pub async fn get_deadline(&self, report_date: NaiveDate) -> Result<DailyDeadlineInfo> {
        self.http.json(request::get_deadline(report_date)).await
    }

    pub async fn parse_preview(&self, work_content: &str) -> Result<DailyParseResult> {
        self.http.json(request::parse_preview(work_content)).await
    }

    pub async fn get_week_summary(&self, year: Option<i32>, week_num: Option<u32>) -> Result<WeekDailySummary> {
        self.http.json(request::get_week_summary(year, week_num)).await
    }

    pub async fn admin_get_list(&self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Result<Vec<DailyReport>> {
        self.http.json(request::admin_get_list(start_date, end_date)).await
    }

    pub async fn admin_update_item_hours(&self, item_id: i64, hours: Decimal) -> Result<Value> {
        self.http.value(request::admin_update_item_hours(item_id, hours)).await
    }
}
