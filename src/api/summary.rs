use serde_json::Value;

use crate::error::Result;
use crate::http::HttpClient;

pub mod request {
    use serde_json::json;

    use crate::http::RequestEnvelope;

    pub fn get_weekly(year: Option<i32>, week: Option<u32>) -> RequestEnvelope {
        RequestEnvelope::get("/summary/weekly")
            .query_opt("year", year)
            .query_opt("week", week)
    }

    pub fn get_dashboard() -> RequestEnvelope {
        RequestEnvelope::get("/summary/dashboard")
    }

    pub fn get_chart_data(year: Option<i32>) -> RequestEnvelope {
        RequestEnvelope::get("/summary/chart-data").query_opt("year", year)
    }

    pub fn get_latest_week() -> RequestEnvelope {
        RequestEnvelope::get("/summary/latest-week")
    }

    pub fn get_available_weeks() -> RequestEnvelope {
        RequestEnvelope::get("/summary/available-weeks")
    }

    pub fn trigger_analysis(year: i32, week: u32) -> RequestEnvelope {
        RequestEnvelope::post("/summary/trigger-analysis").json(&json!({ "year": year, "week": week }))
    }

    /// Word document, returned as raw bytes
    pub fn download_word(year: i32, week: u32) -> RequestEnvelope {
        RequestEnvelope::get(format!("/summary/download/{}/{}", year, week)).binary()
    }
}

/// Weekly summary, charts and the generated Word document
pub struct SummaryApi<'a> {
    http: &'a HttpClient,
}

impl<'a> SummaryApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_weekly(&self, year: Option<i32>, week: Option<u32>) -> Result<Value> {
        self.http.value(request::get_weekly(year, week)).await
    }

    pub async fn get_dashboard(&self) -> Result<Value> {
        self.http.value(request::get_dashboard()).await
    }

    pub async fn get_chart_data(&self, year: Option<i32>) -> Result<Value> {
        self.http.value(request::get_chart_data(year)).await
    }

    pub async fn get_latest_week(&self) -> Result<Value> {
        self.http.value(request::get_latest_week()).await
    }

    pub async fn get_available_weeks(&self) -> Result<Value> {
        self.http.value(request::get_available_weeks()).await
    }

    pub async fn trigger_analysis(&self, year: i32, week: u32) -> Result<Value> {
        self.http.value(request::trigger_analysis(year, week)).await
    }

    pub async fn download_word(&self, year: i32, week: u32) -> Result<Vec<u8>> {
        self.http.bytes(request::download_word(year, week)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ResponseKind;

    #[test]
    fn test_download_is_binary() {
        let env = request::download_word(2025, 9);
        assert_eq!(env.path, "/summary/download/2025/9");
        assert_eq!(env.response, ResponseKind::Binary);
        assert_eq!(request::get_dashboard().response, ResponseKind::Json);
    }

    #[test]
    fn test_weekly_query() {
        let env = request::get_weekly(Some(2025), Some(9));
        assert_eq!(env.query_value("year"), Some("2025"));
        assert_eq!(env.query_value("week"), Some("9"));
        assert!(request::get_weekly(None, None).query.is_empty());
        assert!(request::get_chart_data(None).query.is_empty());
    }
}
