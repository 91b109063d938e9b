use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;

use crate::api::daily_report::{DailyReport, DailyReportCreate, DailyReportUpdate, WeekDailySummary};
use crate::api::DailyReportApi;
use crate::error::Result;
use crate::stores::LoadingGuard;

#[derive(Debug, Default)]
struct State {
    current: Option<DailyReport>,
    reports: Vec<DailyReport>,
    week_summary: Option<WeekDailySummary>,
}

/// Daily report screen state
#[derive(Debug, Default)]
pub struct DailyReportStore {
    state: Mutex<State>,
    loading: AtomicBool,
}

impl DailyReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> Option<DailyReport> {
        self.state().current.clone()
    }

    pub fn reports(&self) -> Vec<DailyReport> {
        self.state().reports.clone()
    }

    pub fn week_summary(&self) -> Option<WeekDailySummary> {
        self.state().week_summary.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Today's report
    pub async fn fetch_current(&self, api: &DailyReportApi<'_>) -> Result<Option<DailyReport>> {
        let _loading = LoadingGuard::raise(&self.loading);
        let current = api.get_current().await?;
        self.state().current = current.clone();
        Ok(current)
    }

    pub async fn fetch_list(
        &self,
        api: &DailyReportApi<'_>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DailyReport>> {
        let _loading = LoadingGuard::raise(&self.loading);
        let reports = api.get_list(start_date, end_date).await?;
        self.state().reports = reports.clone();
        Ok(reports)
    }

    /// Load the report for one day into `current`, or clear it when that day has none
    pub async fn fetch_by_date(&self, api: &DailyReportApi<'_>, date: NaiveDate) -> Result<Option<DailyReport>> {
        let _loading = LoadingGuard::raise(&self.loading);
        let found = api.get_list(Some(date), Some(date)).await?.into_iter().next();
        self.state().current = found.clone();
        Ok(found)
    }

    pub async fn save(&self, api: &DailyReportApi<'_>, data: DailyReportCreate) -> Result<DailyReport> {
        let existing = self.current().map(|r| r.id);
        let saved = match existing {
            Some(id) => api.update(id, &DailyReportUpdate::from(data)).await?,
            None => api.create(&data).await?,
        };
        self.state().current = Some(saved.clone());
        Ok(saved)
    }

    pub async fn delete(&self, api: &DailyReportApi<'_>, id: i64) -> Result<()> {
        api.delete(id).await?;
        let mut state = self.state();
        if state.current.as_ref().is_some_and(|r| r.id == id) {
            state.current = None;
        }
        state.reports.retain(|r| r.id != id);
        Ok(())
    }

    pub async fn fetch_week_summary(
        &self,
        api: &DailyReportApi<'_>,
        year: Option<i32>,
        week_num: Option<u32>,
    ) -> Result<WeekDailySummary> {
        let _loading = LoadingGuard::raise(&self.loading);
        let summary = api.get_week_summary(year, week_num).await?;
        self.state().week_summary = Some(summary.clone());
        Ok(summary)
    }

    pub fn reset_current(&self) {
        self.state().current = None;
    }
}
