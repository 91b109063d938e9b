use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::api::report::{Report, ReportCreate, ReportUpdate};
use crate::api::ReportApi;
use crate::error::Result;
use crate::stores::LoadingGuard;

#[derive(Debug, Default)]
struct State {
    current: Option<Report>,
    reports: Vec<Report>,
}

/// Weekly report screen state
#[derive(Debug, Default)]
pub struct ReportStore {
    state: Mutex<State>,
    loading: AtomicBool,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Report> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current.clone()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).reports.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn fetch_current(&self, api: &ReportApi<'_>) -> Result<Option<Report>> {
        let _loading = LoadingGuard::raise(&self.loading);
        let current = api.get_current().await?;
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current = current.clone();
        Ok(current)
    }

    pub async fn fetch_list(&self, api: &ReportApi<'_>, year: Option<i32>, week_num: Option<u32>) -> Result<Vec<Report>> {
        let _loading = LoadingGuard::raise(&self.loading);
        let reports = api.get_list(year, week_num).await?;
        self.state.lock().unwrap_or_else(PoisonError::into_inner).reports = reports.clone();
        Ok(reports)
    }

    /// Update the current report if it has been saved before, create it otherwise
    pub async fn save(&self, api: &ReportApi<'_>, data: ReportCreate) -> Result<Report> {
        let saved = match self.current().map(|r| r.id) {
            Some(id) => api.update(id, &ReportUpdate::from(data)).await?,
            None => api.create(&data).await?,
        };
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current = Some(saved.clone());
        Ok(saved)
    }

    pub async fn delete(&self, api: &ReportApi<'_>, id: i64) -> Result<()> {
        api.delete(id).await?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.current.as_ref().is_some_and(|r| r.id == id) {
            state.current = None;
        }
        state.reports.retain(|r| r.id != id);
        Ok(())
    }

    pub fn reset_current(&self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current = None;
    }
}
