//! Page-local state holders for the report screens.
//!
//! Each store keeps the record being edited, the last fetched list and a
//! `loading` flag. The flag is raised for the duration of a fetch and lowered
//! again whether the call succeeds or fails.

pub mod daily_report;
pub mod report;

use std::sync::atomic::{AtomicBool, Ordering};

pub use daily_report::DailyReportStore;
pub use report::ReportStore;

/// Raises a loading flag and lowers it on drop
pub(crate) struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    pub(crate) fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_lowers_flag() {
        let flag = AtomicBool::new(false);
        {
            let _guard = LoadingGuard::raise(&flag);
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }
}
