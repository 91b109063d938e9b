//! One module per backend resource.
//!
//! Each module has a `request` table of pure envelope builders (typed
//! arguments in, one [`RequestEnvelope`](crate::http::RequestEnvelope) out)
//! and a thin `*Api` wrapper that sends them through the shared pipeline.
//! No retries, no caching, no local validation.

pub mod admin_users;
pub mod auth;
pub mod daily_report;
pub mod projects;
pub mod report;
pub mod summary;
pub mod task;

pub use admin_users::AdminUsersApi;
pub use auth::AuthApi;
pub use daily_report::DailyReportApi;
pub use projects::ProjectsApi;
pub use report::ReportApi;
pub use summary::SummaryApi;
pub use task::TaskApi;

/// Percent-encode one path segment (names may contain spaces, slashes or CJK text)
pub fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("plain"), "plain");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_segment("a+b"), "a%2Bb");
        assert_eq!(encode_segment("项目"), "%E9%A1%B9%E7%9B%AE");
    }
}
