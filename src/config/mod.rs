use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Parse-preview endpoints run an LLM on the server side
pub const LONG_TIMEOUT: Duration = Duration::from_millis(60_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend
    pub base_url: String,
    /// Sub-path the application is served under ("/" at the root)
    pub base_path: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_path: "/".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("WR_API_URL") {
            if !v.trim().is_empty() {
                self.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("WR_BASE_PATH") {
            self.base_path = v;
        }
        if let Ok(v) = env::var("WR_TIMEOUT_MS") {
            match parse_timeout_ms(&v) {
                Some(ms) => self.timeout_ms = ms,
                None => tracing::warn!(
                    value = %v,
                    default_ms = self.timeout_ms,
                    "Ignoring WR_TIMEOUT_MS: expected a positive number of milliseconds"
                ),
            }
        }

        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Path prefix every API call is issued under.
    ///
    /// `/` maps to `/api`; a sub-path such as `/weekly/` maps to `/weekly/api`.
    pub fn api_prefix(&self) -> String {
        let trimmed = self.base_path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return "/api".to_string();
        }
        let mut prefix = String::new();
        if !trimmed.starts_with('/') {
            prefix.push('/');
        }
        prefix.push_str(trimmed);
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        prefix.push_str("api");
        prefix
    }

    /// Base address of the API, e.g. `http://host:8000/api`
    pub fn api_base(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.api_prefix())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Positive millisecond count; zero would fail every call on the spot
fn parse_timeout_ms(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_override_must_be_positive() {
        assert_eq!(parse_timeout_ms("2500"), Some(2500));
        assert_eq!(parse_timeout_ms(" 60000 "), Some(60_000));
        assert_eq!(parse_timeout_ms("0"), None);
        assert_eq!(parse_timeout_ms("10s"), None);
        assert_eq!(parse_timeout_ms(""), None);
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.api_prefix(), "/api");
        assert_eq!(config.api_base(), "http://127.0.0.1:8000/api");
    }

    #[test]
    fn test_sub_path_prefix() {
        let config = ClientConfig::default().with_base_path("/weekly/");
        assert_eq!(config.api_prefix(), "/weekly/api");

        let config = ClientConfig::default().with_base_path("weekly");
        assert_eq!(config.api_prefix(), "/weekly/api");
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let config = ClientConfig::default().with_base_url("https://reports.example.com/");
        assert_eq!(config.api_base(), "https://reports.example.com/api");
    }
}
