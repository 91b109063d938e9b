// Client-side API error types
use serde_json::Value;
use thiserror::Error;

/// Fallback shown when neither the response nor the transport carries a message
pub const GENERIC_FAILURE: &str = "Request failed";

/// Errors produced by the request pipeline and the session store
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 on a protected call. The session has already been cleared.
    #[error("{message}")]
    SessionExpired { path: String, message: String },

    /// 401 on the login call. Reported only to the caller.
    #[error("{message}")]
    Credential { message: String },

    /// Any other non-success status
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// No response at all (connect failure, timeout, broken body)
    #[error("{message}")]
    Transport { message: String, timeout: bool },

    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::session::storage::StorageError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status of the failed response, when there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired { .. } | ApiError::Credential { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message, as shown to the user
    pub fn message(&self) -> String {
        match self {
            ApiError::SessionExpired { message, .. } => message.clone(),
            ApiError::Credential { message } => message.clone(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Transport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Stable code for scripted consumers (CLI `--json` output)
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::SessionExpired { .. } => "SESSION_EXPIRED",
            ApiError::Credential { .. } => "INVALID_CREDENTIALS",
            ApiError::Status { status, .. } => match status {
                400 => "BAD_REQUEST",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "VALIDATION_ERROR",
                429 => "TOO_MANY_REQUESTS",
                500..=599 => "SERVER_ERROR",
                _ => "HTTP_ERROR",
            },
            ApiError::Transport { timeout: true, .. } => "TIMEOUT",
            ApiError::Transport { .. } => "NETWORK_ERROR",
            ApiError::Decode(_) => "INVALID_RESPONSE",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// Whether the pipeline already showed this failure through the notifier
    pub fn is_notified(&self) -> bool {
        matches!(self, ApiError::Status { .. } | ApiError::Transport { .. })
    }

    /// True for the 401 family, regardless of where it came from
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. } | ApiError::Credential { .. })
    }
}

/// Pull a readable message out of an error body.
///
/// The backend reports errors as `{"detail": "..."}`. Validation failures carry
/// a list of `{"msg": "..."}` objects under `detail` instead.
pub fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

/// Message precedence: body detail, then transport message, then the generic fallback
pub fn derive_message(body: Option<&Value>, transport: Option<&str>) -> String {
    if let Some(detail) = body.and_then(detail_message) {
        return detail;
    }
    match transport {
        Some(msg) if !msg.trim().is_empty() => msg.to_string(),
        _ => GENERIC_FAILURE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_string_wins() {
        let body = json!({ "detail": "原密码错误" });
        assert_eq!(derive_message(Some(&body), Some("status 400")), "原密码错误");
    }

    #[test]
    fn test_validation_detail_list() {
        let body = json!({ "detail": [
            { "loc": ["body", "title"], "msg": "field required" },
            { "loc": ["body", "priority"], "msg": "ensure this value is less than or equal to 3" }
        ]});
        assert_eq!(
            derive_message(Some(&body), None),
            "field required; ensure this value is less than or equal to 3"
        );
    }

    #[test]
    fn test_falls_back_to_transport_then_generic() {
        let body = json!({ "error": "no detail here" });
        assert_eq!(derive_message(Some(&body), Some("connection refused")), "connection refused");
        assert_eq!(derive_message(None, Some("  ")), GENERIC_FAILURE);
        assert_eq!(derive_message(None, None), GENERIC_FAILURE);
    }

    #[test]
    fn test_error_codes() {
        let err = ApiError::Status { status: 404, message: "gone".into(), body: None };
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.status_code(), Some(404));

        let err = ApiError::Transport { message: "timed out".into(), timeout: true };
        assert_eq!(err.error_code(), "TIMEOUT");
        assert_eq!(err.status_code(), None);

        let err = ApiError::Credential { message: "bad".into() };
        assert!(err.is_unauthenticated());
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn test_only_pipeline_failures_count_as_notified() {
        assert!(ApiError::Status { status: 500, message: "x".into(), body: None }.is_notified());
        assert!(ApiError::Transport { message: "x".into(), timeout: false }.is_notified());
        assert!(!ApiError::Credential { message: "x".into() }.is_notified());
        assert!(!ApiError::SessionExpired { path: "/tasks/".into(), message: "x".into() }.is_notified());
        assert!(!ApiError::Decode("x".into()).is_notified());
    }
}
