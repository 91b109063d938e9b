//! The single request pipeline every API module funnels through.
//!
//! Stages, in order:
//! 1. **Outgoing**: attach `Authorization: Bearer <token>` when the session has
//!    a token. Anonymous calls go out without the header.
//! 2. **Transport**: send with the envelope's timeout, or the configured
//!    default (10 s).
//! 3. **Response transform**: on success, hand back only the payload (parsed
//!    JSON, or raw bytes for binary envelopes). Status line and headers are
//!    dropped. An empty body becomes `null`.
//! 4. **Failure policy**:
//!    - 401 on any path but the login endpoint: clear the session, navigate
//!      to the login screen, return [`ApiError::SessionExpired`]. No
//!      notification.
//!    - 401 on the login endpoint: return [`ApiError::Credential`] untouched.
//!    - Anything else: derive a message (body `detail`, then transport
//!      message, then a generic string), notify once, return the error.
//!
//! Nothing is retried.

pub mod envelope;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::auth::LOGIN_PATH;
use crate::config::ClientConfig;
use crate::error::{derive_message, ApiError, Result};
use crate::notify::{Notifier, TracingNotifier};
use crate::router::{Navigator, NoopNavigator, LOGIN_ROUTE};
use crate::session::SessionStore;
pub use envelope::{RequestBody, RequestEnvelope, ResponseKind};

/// Unwrapped success payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Binary(Vec<u8>),
}

enum Failure {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: Option<Value> },
}

pub struct HttpClient {
    inner: reqwest::Client,
    api_base: String,
    default_timeout: Duration,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_base", &self.api_base)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

pub struct HttpClientBuilder {
    config: ClientConfig,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl HttpClientBuilder {
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let api_base = self.config.api_base();
        Url::parse(&api_base).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", api_base, e)))?;

        let inner = reqwest::Client::builder()
            .user_agent(concat!("workreport-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(HttpClient {
            inner,
            api_base,
            default_timeout: self.config.default_timeout(),
            session: self.session,
            notifier: self.notifier,
            navigator: self.navigator,
        })
    }
}

impl HttpClient {
    pub fn builder(config: &ClientConfig, session: Arc<SessionStore>) -> HttpClientBuilder {
        HttpClientBuilder {
            config: config.clone(),
            session,
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NoopNavigator),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url_for(&self, envelope: &RequestEnvelope) -> Result<Url> {
        let raw = format!("{}{}", self.api_base, envelope.path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", raw, e)))
    }

    pub async fn execute(&self, envelope: RequestEnvelope) -> Result<Payload> {
        let url = self.url_for(&envelope)?;
        let timeout = envelope.timeout.unwrap_or(self.default_timeout);

        let mut request = self
            .inner
            .request(envelope.method.clone(), url)
            .timeout(timeout);
        if !envelope.query.is_empty() {
            request = request.query(&envelope.query);
        }
        request = match &envelope.body {
            Some(RequestBody::Json(body)) => request.json(body),
            Some(RequestBody::Form(fields)) => request.form(fields),
            None => request,
        };

        // Outgoing stage
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.reject(&envelope, timeout, Failure::Transport(e))),
        };
        let status = response.status();

        tracing::debug!(
            method = %envelope.method,
            path = %envelope.path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
                Err(_) => None,
            };
            return Err(self.reject(&envelope, timeout, Failure::Status { status, body }));
        }

        // Response transform
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.reject(&envelope, timeout, Failure::Transport(e))),
        };
        match envelope.response {
            ResponseKind::Binary => Ok(Payload::Binary(bytes.to_vec())),
            ResponseKind::Json if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Payload::Json(Value::Null)),
            ResponseKind::Json => serde_json::from_slice(&bytes)
                .map(Payload::Json)
                .map_err(|e| ApiError::Decode(format!("{} {}: {}", envelope.method, envelope.path, e))),
        }
    }

    /// Execute and return the JSON payload untyped
    pub async fn value(&self, envelope: RequestEnvelope) -> Result<Value> {
        match self.execute(envelope).await? {
            Payload::Json(value) => Ok(value),
            Payload::Binary(_) => Err(ApiError::Decode("expected JSON, got binary payload".to_string())),
        }
    }

    /// Execute and deserialize the JSON payload
    pub async fn json<T: DeserializeOwned>(&self, envelope: RequestEnvelope) -> Result<T> {
        let path = envelope.path.clone();
        let value = self.value(envelope).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    /// Execute a binary envelope and return the raw bytes
    pub async fn bytes(&self, envelope: RequestEnvelope) -> Result<Vec<u8>> {
        match self.execute(envelope.binary()).await? {
            Payload::Binary(bytes) => Ok(bytes),
            Payload::Json(_) => Err(ApiError::Decode("expected binary payload".to_string())),
        }
    }

    fn reject(&self, envelope: &RequestEnvelope, timeout: Duration, failure: Failure) -> ApiError {
        match failure {
            Failure::Status { status, body } if status == StatusCode::UNAUTHORIZED => {
                let fallback = format!("Request failed with status code {}", status.as_u16());
                let message = derive_message(body.as_ref(), Some(&fallback));

                if envelope.path == LOGIN_PATH {
                    return ApiError::Credential { message };
                }

                tracing::warn!(path = %envelope.path, "Session rejected by server, logging out");
                if let Err(e) = self.session.logout() {
                    tracing::error!("Failed to clear stored session: {}", e);
                }
                self.navigator.navigate(LOGIN_ROUTE);

                ApiError::SessionExpired {
                    path: envelope.path.clone(),
                    message,
                }
            }
            Failure::Status { status, body } => {
                let fallback = format!("Request failed with status code {}", status.as_u16());
                let message = derive_message(body.as_ref(), Some(&fallback));
                self.notifier.error(&message);

                ApiError::Status {
                    status: status.as_u16(),
                    message,
                    body,
                }
            }
            Failure::Transport(e) => {
                let timed_out = e.is_timeout();
                let transport = if timed_out {
                    format!("timeout of {}ms exceeded", timeout.as_millis())
                } else {
                    e.to_string()
                };
                let message = derive_message(None, Some(&transport));
                tracing::debug!(path = %envelope.path, error = %e, "Transport failure");
                self.notifier.error(&message);

                ApiError::Transport {
                    message,
                    timeout: timed_out,
                }
            }
        }
    }
}
