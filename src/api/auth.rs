use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{MessageResponse, UserProfile};

/// 401s on this path are credential errors, not session expiry
pub const LOGIN_PATH: &str = "/auth/login";
pub const ME_PATH: &str = "/auth/me";

/// Credential exchange result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub must_change_password: bool,
}

pub mod request {
    use serde_json::json;

    use super::{LOGIN_PATH, ME_PATH};
    use crate::http::RequestEnvelope;

    /// Form-encoded, as the backend's OAuth2 password flow expects
    pub fn login(username: &str, password: &str) -> RequestEnvelope {
        RequestEnvelope::post(LOGIN_PATH).form(&[("username", username), ("password", password)])
    }

    pub fn get_me() -> RequestEnvelope {
        RequestEnvelope::get(ME_PATH)
    }

    pub fn change_password(old_password: &str, new_password: &str) -> RequestEnvelope {
        RequestEnvelope::put("/auth/password").json(&json!({
            "old_password": old_password,
            "new_password": new_password,
        }))
    }
}

pub struct AuthApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        self.http.json(request::login(username, password)).await
    }

    pub async fn get_me(&self) -> Result<UserProfile> {
        self.http.json(request::get_me()).await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<MessageResponse> {
        self.http
            .json(request::change_password(old_password, new_password))
            .await
    }
}
