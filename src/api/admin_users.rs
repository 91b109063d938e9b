use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{MessageResponse, Role, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub real_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "backend_role")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "backend_role")]
    pub role: Option<Role>,
}

/// The backend names the non-admin role `user`
fn backend_role<S: serde::Serializer>(role: &Option<Role>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match role {
        Some(Role::Admin) => serializer.serialize_str("admin"),
        Some(Role::Normal) => serializer.serialize_str("user"),
        None => serializer.serialize_none(),
    }
}

pub mod request {
    use super::{UserCreate, UserUpdate};
    use crate::http::RequestEnvelope;

    pub fn list() -> RequestEnvelope {
        RequestEnvelope::get("/admin/users/")
    }

    pub fn create(data: &UserCreate) -> RequestEnvelope {
        RequestEnvelope::post("/admin/users/").json(data)
    }

    pub fn update(id: i64, data: &UserUpdate) -> RequestEnvelope {
        RequestEnvelope::put(format!("/admin/users/{}", id)).json(data)
    }

    pub fn delete(id: i64) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/admin/users/{}", id))
    }

    pub fn reset_password(id: i64) -> RequestEnvelope {
        RequestEnvelope::put(format!("/admin/users/{}/reset-password", id))
    }
}

pub struct AdminUsersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AdminUsersApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        self.http.json(request::list()).await
    }

    pub async fn create(&self, data: &UserCreate) -> Result<UserProfile> {
        self.http.json(request::create(data)).await
    }

    pub async fn update(&self, id: i64, data: &UserUpdate) -> Result<UserProfile> {
        self.http.json(request::update(id, data)).await
    }

    pub async fn delete(&self, id: i64) -> Result<MessageResponse> {
        self.http.json(request::delete(id)).await
    }

    /// Server resets to its default password and flags the account for a change
    pub async fn reset_password(&self, id: i64) -> Result<MessageResponse> {
        self.http.json(request::reset_password(id)).await
    }
}
