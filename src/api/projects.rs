use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::HttpClient;

/// Category assigned when the caller does not pick one
pub const DEFAULT_CATEGORY: &str = "其他";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub sub_items: Vec<SubItem>,
}

impl ProjectCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            description: String::new(),
            aliases: Vec::new(),
            sub_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_items: Option<Vec<SubItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub mod request {
    use serde_json::json;

    use super::{ProjectCreate, ProjectUpdate, SubItemUpdate};
    use crate::api::encode_segment as seg;
    use crate::http::RequestEnvelope;

    pub fn get_projects() -> RequestEnvelope {
        RequestEnvelope::get("/admin/projects/")
    }

    pub fn get_projects_detail() -> RequestEnvelope {
        RequestEnvelope::get("/admin/projects/detail")
    }

    pub fn get_project(name: &str) -> RequestEnvelope {
        RequestEnvelope::get(format!("/admin/projects/detail/{}", seg(name)))
    }

    pub fn create_project(data: &ProjectCreate) -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/create").json(data)
    }

    pub fn update_project(name: &str, data: &ProjectUpdate) -> RequestEnvelope {
        RequestEnvelope::put(format!("/admin/projects/update/{}", seg(name))).json(data)
    }

    pub fn rename_project(name: &str, new_name: &str) -> RequestEnvelope {
        RequestEnvelope::put(format!("/admin/projects/rename/{}", seg(name))).json(&json!({ "new_name": new_name }))
    }

    pub fn delete_project(name: &str) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/admin/projects/delete/{}", seg(name)))
    }

    pub fn add_sub_item(project_name: &str, name: &str, description: &str) -> RequestEnvelope {
        RequestEnvelope::post(format!("/admin/projects/{}/sub-items", seg(project_name)))
            .json(&json!({ "name": name, "description": description }))
    }

    pub fn update_sub_item(project_name: &str, sub_name: &str, data: &SubItemUpdate) -> RequestEnvelope {
        RequestEnvelope::put(format!(
            "/admin/projects/{}/sub-items/{}",
            seg(project_name),
            seg(sub_name)
        ))
        .json(data)
    }

    pub fn remove_sub_item(project_name: &str, sub_name: &str) -> RequestEnvelope {
        RequestEnvelope::delete(format!(
            "/admin/projects/{}/sub-items/{}",
            seg(project_name),
            seg(sub_name)
        ))
    }

    pub fn get_categories() -> RequestEnvelope {
        RequestEnvelope::get("/admin/projects/categories")
    }

    pub fn add_category(name: &str) -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/categories").json(&json!({ "name": name }))
    }

    pub fn remove_category(name: &str) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/admin/projects/categories/{}", seg(name)))
    }

    pub fn get_pending() -> RequestEnvelope {
        RequestEnvelope::get("/admin/projects/pending")
    }

    pub fn get_rejected() -> RequestEnvelope {
        RequestEnvelope::get("/admin/projects/rejected")
    }

    pub fn approve(name: &str, category: &str) -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/approve").json(&json!({ "name": name, "category": category }))
    }

    pub fn merge(pending_name: &str, target_project: &str) -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/merge").json(&json!({
            "pending_name": pending_name,
            "target_project": target_project,
        }))
    }

    pub fn reject(name: &str) -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/reject").json(&json!({ "name": name }))
    }

    pub fn add_alias(project_name: &str, alias: &str) -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/alias").json(&json!({
            "project_name": project_name,
            "alias": alias,
        }))
    }

    pub fn remove_from_rejected(name: &str) -> RequestEnvelope {
        RequestEnvelope::delete(format!("/admin/projects/rejected/{}", seg(name)))
    }

    pub fn rebuild_embeddings() -> RequestEnvelope {
        RequestEnvelope::post("/admin/projects/rebuild-embeddings")
    }
}

/// Admin project catalogue. Responses are passed through as JSON.
pub struct ProjectsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_projects(&self) -> Result<Value> {
        self.http.value(request::get_projects()).await
    }

    pub async fn get_projects_detail(&self) -> Result<Value> {
        self.http.value(request::get_projects_detail()).await
    }

    pub async fn get_project(&self, name: &str) -> Result<Value> {
        self.http.value(request::get_project(name)).await
    }

    pub async fn create_project(&self, data: &ProjectCreate) -> Result<Value> {
        self.http.value(request::create_project(data)).await
    }

    pub async fn update_project(&self, name: &str, data: &ProjectUpdate) -> Result<Value> {
        self.http.value(request::update_project(name, data)).await
    }

    pub async fn rename_project(&self, name: &str, new_name: &str) -> Result<Value> {
        self.http.value(request::rename_project(name, new_name)).await
    }

    pub async fn delete_project(&self, name: &str) -> Result<Value> {
        self.http.value(request::delete_project(name)).await
    }

    pub async fn add_sub_item(&self, project_name: &str, name: &str, description: &str) -> Result<Value> {
        self.http
            .value(request::add_sub_item(project_name, name, description))
            .await
    }

    pub async fn update_sub_item(&self, project_name: &str, sub_name: &str, data: &SubItemUpdate) -> Result<Value> {
        self.http
            .value(request::update_sub_item(project_name, sub_name, data))
            .await
    }

    pub async fn remove_sub_item(&self, project_name: &str, sub_name: &str) -> Result<Value> {
        self.http
            .value(request::remove_sub_item(project_name, sub_name))
            .await
    }

    pub async fn get_categories(&self) -> Result<Value> {
        self.http.value(request::get_categories()).await
    }

    pub async fn add_category(&self, name: &str) -> Result<Value> {
        self.http.value(request::add_category(name)).await
    }

    pub async fn remove_category(&self, name: &str) -> Result<Value> {
        self.http.value(request::remove_category(name)).await
    }

    pub async fn get_pending(&self) -> Result<Value> {
        self.http.value(request::get_pending()).await
    }

    pub async fn get_rejected(&self) -> Result<Value> {
        self.http.value(request::get_rejected()).await
    }

    pub async fn approve(&self, name: &str, category: Option<&str>) -> Result<Value> {
        self.http
            .value(request::approve(name, category.unwrap_or(DEFAULT_CATEGORY)))
            .await
    }

    pub async fn merge(&self, pending_name: &str, target_project: &str) -> Result<Value> {
        self.http.value(request::merge(pending_name, target_project)).await
    }

    pub async fn reject(&self, name: &str) -> Result<Value> {
        self.http.value(request::reject(name)).await
    }

    pub async fn add_alias(&self, project_name: &str, alias: &str) -> Result<Value> {
        self.http.value(request::add_alias(project_name, alias)).await
    }

    pub async fn remove_from_rejected(&self, name: &str) -> Result<Value> {
        self.http.value(request::remove_from_rejected(name)).await
    }

    pub async fn rebuild_embeddings(&self) -> Result<Value> {
        self.http.value(request::rebuild_embeddings()).await
    }
}
