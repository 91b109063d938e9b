#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use workreport_client::notify::RecordingNotifier;
use workreport_client::session::storage::MemoryStorage;
use workreport_client::{ClientConfig, SessionStore, WorkReportClient};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "T1";
pub const DOCX_BYTES: &[u8] = b"PK\x03\x04weekly-summary";
pub const SLOW_MS: u64 = 400;

/// What the fake backend knows and what it has seen
pub struct MockState {
    valid_token: Mutex<String>,
    password: Mutex<String>,
    must_change_password: AtomicBool,
    admin: AtomicBool,
    fail_profile: AtomicBool,
    seen_auth: Mutex<Vec<(String, Option<String>)>>,
    daily: Mutex<Vec<Value>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            valid_token: Mutex::new(TOKEN.to_string()),
            password: Mutex::new(PASSWORD.to_string()),
            must_change_password: AtomicBool::new(false),
            admin: AtomicBool::new(false),
            fail_profile: AtomicBool::new(false),
            seen_auth: Mutex::new(Vec::new()),
            daily: Mutex::new(vec![daily_report(11, "2025-03-03", "接口联调")]),
        }
    }
}

impl MockState {
    /// Server-side expiry: the issued token stops being accepted
    pub fn revoke_tokens(&self) {
        *self.valid_token.lock().unwrap() = String::new();
    }

    pub fn restore_tokens(&self) {
        *self.valid_token.lock().unwrap() = TOKEN.to_string();
    }

    pub fn set_must_change_password(&self, value: bool) {
        self.must_change_password.store(value, Ordering::SeqCst);
    }

    pub fn set_admin(&self, value: bool) {
        self.admin.store(value, Ordering::SeqCst);
    }

    pub fn fail_profile(&self, value: bool) {
        self.fail_profile.store(value, Ordering::SeqCst);
    }

    /// (path, Authorization header) for every request, in order
    pub fn seen_auth(&self) -> Vec<(String, Option<String>)> {
        self.seen_auth.lock().unwrap().clone()
    }

    pub fn auth_header_for(&self, path: &str) -> Option<Option<String>> {
        self.seen_auth()
            .into_iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, h)| h)
    }

    fn record(&self, path: &str, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen_auth.lock().unwrap().push((path.to_string(), auth));
    }

    fn authorize(&self, path: &str, headers: &HeaderMap) -> Result<(), Response> {
        self.record(path, headers);
        let valid = self.valid_token.lock().unwrap().clone();
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match presented {
            Some(token) if !valid.is_empty() && token == valid => Ok(()),
            _ => Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")),
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn daily_report(id: i64, date: &str, content: &str) -> Value {
    json!({
        "id": id,
        "user_id": 7,
        "date": date,
        "work_content": content,
        "items": [],
        "editable": true
    })
}

type Shared = State<Arc<MockState>>;

async fn health() -> &'static str {
    "ok"
}

async fn login(State(state): Shared, headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    state.record("/auth/login", &headers);
    let username = form.get("username").map(String::as_str);
    let password = form.get("password").cloned();

    if username == Some(USERNAME) && password.as_deref() == Some(state.password.lock().unwrap().as_str()) {
        let token = state.valid_token.lock().unwrap().clone();
        Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "must_change_password": state.must_change_password.load(Ordering::SeqCst)
        }))
        .into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "用户名或密码错误")
    }
}

async fn me(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/auth/me", &headers) {
        return response;
    }
    if state.fail_profile.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "profile unavailable");
    }
    let role = if state.admin.load(Ordering::SeqCst) { "admin" } else { "normal" };
    Json(json!({ "id": 7, "username": USERNAME, "role": role, "real_name": "Alice" })).into_response()
}

async fn change_password(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(response) = state.authorize("/auth/password", &headers) {
        return response;
    }
    let mut password = state.password.lock().unwrap();
    if body["old_password"].as_str() != Some(password.as_str()) {
        return detail(StatusCode::BAD_REQUEST, "原密码错误");
    }
    *password = body["new_password"].as_str().unwrap_or_default().to_string();
    state.must_change_password.store(false, Ordering::SeqCst);
    Json(json!({ "message": "密码修改成功" })).into_response()
}

async fn tasks(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/tasks/", &headers) {
        return response;
    }
    Json(json!([])).into_response()
}

async fn my_tasks(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/tasks/my-tasks", &headers) {
        return response;
    }
    Json(json!([{ "id": 3, "title": "联调", "status": "in_progress", "progress": 40 }])).into_response()
}

async fn task_by_id(State(state): Shared, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(response) = state.authorize(&format!("/tasks/{}", id), &headers) {
        return response;
    }
    detail(StatusCode::NOT_FOUND, "任务不存在")
}

async fn delete_task(State(state): Shared, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(response) = state.authorize(&format!("/tasks/{}", id), &headers) {
        return response;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn daily_list(State(state): Shared, headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if let Err(response) = state.authorize("/daily-reports/", &headers) {
        return response;
    }
    let reports = state.daily.lock().unwrap().clone();
    let filtered: Vec<Value> = match query.get("start_date") {
        Some(start) => reports
            .into_iter()
            .filter(|r| r["date"].as_str() == Some(start.as_str()))
            .collect(),
        None => reports,
    };
    Json(Value::Array(filtered)).into_response()
}

async fn daily_create(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(response) = state.authorize("/daily-reports/", &headers) {
        return response;
    }
    let mut reports = state.daily.lock().unwrap();
    let id = 100 + reports.len() as i64;
    let report = daily_report(
        id,
        body["date"].as_str().unwrap_or_default(),
        body["work_content"].as_str().unwrap_or_default(),
    );
    reports.push(report.clone());
    Json(report).into_response()
}

async fn daily_update(State(state): Shared, headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if let Err(response) = state.authorize(&format!("/daily-reports/{}", id), &headers) {
        return response;
    }
    let mut reports = state.daily.lock().unwrap();
    match reports.iter_mut().find(|r| r["id"] == json!(id)) {
        Some(report) => {
            if let Some(content) = body.get("work_content") {
                report["work_content"] = content.clone();
            }
            Json(report.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "日报不存在"),
    }
}

async fn daily_delete(State(state): Shared, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(response) = state.authorize(&format!("/daily-reports/{}", id), &headers) {
        return response;
    }
    state.daily.lock().unwrap().retain(|r| r["id"] != json!(id));
    Json(json!({ "message": "删除成功" })).into_response()
}

async fn daily_parse_preview(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/daily-reports/parse-preview", &headers) {
        return response;
    }
    tokio::time::sleep(Duration::from_millis(SLOW_MS)).await;
    Json(json!({ "items": [{ "project_name": "平台", "content": "接口联调", "hours": "4.5" }] })).into_response()
}

async fn latest_week(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/summary/latest-week", &headers) {
        return response;
    }
    tokio::time::sleep(Duration::from_millis(SLOW_MS)).await;
    Json(json!({ "year": 2025, "week": 9 })).into_response()
}

async fn dashboard(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/summary/dashboard", &headers) {
        return response;
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{ "msg": "field required" }, { "msg": "value is not a valid integer" }] })),
    )
        .into_response()
}

async fn chart_data(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/summary/chart-data", &headers) {
        return response;
    }
    (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
}

async fn download(State(state): Shared, headers: HeaderMap, Path((year, week)): Path<(i32, u32)>) -> Response {
    if let Err(response) = state.authorize(&format!("/summary/download/{}/{}", year, week), &headers) {
        return response;
    }
    (
        [(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        )],
        DOCX_BYTES.to_vec(),
    )
        .into_response()
}

async fn admin_users(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize("/admin/users/", &headers) {
        return response;
    }
    if !state.admin.load(Ordering::SeqCst) {
        return detail(StatusCode::FORBIDDEN, "需要管理员权限");
    }
    Json(json!([{ "id": 7, "username": USERNAME, "role": "admin" }, { "id": 8, "username": "bob", "role": "user" }]))
        .into_response()
}

fn api_routes(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/password", put(change_password))
        .route("/tasks/", get(tasks))
        .route("/tasks/my-tasks", get(my_tasks))
        .route("/tasks/:id", get(task_by_id).delete(delete_task))
        .route("/daily-reports/", get(daily_list).post(daily_create))
        .route("/daily-reports/parse-preview", post(daily_parse_preview))
        .route("/daily-reports/:id", put(daily_update).delete(daily_delete))
        .route("/summary/latest-week", get(latest_week))
        .route("/summary/dashboard", get(dashboard))
        .route("/summary/chart-data", get(chart_data))
        .route("/summary/download/:year/:week", get(download))
        .route("/admin/users/", get(admin_users))
        .with_state(state)
}

/// Fake backend on a free local port, one per test
pub struct MockBackend {
    pub port: u16,
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/health", get(health))
            .nest("/api", api_routes(state.clone()))
            .nest("/weekly/api", api_routes(state.clone()));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let backend = Self { port, base_url, state };
        backend.wait_ready(Duration::from_secs(5)).await?;
        Ok(backend)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("mock backend did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default().with_base_url(self.base_url.clone())
    }
}

/// A client over fresh in-memory storage, recording notifications
pub struct Harness {
    pub client: WorkReportClient,
    pub storage: MemoryStorage,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_storage(config, MemoryStorage::new())
    }

    pub fn with_storage(config: &ClientConfig, storage: MemoryStorage) -> Result<Self> {
        let session = SessionStore::rehydrate(Arc::new(storage.clone()))?;
        let notifier = Arc::new(RecordingNotifier::new());
        let client = WorkReportClient::with_notifier(config, Arc::new(session), notifier.clone())?;
        Ok(Self {
            client,
            storage,
            notifier,
        })
    }

    pub async fn logged_in(config: &ClientConfig) -> Result<Self> {
        let harness = Self::new(config)?;
        harness.client.login(USERNAME, PASSWORD).await?;
        Ok(harness)
    }
}
