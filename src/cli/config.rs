use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    #[serde(default = "root_path")]
    pub base_path: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServerStatus::Up => "UP",
            ServerStatus::Down => "DOWN",
            ServerStatus::Unknown => "UNKNOWN",
        };
        f.pad(s)
    }
}

fn root_path() -> String {
    "/".to_string()
}

impl ServerInfo {
    pub fn new(url: String, base_path: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            base_path,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("WR_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("workreport").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_server_info() -> anyhow::Result<Option<ServerInfo>> {
    let server_file = get_config_dir()?.join("server.json");

    if !server_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(server_file)?;
    let info: ServerInfo = serde_json::from_str(&content)?;
    Ok(Some(info))
}

pub fn save_server_info(info: &ServerInfo) -> anyhow::Result<()> {
    let server_file = get_config_dir()?.join("server.json");

    let content = serde_json::to_string_pretty(info)?;
    fs::write(server_file, content)?;
    Ok(())
}

/// Registered server first, then `WR_*` environment overrides
pub fn client_config() -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::default();
    if let Some(info) = load_server_info()? {
        config = config.with_base_url(info.url).with_base_path(info.base_path);
    }
    Ok(config.with_env_overrides())
}

/// Hits the backend's `/health` endpoint, outside the API prefix
pub async fn ping_server(base_url: &str) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = format!("{}/health", base_url.trim_end_matches('/'));

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}
