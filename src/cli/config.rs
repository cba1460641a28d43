use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::SessionCookie;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// Signed-in state persisted between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSession {
    pub server: String,
    pub cookie: SessionCookie,
    #[serde(default)]
    pub admin: Option<Value>,
    pub logged_in_at: DateTime<Utc>,
}

impl CliSession {
    pub fn new(server: String, cookie: SessionCookie, admin: Option<Value>) -> Self {
        Self {
            server,
            cookie,
            admin,
            logged_in_at: Utc::now(),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("COACH_ADMIN_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("coach-admin").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn modal_storage_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("modal.json"))
}

pub fn load_session() -> anyhow::Result<Option<CliSession>> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    let session: CliSession = serde_json::from_str(&content)?;
    Ok(Some(session))
}

pub fn save_session(session: &CliSession) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<bool> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(false);
    }

    fs::remove_file(session_file)?;
    Ok(true)
}

/// `--server` wins, then the saved session's server, then the local default.
pub fn resolve_server(flag: Option<&str>, session: Option<&CliSession>) -> String {
    flag.map(str::to_string)
        .or_else(|| session.map(|s| s.server.clone()))
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
        .trim_end_matches('/')
        .to_string()
}
