use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";
const SESSION_FILE: &str = "session.json";

/// Persisted CLI session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
}

impl Session {
    pub fn for_server(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            token: None,
            username: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::for_server(DEFAULT_SERVER_URL)
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("MEASURE_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("measure")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Session> {
    load_session_from(&get_config_dir()?)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    save_session_to(&get_config_dir()?, session)
}

pub fn load_session_from(dir: &Path) -> anyhow::Result<Session> {
    let session_file = dir.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(Session::default());
    }

    let content = fs::read_to_string(session_file)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session_to(dir: &Path, session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}
