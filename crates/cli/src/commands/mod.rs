pub mod ask;
pub mod init;
pub mod preview;
pub mod serve;

use std::path::{Path, PathBuf};

use cyclemate_config::AppConfig;
use cyclemate_core::message::Turn;
use cyclemate_core::request::ChatRequest;

/// Load config from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}

/// Where the config file lives.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Read a JSON array of turns.
pub fn read_history(path: &Path) -> Result<Vec<Turn>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read history {}: {e}", path.display()))?;
    let turns: Vec<Turn> = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid history file {}: {e}", path.display()))?;
    Ok(turns)
}

/// Build a request from command-line pieces.
pub fn build_request(
    message: String,
    name: Option<String>,
    history: Option<&Path>,
) -> Result<ChatRequest, Box<dyn std::error::Error>> {
    let history = match history {
        Some(path) => read_history(path)?,
        None => Vec::new(),
    };
    Ok(ChatRequest {
        message: Some(message),
        history,
        requester_name: name,
    })
}
