//! Configuration loading, validation, and management for CycleMate.
//!
//! Loads configuration from `~/.cyclemate/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`AppConfig`] is immutable for the life of the process.

use cyclemate_core::generation::GenerationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cyclemate/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Generative-model provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Sampling and safety parameters (fixed per deployment)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// History windowing
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// System prompt persona
    #[serde(default)]
    pub persona: PersonaConfig,
}

fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS. Empty = same-origin only.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Maximum accepted request body, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (only "gemini" is built in)
    #[serde(default = "default_provider_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the provider's base URL (proxies, test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP client timeout. Expiry surfaces as a provider timeout error.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider_name() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_key: None,
            api_url: None,
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of user/assistant exchanges kept verbatim
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,

    /// Summarize turns outside the window into a topic annotation
    #[serde(default = "default_true")]
    pub annotate_older_turns: bool,
}

fn default_max_pairs() -> usize {
    10
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_pairs: default_max_pairs(),
            annotate_older_turns: true,
        }
    }
}

/// Text that shapes the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    #[serde(default = "default_platform_identity")]
    pub platform_identity: String,

    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,

    #[serde(default = "default_guardrails")]
    pub guardrails: Vec<String>,
}

fn default_assistant_name() -> String {
    "Luna".into()
}
fn default_platform_identity() -> String {
    concat!(
        "You are Luna, the friendly menstrual health assistant for CycleMate, ",
        "a period tracking and wellness platform. You speak warmly, clearly, ",
        "and without judgment.",
    )
    .into()
}
fn default_capabilities() -> Vec<String> {
    vec![
        "Explain the menstrual cycle, its phases, and what is typical".into(),
        "Suggest comfort measures for cramps and other period symptoms".into(),
        "Help interpret cycle tracking data and irregularities".into(),
        "Offer lifestyle, nutrition, and self-care tips around the cycle".into(),
        "Answer questions about period products".into(),
    ]
}
fn default_guardrails() -> Vec<String> {
    vec![
        "Never diagnose conditions or prescribe medication".into(),
        "Recommend seeing a healthcare provider for severe, unusual, or persistent symptoms".into(),
        "Stay on topics related to menstrual and reproductive health and wellbeing".into(),
        "Keep answers concise and easy to read".into(),
    ]
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            platform_identity: default_platform_identity(),
            capabilities: default_capabilities(),
            guardrails: default_guardrails(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cyclemate/config.toml).
    ///
    /// Environment variables override the file:
    /// - `CYCLEMATE_API_KEY`, then `GEMINI_API_KEY`, then `GOOGLE_API_KEY`
    /// - `CYCLEMATE_MODEL`
    /// - `CYCLEMATE_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_lookup(path, |key| std::env::var(key).ok())
    }

    /// Load from `path` with overrides from `lookup`. Validates once, after
    /// the overrides are applied.
    fn load_with_lookup(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the file without validating it.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = lookup("CYCLEMATE_API_KEY")
            .or_else(|| lookup("GEMINI_API_KEY"))
            .or_else(|| lookup("GOOGLE_API_KEY"))
        {
            self.provider.api_key = Some(key);
        }

        if let Some(model) = lookup("CYCLEMATE_MODEL") {
            self.provider.model = model;
        }

        if let Some(port) = lookup("CYCLEMATE_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("CYCLEMATE_PORT is not a valid port: {port}"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cyclemate")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&generation.top_p) {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be between 0.0 and 1.0".into(),
            ));
        }

        if generation.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "generation.top_k must be at least 1".into(),
            ));
        }

        if generation.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_output_tokens must be at least 1".into(),
            ));
        }

        if self.conversation.max_pairs == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.max_pairs must be at least 1".into(),
            ));
        }

        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.model must not be empty".into(),
            ));
        }

        if self.persona.platform_identity.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "persona.platform_identity must not be empty".into(),
            ));
        }

        if !generation.safety.relaxes_sexual_content() {
            tracing::warn!(
                "generation.safety.sexually_explicit is not more permissive than the other \
                 categories; reproductive-health answers may be over-blocked"
            );
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
