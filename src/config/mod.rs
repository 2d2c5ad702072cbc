pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;

use self::validation::validate_config;

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How thinking-phase `<details>` markup is rendered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThinkTagsMode {
    /// Rewrite `<details>`/`</details>` into inline `<span>` markers.
    #[default]
    Think,
    /// Drop the tags, keep the content between them.
    Strip,
    /// Pass the markup through unchanged.
    Raw,
}

impl fmt::Display for ThinkTagsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThinkTagsMode::Think => write!(f, "think"),
            ThinkTagsMode::Strip => write!(f, "strip"),
            ThinkTagsMode::Raw => write!(f, "raw"),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Upstream chat service configuration.
///
/// Defaults target the public Z.ai web frontend; the browser fingerprint
/// fields must match what that frontend sends or the upstream rejects the
/// call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    #[serde(default = "default_origin_base")]
    pub origin_base: String,
    /// Actual model id sent upstream.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Display name echoed in `/v1/models`.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Fallback bearer token when anonymous acquisition is disabled or fails.
    #[serde(default)]
    pub token: String,
    /// Acquire a fresh anonymous token per conversation.
    #[serde(default = "default_true")]
    pub anon_token_enabled: bool,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_token_timeout_secs")]
    pub token_timeout_secs: u64,
    #[serde(default = "default_browser_ua")]
    pub browser_ua: String,
    #[serde(default = "default_x_fe_version")]
    pub x_fe_version: String,
    #[serde(default = "default_sec_ch_ua")]
    pub sec_ch_ua: String,
    #[serde(default = "default_sec_ch_ua_mobile")]
    pub sec_ch_ua_mobile: String,
    #[serde(default = "default_sec_ch_ua_platform")]
    pub sec_ch_ua_platform: String,
}

fn default_chat_url() -> String {
    "https://chat.z.ai/api/chat/completions".to_string()
}
fn default_origin_base() -> String {
    "https://chat.z.ai".to_string()
}
fn default_model_id() -> String {
    "0727-360B-API".to_string()
}
fn default_model_name() -> String {
    "GLM-4.5".to_string()
}
fn default_true() -> bool {
    true
}
fn default_call_timeout_secs() -> u64 {
    60
}
fn default_token_timeout_secs() -> u64 {
    10
}
fn default_browser_ua() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36"
        .to_string()
}
fn default_x_fe_version() -> String {
    "prod-fe-1.0.70".to_string()
}
fn default_sec_ch_ua() -> String {
    "\"Not;A=Brand\";v=\"99\", \"Google Chrome\";v=\"139\", \"Chromium\";v=\"139\"".to_string()
}
fn default_sec_ch_ua_mobile() -> String {
    "?0".to_string()
}
fn default_sec_ch_ua_platform() -> String {
    "\"Windows\"".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            chat_url: default_chat_url(),
            origin_base: default_origin_base(),
            model_id: default_model_id(),
            model_name: default_model_name(),
            token: String::new(),
            anon_token_enabled: true,
            call_timeout_secs: default_call_timeout_secs(),
            token_timeout_secs: default_token_timeout_secs(),
            browser_ua: default_browser_ua(),
            x_fe_version: default_x_fe_version(),
            sec_ch_ua: default_sec_ch_ua(),
            sec_ch_ua_mobile: default_sec_ch_ua_mobile(),
            sec_ch_ua_platform: default_sec_ch_ua_platform(),
        }
    }
}

/// Client authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAuthConfig {
    pub allowed_keys: Vec<String>,
}

/// Feature flags and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub think_tags_mode: ThinkTagsMode,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            think_tags_mode: ThinkTagsMode::default(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    pub client_authentication: ClientAuthConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Load configuration from a YAML file and validate it.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when reading the file fails, [`ConfigError::Yaml`]
/// when parsing fails, or [`ConfigError::Validation`] when semantic validation fails.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}
