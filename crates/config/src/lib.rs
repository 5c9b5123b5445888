//! Configuration loading, validation, and management for rentier.
//!
//! Loads configuration from `~/.rentier/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.rentier/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Completion temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound for each unary remote call, and the per-chunk idle bound
    /// while streaming.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Vector retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Static knowledge settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_request_timeout_secs() -> u64 {
    30
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retrieval", &self.retrieval)
            .field("gateway", &self.gateway)
            .field("knowledge", &self.knowledge)
            .finish()
    }
}

/// Vector retrieval settings: which store, and its similarity parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum similarity for a property to count as relevant.
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Maximum number of properties returned per query.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Which store backend: "rpc" (hosted Postgres RPC) or "memory".
    #[serde(default = "default_store")]
    pub store: String,

    /// Base URL of the hosted Postgres service (for the "rpc" store).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    /// Service key for the hosted Postgres service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_key: Option<String>,

    /// Name of the similarity-search RPC function.
    #[serde(default = "default_rpc_function")]
    pub rpc_function: String,
}

fn default_threshold() -> f32 {
    0.7
}
fn default_limit() -> usize {
    5
}
fn default_store() -> String {
    "rpc".into()
}
fn default_rpc_function() -> String {
    "match_properties".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            limit: default_limit(),
            store: default_store(),
            supabase_url: None,
            supabase_key: None,
            rpc_function: default_rpc_function(),
        }
    }
}

impl std::fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("threshold", &self.threshold)
            .field("limit", &self.limit)
            .field("store", &self.store)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("rpc_function", &self.rpc_function)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allow any origin. The dashboard frontend is served from a different
    /// origin in development, so this defaults to true.
    #[serde(default = "default_true")]
    pub cors_allow_any: bool,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_true() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_allow_any: true,
        }
    }
}

/// Static knowledge settings. The builtin FAQ and market sets are always
/// loaded; a TOML file can add deployment-specific entries at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Optional TOML file with extra `faq` and `market` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.rentier/config.toml).
    ///
    /// Also checks environment variables:
    /// - `RENTIER_API_KEY` / `OPENAI_API_KEY` for the API key
    /// - `RENTIER_MODEL` for the chat model
    /// - `RENTIER_SUPABASE_URL` / `SUPABASE_URL` for the store URL
    /// - `RENTIER_SUPABASE_KEY` / `SUPABASE_SERVICE_ROLE_KEY` for the store key
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("RENTIER_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("RENTIER_MODEL") {
            config.chat_model = model;
        }

        if config.retrieval.supabase_url.is_none() {
            config.retrieval.supabase_url = std::env::var("RENTIER_SUPABASE_URL")
                .ok()
                .or_else(|| std::env::var("SUPABASE_URL").ok());
        }

        if config.retrieval.supabase_key.is_none() {
            config.retrieval.supabase_key = std::env::var("RENTIER_SUPABASE_KEY")
                .ok()
                .or_else(|| std::env::var("SUPABASE_SERVICE_ROLE_KEY").ok());
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
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

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rentier")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.threshold < 0.0 || self.retrieval.threshold > 1.0 {
            return Err(ConfigError::ValidationError(
                "retrieval.threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.retrieval.limit == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.limit must be at least 1".into(),
            ));
        }

        if self.retrieval.store != "rpc" && self.retrieval.store != "memory" {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.store must be \"rpc\" or \"memory\", got \"{}\"",
                self.retrieval.store
            )));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.port must be non-zero".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            retrieval: RetrievalConfig::default(),
            gateway: GatewayConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
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
