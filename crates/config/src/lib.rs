//! Configuration management for AutoMind
//!
//! Loads and saves the backend, agent and toolkit parameters from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir};

/// Shared fallback variable for the backend key
pub const API_KEY_ENV: &str = "AUTOMIND_API_KEY";

/// Errors in the configuration layer
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("◆ CONFIG IO ERROR: {0}")]
    Io(#[from] std::io::Error),

    #[error("◆ CONFIG PARSE ERROR: {0}")]
    Json(#[from] serde_json::Error),

    #[error("◆ CONFIG NOT FOUND: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which model backend adapter to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    OpenRouter,
    Gemini,
}

impl BackendKind {
    /// Provider-specific environment variable holding the API key
    pub fn key_env(&self) -> &'static str {
        match self {
            BackendKind::OpenRouter => "OPENROUTER_API_KEY",
            BackendKind::Gemini => "GOOGLE_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenRouter => "openrouter",
            BackendKind::Gemini => "gemini",
        }
    }
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub provider: BackendKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendKind::default(),
            api_key: String::new(),
            api_base: None,
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    60
}

/// Agent loop defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_backstory")]
    pub backstory: String,
    #[serde(default = "default_num_iterations")]
    pub num_iterations: u32,
    #[serde(default)]
    pub summarize: bool,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            backstory: default_backstory(),
            num_iterations: default_num_iterations(),
            summarize: false,
        }
    }
}

fn default_backstory() -> String {
    "You are an expert researcher who is able to extract the relevant information".to_string()
}

fn default_num_iterations() -> u32 {
    2
}

/// Web search action configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    2
}

/// Encyclopedia lookup action configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    20_000
}

/// Built-in action configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolkitConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("◆ NO CONFIG AT {:?}, USING DEFAULTS", path);
            return Ok(Config::default());
        }

        debug!("◆ LOADING CONFIG FROM {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from a location that must exist
    pub async fn load_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load_from(path).await
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("◆ WRITING CONFIG TO {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Backend API key: config value, then AUTOMIND_API_KEY, then the
    /// provider-specific variable
    pub fn api_key(&self) -> Option<String> {
        if !self.backend.api_key.is_empty() {
            return Some(self.backend.api_key.clone());
        }

        [API_KEY_ENV, self.backend.provider.key_env()]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn backstory(&self) -> &str {
        &self.agent.backstory
    }

    /// Configured iteration bound. Run validation rejects zero.
    pub fn num_iterations(&self) -> u32 {
        self.agent.num_iterations
    }
}

/// Write the default config file unless one already exists
pub async fn init() -> Result<Config> {
    init_at(&config_path()).await
}

/// Write the default config file at `path` unless one already exists
pub async fn init_at(path: &Path) -> Result<Config> {
    if path.exists() {
        warn!("◆ CONFIG ALREADY PRESENT AT {:?}", path);
    } else {
        Config::default().save_to(path).await?;
        info!("◆ CONFIG WRITTEN TO {:?}", path);
    }

    Config::load_from(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/nope/config.json"));
        assert_eq!(err.to_string(), "◆ CONFIG NOT FOUND: /nope/config.json");
    }

    #[test]
    fn test_backend_kind_serde() {
        let kind: BackendKind = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(kind, BackendKind::Gemini);
        assert_eq!(
            serde_json::to_string(&BackendKind::OpenRouter).unwrap(),
            "\"openrouter\""
        );
    }

    #[test]
    fn test_backend_kind_key_env() {
        assert_eq!(BackendKind::OpenRouter.key_env(), "OPENROUTER_API_KEY");
        assert_eq!(BackendKind::Gemini.key_env(), "GOOGLE_API_KEY");
    }

    #[test]
    fn test_num_iterations_passes_zero_through() {
        let mut config = Config::default();
        config.agent.num_iterations = 0;
        assert_eq!(config.num_iterations(), 0);
    }

    #[test]
    fn test_configured_key_wins() {
        let mut config = Config::default();
        config.backend.api_key = "sk-or-configured".to_string();
        assert_eq!(config.api_key(), Some("sk-or-configured".to_string()));
        assert!(config.has_api_key());
    }
}
