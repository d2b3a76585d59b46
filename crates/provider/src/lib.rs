//! Model backends for AutoMind
//!
//! A backend turns a plain-text prompt into plain-text completion. The agent
//! loop only ever sees the [`ModelBackend`] trait; vendor adapters live in
//! their own modules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

pub mod gemini;
pub mod openrouter;

pub use gemini::GeminiBackend;
pub use openrouter::OpenRouterBackend;

/// Backend errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("◆ SIGNAL LOST: {0}")]
    Request(#[from] reqwest::Error),

    #[error("◆ DECODE ERROR: {0}")]
    Json(#[from] serde_json::Error),

    #[error("◆ BACKEND REJECTED: {0}")]
    Api(String),

    #[error("◆ ACCESS DENIED: NO API KEY")]
    NoApiKey,

    #[error("◆ CORRUPTED RESPONSE")]
    InvalidResponse,

    #[error("◆ RATE LIMITED")]
    RateLimited,

    #[error("◆ UNKNOWN BACKEND: {0}")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Shared handle to a backend, held by the caller for the whole run
pub type SharedBackend = Arc<dyn ModelBackend>;

/// Plain-text language model
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send one prompt, get the raw completion text back
    async fn run(&self, prompt: &str) -> Result<String>;
    fn model_name(&self) -> String;
    fn is_configured(&self) -> bool;
}

/// Settings every HTTP backend is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
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

impl BackendSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Chat transcript entry for chat-style APIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build a backend by name (`openrouter` or `gemini`)
pub fn build_backend(kind: &str, settings: BackendSettings) -> Result<SharedBackend> {
    trace!("◆ BUILDING BACKEND {}", kind);
    let backend: SharedBackend = match kind {
        "openrouter" | "openai" | "vllm" => Arc::new(OpenRouterBackend::build(settings)?),
        "gemini" => Arc::new(GeminiBackend::build(settings)?),
        other => return Err(ProviderError::UnknownBackend(other.to_string())),
    };
    debug!("◆ BACKEND READY: {} ({})", kind, backend.model_name());
    Ok(backend)
}

/// Pull an upstream error message out of a JSON error body
pub(crate) fn error_message(json: &serde_json::Value) -> String {
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .unwrap_or("UNKNOWN ERROR")
        .to_string()
}
