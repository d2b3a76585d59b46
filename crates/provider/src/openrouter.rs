//! OpenRouter / OpenAI-compatible backend.
//!
//! Also serves self-hosted models behind a vLLM OpenAI-compatible server.

use crate::*;
use reqwest::Client;
use serde_json::json;

const OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Chat-completions backend
pub struct OpenRouterBackend {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    is_openrouter: bool,
}

impl OpenRouterBackend {
    /// Build from settings. Base URL and default model follow the key shape
    /// when not set explicitly.
    pub fn build(settings: BackendSettings) -> Result<Self> {
        let is_openrouter = settings.api_key.starts_with("sk-or-")
            || settings
                .api_base
                .as_ref()
                .map(|b| b.contains("openrouter"))
                .unwrap_or(false);

        let api_base = settings
            .api_base
            .clone()
            .unwrap_or_else(|| {
                if is_openrouter {
                    OPENROUTER_BASE.to_string()
                } else {
                    OPENAI_BASE.to_string()
                }
            })
            .trim_end_matches('/')
            .to_string();

        let model = settings.model.clone().unwrap_or_else(|| {
            if is_openrouter {
                "anthropic/claude-sonnet-4".to_string()
            } else {
                "gpt-4o-mini".to_string()
            }
        });

        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            api_key: settings.api_key,
            api_base,
            model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            is_openrouter,
        })
    }

    pub fn is_openrouter(&self) -> bool {
        self.is_openrouter
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn build_request(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [Message::user(prompt)],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        choice["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(ProviderError::InvalidResponse)
    }
}

#[async_trait]
impl ModelBackend for OpenRouterBackend {
    async fn run(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }
        trace!("◆ UPLINK TO {}", self.api_base);

        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        let json: serde_json::Value = response.json().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(error_message(&json)));
        }

        let text = self.parse_response(json)?;
        debug!("◆ COMPLETION: {} CHARS", text.len());
        Ok(text)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
