//! Google Gemini backend (Generative Language REST API)

use crate::*;
use reqwest::Client;
use serde_json::json;

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiBackend {
    pub fn build(settings: BackendSettings) -> Result<Self> {
        let api_base = settings
            .api_base
            .clone()
            .unwrap_or_else(|| GEMINI_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            api_key: settings.api_key,
            api_base,
            model: settings.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn build_request(&self, prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
            }
        })
    }

    /// Join the text parts of the first candidate
    fn parse_response(&self, json: serde_json::Value) -> Result<String> {
        let parts = json["candidates"]
            .get(0)
            .and_then(|c| c["content"]["parts"].as_array())
            .ok_or(ProviderError::InvalidResponse)?;

        let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if text.is_empty() {
            return Err(ProviderError::InvalidResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn run(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        trace!("◆ UPLINK TO {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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
