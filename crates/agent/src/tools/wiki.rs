//! Encyclopedia lookup over the MediaWiki API

use async_trait::async_trait;
use automind_config::WikiConfig;
use automind_provider::SharedBackend;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::action::{Action, ActionArgs, ActionFault, ActionType, BindError, ParamDoc};

use super::{QUERY_DESCRIPTION, USER_AGENT};

pub const DEFAULT_WIKI_BASE: &str = "https://en.wikipedia.org/w/api.php";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiSettings {
    pub api_base: String,
    pub max_chars: usize,
    pub timeout_secs: u64,
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_WIKI_BASE.to_string(),
            max_chars: 20_000,
            timeout_secs: 30,
        }
    }
}

impl WikiSettings {
    pub fn from_config(config: &WikiConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_base: config.api_base.clone().unwrap_or(defaults.api_base),
            max_chars: config.max_chars.max(1),
            ..defaults
        }
    }
}

/// Looks up the best matching article and returns its plain text
pub struct WikiSearch {
    query: String,
    settings: WikiSettings,
}

impl WikiSearch {
    async fn get_json(
        &self,
        client: &reqwest::Client,
        params: &[(&str, &str)],
    ) -> Result<Value, ActionFault> {
        let response = client
            .get(&self.settings.api_base)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("wiki endpoint returned {}", status).into());
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Action for WikiSearch {
    async fn execute(self: Box<Self>) -> Result<String, ActionFault> {
        debug!("Wiki search: {}", self.query);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .build()?;

        let search = self
            .get_json(
                &client,
                &[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", self.query.as_str()),
                    ("srlimit", "1"),
                    ("format", "json"),
                ],
            )
            .await?;

        let title = search["query"]["search"]
            .as_array()
            .and_then(|hits| hits.first())
            .and_then(|hit| hit["title"].as_str())
            .map(str::to_string)
            .ok_or_else(|| format!("no results found for: {}", self.query))?;
        debug!("Wiki best match: {}", title);

        let page = self
            .get_json(
                &client,
                &[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("titles", title.as_str()),
                    ("format", "json"),
                ],
            )
            .await?;

        let content = page["query"]["pages"]
            .as_object()
            .and_then(|pages| pages.values().next())
            .and_then(|p| p["extract"].as_str())
            .ok_or_else(|| format!("no article text for: {}", title))?;

        Ok(truncate_chars(
            &format!("{}\n{}", title, content),
            self.settings.max_chars,
        ))
    }
}

impl ActionType for WikiSearch {
    type Settings = WikiSettings;

    const NAME: &'static str = "WikiSearch";
    const MODULE: &'static str = module_path!();
    const DOC: &'static str = "This function searches wikipedia for a topic.";
    const PARAMS: &'static [ParamDoc] = &[ParamDoc::new("query", QUERY_DESCRIPTION)];

    fn bind(
        args: &ActionArgs,
        settings: &WikiSettings,
        _model: SharedBackend,
    ) -> Result<Self, BindError> {
        let query = args.query()?.trim();
        if query.is_empty() {
            return Err(BindError::Invalid {
                name: "query".to_string(),
                reason: "empty search string".to_string(),
            });
        }
        Ok(Self {
            query: query.to_string(),
            settings: settings.clone(),
        })
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
