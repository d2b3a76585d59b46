//! Web search over the DuckDuckGo HTML endpoint

use async_trait::async_trait;
use automind_config::SearchConfig;
use automind_provider::SharedBackend;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::action::{Action, ActionArgs, ActionFault, ActionType, BindError, ParamDoc};

use super::{QUERY_DESCRIPTION, USER_AGENT};

pub const DEFAULT_SEARCH_BASE: &str = "https://html.duckduckgo.com/html/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub api_base: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_SEARCH_BASE.to_string(),
            max_results: 2,
            timeout_secs: 30,
        }
    }
}

impl SearchSettings {
    pub fn from_config(config: &SearchConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_base: config.api_base.clone().unwrap_or(defaults.api_base),
            max_results: (config.max_results as usize).max(1),
            ..defaults
        }
    }
}

/// Searches the web for a topic
pub struct WebSearch {
    query: String,
    settings: SearchSettings,
}

/// One parsed hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[async_trait]
impl Action for WebSearch {
    async fn execute(self: Box<Self>) -> Result<String, ActionFault> {
        debug!("Web search: {}", self.query);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .build()?;
        let response = client
            .get(&self.settings.api_base)
            .query(&[("q", self.query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("search endpoint returned {}", status).into());
        }

        let html = response.text().await?;
        let hits = parse_results(&html, self.settings.max_results)?;
        if hits.is_empty() {
            return Err(format!("no results for: {}", self.query).into());
        }

        Ok(format_hits(&hits))
    }
}

impl ActionType for WebSearch {
    type Settings = SearchSettings;

    const NAME: &'static str = "WebSearch";
    const MODULE: &'static str = module_path!();
    const DOC: &'static str = "This function searches the web for a topic.";
    const PARAMS: &'static [ParamDoc] = &[ParamDoc::new("query", QUERY_DESCRIPTION)];

    fn bind(
        args: &ActionArgs,
        settings: &SearchSettings,
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

fn selector(css: &str) -> Result<Selector, ActionFault> {
    Selector::parse(css).map_err(|e| format!("invalid selector {}: {:?}", css, e).into())
}

/// Extract up to `limit` organic hits from a results page
pub fn parse_results(html: &str, limit: usize) -> Result<Vec<SearchHit>, ActionFault> {
    let document = Html::parse_document(html);
    let result_sel = selector(".result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let whitespace = Regex::new(r"\s+")?;

    let text_of = |el: ElementRef| -> String {
        let raw = el.text().collect::<String>();
        whitespace.replace_all(raw.trim(), " ").into_owned()
    };

    let hits = document
        .select(&result_sel)
        .filter(|block| !block.value().classes().any(|c| c == "result--ad"))
        .filter_map(|block| {
            let link = block.select(&title_sel).next()?;
            let title = text_of(link);
            if title.is_empty() {
                return None;
            }
            let url = resolve_link(link.value().attr("href").unwrap_or_default());
            let snippet = block
                .select(&snippet_sel)
                .next()
                .map(text_of)
                .unwrap_or_default();
            Some(SearchHit {
                title,
                url,
                snippet,
            })
        })
        .take(limit)
        .collect();

    Ok(hits)
}

/// Unwrap DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=...`)
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

fn format_hits(hits: &[SearchHit]) -> String {
    let mut lines = Vec::new();
    for (i, hit) in hits.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, hit.title));
        lines.push(format!("   {}", hit.url));
        if !hit.snippet.is_empty() {
            lines.push(format!("   {}", hit.snippet));
        }
    }
    lines.join("\n")
}
