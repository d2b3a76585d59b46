//! Model output scanner
//!
//! Marker matching is literal and case-sensitive. Each extractor is
//! independently optional; the loop decides which absences are fatal.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{AgentError, Result};

pub const THOUGHT_MARKER: &str = "Thought:";
pub const ACTION_MARKER: &str = "Action:";
pub const OBSERVATION_MARKER: &str = "Observation:";
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// The tool call a model asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIntent {
    pub name: String,
    pub module: String,
    /// Every argument except `module`, stringified
    pub arguments: BTreeMap<String, String>,
}

impl ParsedIntent {
    pub fn query(&self) -> &str {
        self.arguments
            .get("query")
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// `module::name`
    pub fn locator(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    pub fn to_json(&self) -> Value {
        let mut arguments: Map<String, Value> = self
            .arguments
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        arguments.insert("module".to_string(), Value::String(self.module.clone()));

        let mut root = Map::new();
        root.insert("name".to_string(), Value::String(self.name.clone()));
        root.insert("arguments".to_string(), Value::Object(arguments));
        Value::Object(root)
    }

    /// Render back into the fenced wire format
    pub fn to_block(&self) -> String {
        let body = serde_json::to_string_pretty(&self.to_json()).unwrap_or_default();
        format!("{FENCE_OPEN}\n{body}\n{FENCE_CLOSE}")
    }
}

/// Text between the first `Thought:` and the following `Action:`, trimmed.
/// Absent when no `Action:` follows.
pub fn extract_thought(text: &str) -> Option<String> {
    let start = text.find(THOUGHT_MARKER)? + THOUGHT_MARKER.len();
    let rest = &text[start..];
    let end = rest.find(ACTION_MARKER)?;
    let thought = rest[..end].trim();
    (!thought.is_empty()).then(|| thought.to_string())
}

/// The fenced json block that directly follows an `Action:` marker,
/// fences included.
pub fn extract_action(text: &str) -> Option<String> {
    let mut cursor = 0;
    while let Some(pos) = text[cursor..].find(ACTION_MARKER) {
        let after = cursor + pos + ACTION_MARKER.len();
        let rest = text[after..].trim_start();
        if let Some(body) = rest.strip_prefix(FENCE_OPEN) {
            // an unclosed fence must not swallow the next block's opening fence
            let close = match body.find(FENCE_CLOSE) {
                Some(close) if !body[close..].starts_with(FENCE_OPEN) => close,
                _ => {
                    cursor = after;
                    continue;
                }
            };
            let block_len = FENCE_OPEN.len() + close + FENCE_CLOSE.len();
            return Some(rest[..block_len].to_string());
        }
        cursor = after;
    }
    None
}

/// Everything after the first `Final Answer:` marker, unmodified
pub fn extract_final_answer(text: &str) -> Option<String> {
    let start = text.find(FINAL_ANSWER_MARKER)? + FINAL_ANSWER_MARKER.len();
    Some(text[start..].to_string())
}

/// Inner text of the first ```json fenced block anywhere in `text`
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(rest[..end].trim())
}

/// Parse an action request. Accepts a fenced block or bare JSON.
pub fn extract_intent(text: &str) -> Result<ParsedIntent> {
    let body = extract_json_block(text).unwrap_or_else(|| text.trim());

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AgentError::malformed(format!("invalid JSON: {}", e), text))?;

    let name = value
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AgentError::malformed("missing `name`", text))?;

    let arguments = value
        .get("arguments")
        .and_then(Value::as_object)
        .ok_or_else(|| AgentError::malformed("missing `arguments` object", text))?;

    let module = arguments
        .get("module")
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::malformed("missing `arguments.module`", text))?;

    match arguments.get("query") {
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) | None => {
            return Err(AgentError::malformed("missing `arguments.query`", text));
        }
        Some(_) => {}
    }

    let arguments = arguments
        .iter()
        .filter(|(key, _)| key.as_str() != "module")
        .map(|(key, value)| (key.clone(), stringify(value)))
        .collect();

    Ok(ParsedIntent {
        name: name.trim().to_string(),
        module: module.to_string(),
        arguments,
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
