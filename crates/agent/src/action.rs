//! Self-describing actions.
//!
//! An action type declares its name, module locator, documentation and
//! parameters as associated constants. [`ActionSpec::describe`] turns those
//! declarations into the schema shown to the model; [`ActionType::bind`]
//! builds a single-use instance from the model's arguments at dispatch time.

use async_trait::async_trait;
use automind_provider::SharedBackend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::{AgentError, Result};

/// Parameter name reserved for the injected model handle. Never part of a schema.
pub const MODEL_HANDLE_FIELD: &str = "llm";

/// Failure raised by an action while executing
pub type ActionFault = Box<dyn std::error::Error + Send + Sync>;

/// A declared parameter and its human-readable description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDoc {
    pub name: &'static str,
    pub description: Option<&'static str>,
}

impl ParamDoc {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description: Some(description),
        }
    }

    pub const fn undocumented(name: &'static str) -> Self {
        Self {
            name,
            description: None,
        }
    }
}

/// A bound, ready-to-run action instance
#[async_trait]
pub trait Action: Send {
    /// Run the action. Consumes the instance, so it runs at most once.
    async fn execute(self: Box<Self>) -> std::result::Result<String, ActionFault>;
}

/// Type-level description of an action, plus its constructor
pub trait ActionType: Action + Sized + 'static {
    /// Per-registration settings (endpoints, limits)
    type Settings: Clone + Default + Send + Sync + 'static;

    const NAME: &'static str;
    /// Locator the model echoes back in `arguments.module`
    const MODULE: &'static str;
    const DOC: &'static str = "";
    const RETURNS: &'static str = "str";
    const PARAMS: &'static [ParamDoc];

    /// Build an instance from the model's arguments. The model handle is
    /// passed here so actions that post-process through the model can keep it.
    fn bind(
        args: &ActionArgs,
        settings: &Self::Settings,
        model: SharedBackend,
    ) -> std::result::Result<Self, BindError>;
}

/// Argument binding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("missing argument `{0}`")]
    Missing(String),

    #[error("invalid argument `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

/// String arguments taken from a parsed intent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionArgs {
    values: BTreeMap<String, String>,
}

impl ActionArgs {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> std::result::Result<&str, BindError> {
        self.get(name)
            .ok_or_else(|| BindError::Missing(name.to_string()))
    }

    pub fn query(&self) -> std::result::Result<&str, BindError> {
        self.require("query")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActionArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Machine-readable description of an action type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: String,
    pub module: String,
    pub description: String,
    pub parameters: BTreeMap<String, String>,
    pub returns: String,
}

/// Introspection JSON: `{"cls": {"kls", "doc"}, "params": {..}, "returns"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSchema {
    pub cls: ClassInfo,
    pub params: BTreeMap<String, String>,
    pub returns: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub kls: String,
    pub doc: String,
}

impl ActionSpec {
    /// Derive the spec of `T`. Missing parameter descriptions become empty
    /// strings; only a type with no name or no parameters at all is rejected.
    pub fn describe<T: ActionType>() -> Result<Self> {
        if T::NAME.trim().is_empty() {
            return Err(AgentError::NonConforming {
                action: std::any::type_name::<T>().to_string(),
                reason: "empty action name".to_string(),
            });
        }

        let parameters: BTreeMap<String, String> = T::PARAMS
            .iter()
            .filter(|p| p.name != MODEL_HANDLE_FIELD)
            .map(|p| {
                (
                    p.name.to_string(),
                    p.description.unwrap_or_default().to_string(),
                )
            })
            .collect();

        if parameters.is_empty() {
            return Err(AgentError::NonConforming {
                action: T::NAME.to_string(),
                reason: "no parameter metadata declared".to_string(),
            });
        }

        Ok(Self {
            name: T::NAME.to_string(),
            module: T::MODULE.to_string(),
            description: dedent(T::DOC),
            parameters,
            returns: T::RETURNS.to_string(),
        })
    }

    /// `module::Name`
    pub fn locator(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    pub fn schema(&self) -> ActionSchema {
        ActionSchema {
            cls: ClassInfo {
                kls: self.name.clone(),
                doc: self.description.clone(),
            },
            params: self.parameters.clone(),
            returns: self.returns.clone(),
        }
    }

    /// Pretty-printed introspection JSON
    pub fn schema_json(&self) -> String {
        serde_json::to_string_pretty(&self.schema()).unwrap_or_default()
    }
}

fn dedent(doc: &str) -> String {
    doc.trim()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}
