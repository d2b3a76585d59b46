//! AutoMind agent core
//!
//! Self-describing actions, the prompt/parse/dispatch pipeline and the two
//! loop shapes built on it: single-shot and think/act/observe.

use thiserror::Error;

pub mod action;
pub mod dispatcher;
pub mod loop_agent;
pub mod parser;
pub mod prompt;
pub mod registry;
pub mod scratchpad;
pub mod tools;

pub use action::{
    Action, ActionArgs, ActionFault, ActionSchema, ActionSpec, ActionType, BindError, ParamDoc,
    MODEL_HANDLE_FIELD,
};
pub use dispatcher::ActionDispatcher;
pub use loop_agent::{AgentRunConfig, RunOutcome, SingleAgent, ThinkAgent, ThinkReport};
pub use parser::ParsedIntent;
pub use prompt::PromptBuilder;
pub use registry::{ActionRegistry, RegisteredAction};
pub use scratchpad::{Scratchpad, ScratchpadEntry};

use automind_provider::ProviderError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model output did not parse into an action request
    #[error("◆ MALFORMED INTENT: {reason}\n{raw}")]
    MalformedIntent { reason: String, raw: String },

    /// The requested locator names no registered action
    #[error("◆ UNRESOLVED ACTION: {locator}\n{raw}")]
    UnresolvedAction { locator: String, raw: String },

    /// The resolved action failed while executing
    #[error("◆ TOOL FAILED [{tool}]: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: ActionFault,
    },

    #[error("◆ MODEL ERROR: {0}")]
    Model(#[from] ProviderError),

    #[error("◆ INVALID RUN: {0}")]
    InvalidRun(String),

    #[error("◆ NON-CONFORMING ACTION [{action}]: {reason}")]
    NonConforming { action: String, reason: String },
}

impl AgentError {
    pub(crate) fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        AgentError::MalformedIntent {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Short name of the fault kind
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::MalformedIntent { .. } => "MalformedIntent",
            AgentError::UnresolvedAction { .. } => "UnresolvedAction",
            AgentError::ToolExecution { .. } => "ToolExecutionFault",
            AgentError::Model(_) => "ModelError",
            AgentError::InvalidRun(_) => "InvalidRun",
            AgentError::NonConforming { .. } => "NonConformingAction",
        }
    }

    /// The model text that caused the fault, when there is one
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            AgentError::MalformedIntent { raw, .. } => Some(raw),
            AgentError::UnresolvedAction { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            AgentError::malformed("bad json", "{").kind(),
            "MalformedIntent"
        );
        assert_eq!(
            AgentError::UnresolvedAction {
                locator: "x::Y".to_string(),
                raw: "{}".to_string(),
            }
            .kind(),
            "UnresolvedAction"
        );
        assert_eq!(
            AgentError::ToolExecution {
                tool: "WikiSearch".to_string(),
                source: "boom".into(),
            }
            .kind(),
            "ToolExecutionFault"
        );
    }

    #[test]
    fn test_error_display_carries_raw_text() {
        let err = AgentError::malformed("no fenced json block", "I cannot help");
        let text = err.to_string();
        assert!(text.contains("MALFORMED INTENT"));
        assert!(text.contains("I cannot help"));
        assert_eq!(err.raw_text(), Some("I cannot help"));
    }

    #[test]
    fn test_tool_error_keeps_identity_and_cause() {
        let err = AgentError::ToolExecution {
            tool: "WebSearch".to_string(),
            source: "connection reset".into(),
        };
        assert_eq!(
            err.to_string(),
            "◆ TOOL FAILED [WebSearch]: connection reset"
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.raw_text().is_none());
    }
}
