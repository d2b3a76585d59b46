//! Shared fixtures for agent integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use automind_agent::{
    Action, ActionArgs, ActionFault, ActionRegistry, ActionType, BindError, ParamDoc,
    MODEL_HANDLE_FIELD,
};
use automind_provider::{ModelBackend, ProviderError, SharedBackend};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Backend that replays canned responses and records every prompt
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn run(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ProviderError::InvalidResponse)
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub const LOOKUP_MODULE: &str = "fixtures::lookup";

/// Encyclopedia stand-in: answers from a fixed table
pub struct EchoLookup {
    query: String,
}

#[async_trait]
impl Action for EchoLookup {
    async fn execute(self: Box<Self>) -> Result<String, ActionFault> {
        Ok(match self.query.as_str() {
            "capital of France" => {
                "Paris\nParis is the capital and largest city of France.".to_string()
            }
            other => format!("Article about {}", other),
        })
    }
}

impl ActionType for EchoLookup {
    type Settings = ();

    const NAME: &'static str = "EchoLookup";
    const MODULE: &'static str = LOOKUP_MODULE;
    const DOC: &'static str = "Looks a topic up in a local table.";
    const PARAMS: &'static [ParamDoc] = &[
        ParamDoc::new("query", "The search string. be simple"),
        ParamDoc::new(MODEL_HANDLE_FIELD, "injected model"),
    ];

    fn bind(args: &ActionArgs, _settings: &(), _model: SharedBackend) -> Result<Self, BindError> {
        Ok(Self {
            query: args.query()?.to_string(),
        })
    }
}

/// Always fails while executing
pub struct BrokenTool;

#[async_trait]
impl Action for BrokenTool {
    async fn execute(self: Box<Self>) -> Result<String, ActionFault> {
        Err("upstream returned 503".into())
    }
}

impl ActionType for BrokenTool {
    type Settings = ();

    const NAME: &'static str = "BrokenTool";
    const MODULE: &'static str = "fixtures::broken";
    const PARAMS: &'static [ParamDoc] = &[ParamDoc::undocumented("query")];

    fn bind(_args: &ActionArgs, _settings: &(), _model: SharedBackend) -> Result<Self, BindError> {
        Ok(BrokenTool)
    }
}

/// Post-processes its query through the model it was bound with
pub struct Rephrase {
    query: String,
    model: SharedBackend,
}

#[async_trait]
impl Action for Rephrase {
    async fn execute(self: Box<Self>) -> Result<String, ActionFault> {
        let text = self.model.run(&format!("Rephrase: {}", self.query)).await?;
        Ok(text)
    }
}

impl ActionType for Rephrase {
    type Settings = ();

    const NAME: &'static str = "Rephrase";
    const MODULE: &'static str = "fixtures::rephrase";
    const PARAMS: &'static [ParamDoc] = &[ParamDoc::new("query", "Text to rephrase")];

    fn bind(args: &ActionArgs, _settings: &(), model: SharedBackend) -> Result<Self, BindError> {
        Ok(Self {
            query: args.query()?.to_string(),
            model,
        })
    }
}

pub fn lookup_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register::<EchoLookup>().unwrap();
    registry
}

/// A fenced intent block for `name` in `module`
pub fn intent_block(name: &str, module: &str, query: &str) -> String {
    format!(
        "```json\n{{\n  \"name\": \"{}\",\n  \"arguments\": {{\n    \"query\": \"{}\",\n    \"type\": \"str\",\n    \"module\": \"{}\"\n  }}\n}}\n```",
        name, query, module
    )
}

/// A well-formed think/act response
pub fn react_response(thought: &str, query: &str, tail: &str) -> String {
    format!(
        "Thought: {}\nAction:\n{}\n{}",
        thought,
        intent_block("EchoLookup", LOOKUP_MODULE, query),
        tail
    )
}
