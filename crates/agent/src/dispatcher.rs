//! Resolve, bind and run the action a model asked for

use automind_provider::SharedBackend;
use std::sync::Arc;
use tracing::{debug, info};

use crate::action::{Action, ActionArgs};
use crate::parser::ParsedIntent;
use crate::registry::{ActionRegistry, RegisteredAction};
use crate::{AgentError, Result};

/// Turns a parsed intent into an observation. Single attempt, no retries.
pub struct ActionDispatcher<'a> {
    registry: &'a ActionRegistry,
    model: SharedBackend,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(registry: &'a ActionRegistry, model: SharedBackend) -> Self {
        Self { registry, model }
    }

    /// Look the intent up by name and module. Both must match.
    pub fn resolve(&self, intent: &ParsedIntent) -> Result<&'a RegisteredAction> {
        self.registry
            .get(&intent.name)
            .filter(|entry| entry.module() == intent.module)
            .ok_or_else(|| AgentError::UnresolvedAction {
                locator: intent.locator(),
                raw: intent.to_block(),
            })
    }

    /// Bind a fresh instance. The model handle goes in as a constructor argument.
    pub fn instantiate(
        &self,
        entry: &RegisteredAction,
        intent: &ParsedIntent,
    ) -> Result<Box<dyn Action>> {
        let args = ActionArgs::new(intent.arguments.clone());
        entry
            .instantiate(&args, Arc::clone(&self.model))
            .map_err(|e| AgentError::malformed(e.to_string(), intent.to_block()))
    }

    /// Run a bound instance, tagging any fault with the tool name
    pub async fn execute(&self, tool: &str, action: Box<dyn Action>) -> Result<String> {
        info!("◆ EXECUTING ACTION: {}", tool);
        let output = action
            .execute()
            .await
            .map_err(|source| AgentError::ToolExecution {
                tool: tool.to_string(),
                source,
            })?;
        debug!("◆ ACTION {} RETURNED {} bytes", tool, output.len());
        Ok(output)
    }

    pub async fn dispatch(&self, intent: &ParsedIntent) -> Result<String> {
        let entry = self.resolve(intent)?;
        let action = self.instantiate(entry, intent)?;
        self.execute(entry.name(), action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionFault, ActionType, BindError, ParamDoc};
    use async_trait::async_trait;
    use automind_provider::{ModelBackend, ProviderError};
    use std::collections::BTreeMap;

    struct NullBackend;

    #[async_trait]
    impl ModelBackend for NullBackend {
        async fn run(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            Ok(String::new())
        }

        fn model_name(&self) -> String {
            "null".to_string()
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    struct Shout {
        query: String,
    }

    #[async_trait]
    impl Action for Shout {
        async fn execute(self: Box<Self>) -> std::result::Result<String, ActionFault> {
            Ok(self.query.to_uppercase())
        }
    }

    impl ActionType for Shout {
        type Settings = ();
        const NAME: &'static str = "Shout";
        const MODULE: &'static str = "demo";
        const PARAMS: &'static [ParamDoc] = &[ParamDoc::new("query", "Text to shout")];

        fn bind(
            args: &ActionArgs,
            _settings: &(),
            _model: SharedBackend,
        ) -> std::result::Result<Self, BindError> {
            Ok(Shout {
                query: args.query()?.to_string(),
            })
        }
    }

    fn intent(name: &str, module: &str) -> ParsedIntent {
        let mut arguments = BTreeMap::new();
        arguments.insert("query".to_string(), "hello".to_string());
        ParsedIntent {
            name: name.to_string(),
            module: module.to_string(),
            arguments,
        }
    }

    fn registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register::<Shout>().unwrap();
        registry
    }

    #[tokio::test]
    async fn test_dispatch_runs_action() {
        let registry = registry();
        let dispatcher = ActionDispatcher::new(&registry, Arc::new(NullBackend));
        let out = dispatcher.dispatch(&intent("Shout", "demo")).await.unwrap();
        assert_eq!(out, "HELLO");
    }

    #[test]
    fn test_resolve_requires_matching_module() {
        let registry = registry();
        let dispatcher = ActionDispatcher::new(&registry, Arc::new(NullBackend));
        match dispatcher.resolve(&intent("Shout", "elsewhere")) {
            Err(AgentError::UnresolvedAction { locator, .. }) => {
                assert_eq!(locator, "elsewhere::Shout")
            }
            other => panic!("Expected UnresolvedAction, got {:?}", other.map(|e| e.name())),
        }
    }

    #[test]
    fn test_bind_failure_is_malformed() {
        let registry = registry();
        let dispatcher = ActionDispatcher::new(&registry, Arc::new(NullBackend));
        let mut bad = intent("Shout", "demo");
        bad.arguments.clear();

        let entry = dispatcher.resolve(&bad).unwrap();
        let err = dispatcher.instantiate(entry, &bad).err().unwrap();
        assert_eq!(err.kind(), "MalformedIntent");
        assert!(err.raw_text().unwrap().contains("\"Shout\""));
    }
}
