//! ACTION REGISTRY

use automind_provider::SharedBackend;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::action::{Action, ActionArgs, ActionSpec, ActionType, BindError};
use crate::Result;

type Constructor = Arc<
    dyn Fn(&ActionArgs, SharedBackend) -> std::result::Result<Box<dyn Action>, BindError>
        + Send
        + Sync,
>;

/// A registered action type: its spec plus a constructor closed over its settings
#[derive(Clone)]
pub struct RegisteredAction {
    spec: ActionSpec,
    construct: Constructor,
}

impl RegisteredAction {
    fn of<T: ActionType>(settings: T::Settings) -> Result<Self> {
        let spec = ActionSpec::describe::<T>()?;
        let construct: Constructor = Arc::new(move |args: &ActionArgs, model: SharedBackend| {
            T::bind(args, &settings, model).map(|action| Box::new(action) as Box<dyn Action>)
        });
        Ok(Self { spec, construct })
    }

    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn module(&self) -> &str {
        &self.spec.module
    }

    /// Bind a fresh single-use instance
    pub fn instantiate(
        &self,
        args: &ActionArgs,
        model: SharedBackend,
    ) -> std::result::Result<Box<dyn Action>, BindError> {
        (self.construct)(args, model)
    }
}

impl fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Ordered set of action types the agent may invoke
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<RegisteredAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` with default settings
    pub fn register<T: ActionType>(&mut self) -> Result<()> {
        self.register_with::<T>(T::Settings::default())
    }

    /// Register `T`. A second registration under the same name replaces
    /// the first in place.
    pub fn register_with<T: ActionType>(&mut self, settings: T::Settings) -> Result<()> {
        let entry = RegisteredAction::of::<T>(settings)?;
        debug!("◆ REGISTERED ACTION: {}", entry.spec.locator());

        match self.actions.iter_mut().find(|a| a.name() == entry.name()) {
            Some(slot) => *slot = entry,
            None => self.actions.push(entry),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredAction> {
        self.actions.iter().find(|a| a.name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// `module::Name` of a registered action
    pub fn locator(&self, name: &str) -> Option<String> {
        self.get(name).map(|a| a.spec().locator())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredAction> {
        self.actions.iter()
    }

    pub fn first(&self) -> Option<&RegisteredAction> {
        self.actions.first()
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn specs(&self) -> Vec<&ActionSpec> {
        self.actions.iter().map(|a| a.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
