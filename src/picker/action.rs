use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::EngineError;
use crate::extensions::Action;

/// Sentinel action name: accepting with it opens a nested picker over the
/// action map's keys instead of running an action directly.
pub const SELECT_ACTION: &str = "@select";

/// Insertion-ordered action map resolved by name at accept time.
#[derive(Default)]
pub struct ActionRegistry {
    actions: IndexMap<String, Rc<dyn Action>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an action under its own name.
    pub fn register(&mut self, action: Rc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    /// Register or replace an action under an explicit name.
    pub fn register_as(&mut self, name: impl Into<String>, action: Rc<dyn Action>) {
        self.actions.insert(name.into(), action);
    }

    /// Resolve a chosen name; unknown names are an expected error.
    pub fn resolve(&self, name: &str) -> Result<Rc<dyn Action>, EngineError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::unknown_action(name))
    }

    /// Action names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.names())
            .finish()
    }
}
