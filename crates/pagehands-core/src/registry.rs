//! Handler registration.
//!
//! Handlers are registered while a context starts up and then frozen into a
//! [`HandlerTable`] that never changes for the lifetime of the context.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use pagehands_protocols::RouterError;

use crate::handler::ActionHandler;

/// Mutable registry used during start-up.
pub struct HandlerRegistry {
    exact: DashMap<String, Arc<dyn ActionHandler>>,
    prefixes: DashMap<String, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            exact: DashMap::new(),
            prefixes: DashMap::new(),
        }
    }

    /// Register a handler for one action name.
    ///
    /// Returns an error if the action is already registered.
    pub fn register(
        &self,
        action: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), RouterError> {
        let action = action.into();
        if self.exact.contains_key(&action) {
            return Err(RouterError::AlreadyRegistered(action));
        }
        self.exact.insert(action, handler);
        Ok(())
    }

    /// Register a handler for every action starting with `prefix`.
    pub fn register_prefix(
        &self,
        prefix: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), RouterError> {
        let prefix = prefix.into();
        if self.prefixes.contains_key(&prefix) {
            return Err(RouterError::AlreadyRegistered(format!("{}*", prefix)));
        }
        self.prefixes.insert(prefix, handler);
        Ok(())
    }

    /// Check if an exact action is registered.
    pub fn contains(&self, action: &str) -> bool {
        self.exact.contains_key(action)
    }

    /// List registered action names, sorted.
    pub fn list_actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self.exact.iter().map(|e| e.key().clone()).collect();
        actions.sort();
        actions
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }

    /// Freeze into an immutable dispatch table.
    pub fn freeze(self) -> HandlerTable {
        let exact: HashMap<_, _> = self.exact.into_iter().collect();
        let mut prefixes: Vec<_> = self.prefixes.into_iter().collect();
        // Longest prefix first.
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        HandlerTable { exact, prefixes }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable dispatch table owned by a router.
#[derive(Default)]
pub struct HandlerTable {
    exact: HashMap<String, Arc<dyn ActionHandler>>,
    prefixes: Vec<(String, Arc<dyn ActionHandler>)>,
}

impl HandlerTable {
    /// Find the handler for `action`: exact match first, then longest prefix.
    pub fn resolve(&self, action: &str) -> Option<&Arc<dyn ActionHandler>> {
        self.exact.get(action).or_else(|| {
            self.prefixes
                .iter()
                .find(|(prefix, _)| action.starts_with(prefix.as_str()))
                .map(|(_, handler)| handler)
        })
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }
}
