// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazy action registry and dispatcher.
//!
//! Registration happens once at startup; handler instances are built on
//! first dispatch and cached for the process lifetime. An unknown action
//! name is a logged no-op, never an error: the decision layer may name
//! actions this process does not carry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use ventra_core::traits::action::{ActionContext, HandlerFactory};
use ventra_core::{ActionHandler, VentraError};

/// Per-action outcome of a multi-dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub name: String,
    /// Handler result; `None` for unknown actions.
    pub result: Option<Value>,
    pub error: Option<String>,
}

/// Maps action names to lazily constructed handler singletons.
#[derive(Default)]
pub struct ActionRegistry {
    factories: RwLock<HashMap<String, HandlerFactory>>,
    instances: RwLock<HashMap<String, Arc<dyn ActionHandler>>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`. Re-registering the same name
    /// replaces the factory and drops any cached instance.
    pub fn register(&self, name: impl Into<String>, factory: HandlerFactory) {
        let name = name.into();
        debug!(action = %name, "action registered");
        self.instances.write().expect("registry lock poisoned").remove(&name);
        self.factories
            .write()
            .expect("registry lock poisoned")
            .insert(name, factory);
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Resolve the cached instance for `name`, constructing it on first
    /// use. `None` when the action is not registered.
    fn resolve(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        if let Some(instance) = self
            .instances
            .read()
            .expect("registry lock poisoned")
            .get(name)
        {
            return Some(instance.clone());
        }
        let factory = self
            .factories
            .read()
            .expect("registry lock poisoned")
            .get(name)?
            .clone();
        let instance = factory();
        info!(action = name, "action handler instantiated");
        self.instances
            .write()
            .expect("registry lock poisoned")
            .entry(name.to_string())
            .or_insert(instance.clone());
        Some(instance)
    }

    /// Dispatch one action.
    ///
    /// Returns `Ok(None)` for an unregistered name; handler failures
    /// surface as [`VentraError::ActionFailed`].
    pub async fn dispatch(
        &self,
        name: &str,
        ctx: &ActionContext,
    ) -> Result<Option<Value>, VentraError> {
        let Some(handler) = self.resolve(name) else {
            warn!(action = name, "unknown action, dispatch skipped");
            return Ok(None);
        };
        // No lock is held across the await.
        match handler.handle(ctx).await {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(VentraError::ActionFailed {
                name: name.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Dispatch several actions independently; one failure never blocks
    /// the rest.
    pub async fn dispatch_multiple(
        &self,
        names: &[String],
        ctx: &ActionContext,
    ) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let outcome = match self.dispatch(name, ctx).await {
                Ok(result) => DispatchOutcome {
                    name: name.clone(),
                    result,
                    error: None,
                },
                Err(e) => {
                    warn!(action = %name, error = %e, "action failed, continuing");
                    DispatchOutcome {
                        name: name.clone(),
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
