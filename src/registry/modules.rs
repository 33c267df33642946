//! # Module Registry
//!
//! Modules are application-lifetime singletons contributing handlers for
//! every page. They are registered once (override requires an explicit
//! flag), initialized once during bootstrap, and never torn down.

use std::sync::{Arc, Mutex};

use crate::action::resolver::ActionResolver;
use crate::action::{Action, HandlerBag};
use crate::app::App;

/// An application-lifetime singleton handler set.
///
/// Both capabilities default, so a module implements only what it needs;
/// storing the module behind `Arc<dyn Module>` is the freeze.
pub trait Module: Send + Sync {
    /// Handlers this module contributes, resolved for every notification.
    fn actions(&self) -> HandlerBag {
        HandlerBag::empty()
    }

    /// Called once during application bootstrap.
    fn init(&self, app: &App) {
        let _ = app;
    }
}

/// Registry of singleton modules, kept in registration order.
pub struct ModuleRegistry {
    modules: Mutex<Vec<(String, Arc<dyn Module>)>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Mutex::new(Vec::new()),
        }
    }

    /// Register a module under a unique key. A duplicate key without
    /// `override_existing` leaves the original untouched and returns
    /// `false`.
    pub fn register(
        &self,
        key: impl Into<String>,
        module: Arc<dyn Module>,
        override_existing: bool,
    ) -> bool {
        let key = key.into();
        let mut modules = self.lock();
        if let Some(position) = modules.iter().position(|(k, _)| *k == key) {
            if !override_existing {
                tracing::error!(module = %key, "module already registered");
                return false;
            }
            modules[position].1 = module;
            return true;
        }
        modules.push((key, module));
        true
    }

    /// Look up a registered module.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Module>> {
        self.lock()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m.clone())
    }

    /// Resolve a notification key against every module's bag, in
    /// registration order.
    pub fn resolve_actions(&self, resolver: &ActionResolver, key: &str) -> Vec<Action> {
        self.snapshot()
            .iter()
            .filter_map(|(_, module)| resolver.resolve(&module.actions(), key))
            .map(Action::Handler)
            .collect()
    }

    /// Snapshot of registered modules for bootstrap iteration.
    pub(crate) fn snapshot(&self) -> Vec<(String, Arc<dyn Module>)> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, Arc<dyn Module>)>> {
        self.modules.lock().expect("module registry poisoned")
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::resolver::ActionResolver;
    use crate::action::{ActionOutcome, HandlerBag};

    struct Pinger;
    impl Module for Pinger {
        fn actions(&self) -> HandlerBag {
            HandlerBag::builder()
                .on("ping", |_, _, _| Ok(ActionOutcome::None))
                .build()
        }
    }

    struct Silent;
    impl Module for Silent {}

    #[test]
    fn register_should_reject_duplicate_key() {
        let registry = ModuleRegistry::new();
        assert!(registry.register("ping", Arc::new(Pinger), false));
        assert!(!registry.register("ping", Arc::new(Pinger), false));
        assert!(registry.register("ping", Arc::new(Silent), true));
    }

    #[test]
    fn resolve_actions_should_collect_across_modules() {
        let registry = ModuleRegistry::new();
        registry.register("a", Arc::new(Pinger), false);
        registry.register("b", Arc::new(Silent), false);
        registry.register("c", Arc::new(Pinger), false);

        let resolver = ActionResolver::new();
        assert_eq!(registry.resolve_actions(&resolver, "ping").len(), 2);
        assert!(registry.resolve_actions(&resolver, "pong").is_empty());
    }
}
