//! # Application Root
//!
//! One [`App`] is one independent application instance: it owns the
//! dispatcher, the resolver, both registries, the mediator, and the
//! injected collaborators. There is no global state anywhere in the
//! crate, so tests (and embedders) may run any number of instances side
//! by side.
//!
//! Construction goes through [`AppBuilder`], which defaults every
//! collaborator to its in-memory implementation; a browser-backed
//! embedder injects its own.

use std::sync::Arc;

use serde_json::Value;

use crate::action::executor::{Dispatcher, OutcomeObserver};
use crate::action::resolver::ActionResolver;
use crate::action::Action;
use crate::collab::{Dom, History, Loader, MemoryDom, MemoryHistory, MemoryStorage, StaticLoader, Storage};
use crate::config::AppConfig;
use crate::mediator::{GotoOptions, Mediator};
use crate::notification;
use crate::page::{DefaultPage, ModelSource};
use crate::registry::{ModuleRegistry, PageRegistry};

/// The application root and dependency container passed to every handler.
pub struct App {
    config: AppConfig,
    dispatcher: Dispatcher,
    resolver: ActionResolver,
    modules: ModuleRegistry,
    pages: PageRegistry,
    mediator: Mediator,
    loader: Arc<dyn Loader>,
    dom: Arc<dyn Dom>,
    history: Arc<dyn History>,
    storage: Arc<dyn Storage>,
}

impl App {
    /// Start building an application instance.
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Bootstrap the application: initialize every module in
    /// registration order, resolve the initial current page from the
    /// document location, and fire [`notification::APP_INIT`].
    pub fn start(&self) {
        for (key, module) in self.modules.snapshot() {
            tracing::debug!(module = %key, "initializing module");
            module.init(self);
        }

        let href = self.dom.location();
        match self.pages.page_for_href(&href) {
            Some(page) => {
                if page.mark_initialized() {
                    page.lifecycle().init(self);
                }
                self.mediator.reset_current(Some(page));
            }
            None => tracing::error!(href, "no page resolves the initial location"),
        }

        self.notify(notification::APP_INIT, &Value::Null);
    }

    /// Route a notification to its resolved actions: at most one from the
    /// current page's bag, then one per module whose bag resolves the key.
    pub fn notify(&self, key: &str, data: &Value) {
        let mut actions: Vec<Action> = Vec::new();
        if let Some(page) = self.mediator.current_page() {
            if let Some(handler) = self.resolver.resolve(&page.lifecycle().actions(), key) {
                actions.push(Action::Handler(handler));
            }
        }
        actions.extend(self.modules.resolve_actions(&self.resolver, key));

        if actions.is_empty() {
            tracing::trace!(key, "no actions resolved");
            return;
        }
        self.dispatcher.execute(self, actions, key, data, None);
    }

    /// Execute an explicit action list for a notification, with an
    /// optional per-entry outcome observer.
    pub fn execute(
        &self,
        actions: Vec<Action>,
        key: &str,
        data: &Value,
        observer: Option<OutcomeObserver<'_>>,
    ) {
        self.dispatcher.execute(self, actions, key, data, observer);
    }

    /// Transition to the page owning `target`.
    pub async fn goto(&self, target: &str) {
        self.goto_with(target, GotoOptions::default()).await;
    }

    /// Transition with explicit options.
    pub async fn goto_with(&self, target: &str, options: GotoOptions) {
        self.mediator.goto(self, target, options).await;
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.loader
    }

    pub fn dom(&self) -> &Arc<dyn Dom> {
        &self.dom
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

/// Builder injecting configuration and collaborators.
pub struct AppBuilder {
    config: AppConfig,
    loader: Arc<dyn Loader>,
    dom: Arc<dyn Dom>,
    history: Arc<dyn History>,
    storage: Arc<dyn Storage>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            loader: Arc::new(StaticLoader::new()),
            dom: Arc::new(MemoryDom::new()),
            history: Arc::new(MemoryHistory::new()),
            storage: Arc::new(MemoryStorage::new()),
        }
    }
}

impl AppBuilder {
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_dom(mut self, dom: Arc<dyn Dom>) -> Self {
        self.dom = dom;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = history;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// Finish the instance. The implicit default model is registered
    /// here, so route misses always have a fallback page.
    pub fn build(self) -> App {
        let pages = PageRegistry::new(self.config.default_model_key.clone());
        pages.register_model(
            self.config.default_model_key.clone(),
            ModelSource::shared(DefaultPage),
            false,
        );

        App {
            dispatcher: Dispatcher::new(self.config.debug),
            resolver: ActionResolver::new(),
            modules: ModuleRegistry::new(),
            pages,
            mediator: Mediator::new(),
            loader: self.loader,
            dom: self.dom,
            history: self.history,
            storage: self.storage,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use super::*;
    use crate::action::{ActionOutcome, HandlerBag};
    use crate::registry::Module;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        log: Log,
        keys: Vec<&'static str>,
    }

    impl Module for Recorder {
        fn actions(&self) -> HandlerBag {
            let mut builder = HandlerBag::builder();
            for key in &self.keys {
                let log = self.log.clone();
                builder = builder.on(*key, move |_, key, _| {
                    log.lock().unwrap().push(key.to_string());
                    Ok(ActionOutcome::None)
                });
            }
            builder.build()
        }
    }

    #[test]
    fn notify_should_reach_module_actions() {
        let app = App::builder().build();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        app.modules().register(
            "recorder",
            Arc::new(Recorder {
                log: log.clone(),
                keys: vec!["user.signedIn"],
            }),
            false,
        );

        app.notify("user.signedIn", &json!({"id": 7}));
        app.notify("user.signedOut", &Value::Null);

        assert_eq!(*log.lock().unwrap(), vec!["user.signedIn"]);
    }

    #[test]
    fn start_should_fire_app_init_once_and_set_current_page() {
        let dom = Arc::new(MemoryDom::new());
        dom.set_location("/home");
        let app = App::builder().with_dom(dom).build();

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        app.modules().register(
            "recorder",
            Arc::new(Recorder {
                log: log.clone(),
                keys: vec![notification::APP_INIT],
            }),
            false,
        );

        app.start();

        assert_eq!(*log.lock().unwrap(), vec![notification::APP_INIT]);
        let current = app.mediator().current_page().unwrap();
        assert_eq!(current.key(), "/home");
        assert!(current.is_initialized());
    }

    #[test]
    fn separate_apps_should_not_share_state() {
        let first = App::builder().build();
        let second = App::builder().build();

        assert!(first
            .modules()
            .register("only", Arc::new(Recorder { log: Arc::new(Mutex::new(Vec::new())), keys: vec![] }), false));
        // Same key is still free in the second instance.
        assert!(second
            .modules()
            .register("only", Arc::new(Recorder { log: Arc::new(Mutex::new(Vec::new())), keys: vec![] }), false));
    }
}
