//! # Page Registry
//!
//! Holds page models and the instances produced from them. Models are kept
//! in registration order because cross-model route scanning is
//! first-match-wins by that order; instances are cached by their unique
//! key. All configuration mistakes (duplicate keys, unknown models,
//! factories producing nothing) are logged and reduced to sentinel
//! returns, never errors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::routes::{self, RoutePattern};
use crate::page::{ModelSource, PageData, PageInstance};

struct ModelEntry {
    key: String,
    source: ModelSource,
    routes: Vec<RoutePattern>,
}

#[derive(Default)]
struct PagesInner {
    models: Vec<ModelEntry>,
    instances: HashMap<String, Arc<PageInstance>>,
}

/// Registry of page models and instances.
pub struct PageRegistry {
    inner: Mutex<PagesInner>,
    default_key: String,
}

impl PageRegistry {
    pub fn new(default_key: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(PagesInner::default()),
            default_key: default_key.into(),
        }
    }

    /// Register a model under a unique key.
    ///
    /// A duplicate key without `override_existing` leaves the original
    /// untouched and returns `false`. With it, the whole registration is
    /// replaced: the previous route set is dropped along with the source,
    /// and routes must be attached again.
    pub fn register_model(
        &self,
        key: impl Into<String>,
        source: ModelSource,
        override_existing: bool,
    ) -> bool {
        let key = key.into();
        let mut inner = self.lock();
        if let Some(position) = inner.models.iter().position(|m| m.key == key) {
            if !override_existing {
                tracing::error!(model = %key, "model already registered");
                return false;
            }
            inner.models[position] = ModelEntry {
                key,
                source,
                routes: Vec::new(),
            };
            return true;
        }
        inner.models.push(ModelEntry {
            key,
            source,
            routes: Vec::new(),
        });
        true
    }

    /// Whether a model is registered under `key`.
    pub fn has_model(&self, key: &str) -> bool {
        self.lock().models.iter().any(|m| m.key == key)
    }

    /// Create (and cache) an instance of a registered model.
    ///
    /// Fails when the model is unknown, when `page_data.key` already has
    /// an instance and `override_existing` is not set, or when a factory
    /// model produces nothing.
    pub fn create_instance(
        &self,
        page_data: PageData,
        model_key: &str,
        override_existing: bool,
    ) -> Option<Arc<PageInstance>> {
        let source = {
            let inner = self.lock();
            if inner.instances.contains_key(&page_data.key) && !override_existing {
                tracing::error!(page = %page_data.key, "page instance already exists");
                return None;
            }
            match inner.models.iter().find(|m| m.key == model_key) {
                Some(model) => model.source.clone(),
                None => {
                    tracing::error!(model = %model_key, "unknown page model");
                    return None;
                }
            }
        };

        // The factory is user code; it runs outside the registry lock.
        let lifecycle = match source.produce(&page_data.key, &page_data) {
            Some(lifecycle) => lifecycle,
            None => {
                tracing::error!(model = %model_key, page = %page_data.key, "model factory produced no page");
                return None;
            }
        };

        let key = page_data.key.clone();
        let instance = Arc::new(PageInstance::new(page_data, lifecycle));
        self.lock().instances.insert(key, instance.clone());
        Some(instance)
    }

    /// Look up an existing instance by key.
    pub fn instance(&self, key: &str) -> Option<Arc<PageInstance>> {
        self.lock().instances.get(key).cloned()
    }

    /// Attach route patterns to a model's active set, deduplicating
    /// against the patterns already present.
    ///
    /// The reserved default model matches by exclusion and cannot carry
    /// routes. Returns the size of the active set, or `None` on failure.
    pub fn add_routes(&self, model_key: &str, patterns: Vec<RoutePattern>) -> Option<usize> {
        if model_key == self.default_key {
            tracing::error!("routes cannot be attached to the default model");
            return None;
        }
        let mut inner = self.lock();
        let model = match inner.models.iter_mut().find(|m| m.key == model_key) {
            Some(model) => model,
            None => {
                tracing::error!(model = %model_key, "unknown page model");
                return None;
            }
        };
        for pattern in patterns {
            if !model.routes.contains(&pattern) {
                model.routes.push(pattern);
            }
        }
        Some(model.routes.len())
    }

    /// Find the instance owning `route`: an existing instance keyed by
    /// the stripped route, or a fresh instance of the first model whose
    /// active routes match. `None` when no model claims the route.
    pub fn find_page(&self, route: &str) -> Option<Arc<PageInstance>> {
        let key = routes::strip_fragment(route);
        if let Some(existing) = self.instance(key) {
            return Some(existing);
        }

        let model_key = {
            let inner = self.lock();
            inner
                .models
                .iter()
                .find(|m| routes::match_route(key, &m.routes).is_some())
                .map(|m| m.key.clone())?
        };
        self.create_instance(PageData::new(key), &model_key, false)
    }

    /// Like [`find_page`](Self::find_page), but falls back to the
    /// implicit default model, so a page always comes back as long as the
    /// default model is registered.
    pub fn page_for_href(&self, href: &str) -> Option<Arc<PageInstance>> {
        if let Some(page) = self.find_page(href) {
            return Some(page);
        }
        let key = routes::strip_fragment(href);
        let default_key = self.default_key.clone();
        if !self.has_model(&default_key) {
            tracing::error!(model = %default_key, "default model is not registered");
            return None;
        }
        self.create_instance(PageData::new(key), &default_key, false)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PagesInner> {
        self.inner.lock().expect("page registry poisoned")
    }
}
