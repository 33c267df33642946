//! # Pages
//!
//! A page *model* is the template side: a shared behavior object or a
//! factory, registered once under a key and bound to route patterns. A
//! page *instance* is one concrete page with a unique key, produced the
//! first time a route resolves to its model and kept for the lifetime of
//! the application.
//!
//! Behavior hangs off [`PageLifecycle`]; every method has a default, so a
//! model implements only what it needs. `enter` and `leave` are the
//! framework's suspension points: both may defer arbitrarily (letting a
//! visual transition finish, for instance) and the mediator does not force
//! one to complete before the other starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::action::HandlerBag;
use crate::app::App;

/// Lifecycle capabilities of a page.
#[async_trait]
pub trait PageLifecycle: Send + Sync {
    /// Handlers this page contributes while it is current.
    fn actions(&self) -> HandlerBag {
        HandlerBag::empty()
    }

    /// Selector of this page's content node. When `None`, a selector is
    /// derived from the instance key.
    fn selector(&self) -> Option<String> {
        None
    }

    /// Whether a transition may enter this page.
    fn can_enter(&self) -> bool {
        true
    }

    /// Whether a transition may leave this page.
    fn can_leave(&self) -> bool {
        true
    }

    /// Called exactly once, the first time the page becomes reachable.
    fn init(&self, app: &App) {
        let _ = app;
    }

    /// Called when a transition enters this page. Completion closes out
    /// the entering half of the transition.
    async fn enter(&self, app: &App, data: &PageData) {
        let _ = (app, data);
    }

    /// Called when a transition leaves this page. Completion closes out
    /// the leaving half of the transition.
    async fn leave(&self, app: &App) {
        let _ = app;
    }
}

/// Page behavior with every capability defaulted; the implicit fallback
/// model and the natural base for content-only pages.
pub struct DefaultPage;

#[async_trait]
impl PageLifecycle for DefaultPage {}

/// How a registered model produces page instances.
#[derive(Clone)]
pub enum ModelSource {
    /// One behavior object shared by every instance of the model.
    Shared(Arc<dyn PageLifecycle>),
    /// A factory called per instance with `(key, page_data)`. Returning
    /// `None` is a registration-time failure, logged by the registry.
    Factory(Arc<dyn Fn(&str, &PageData) -> Option<Arc<dyn PageLifecycle>> + Send + Sync>),
}

impl ModelSource {
    /// A source sharing one behavior object.
    pub fn shared(lifecycle: impl PageLifecycle + 'static) -> Self {
        Self::Shared(Arc::new(lifecycle))
    }

    /// A source producing behavior per instance.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&str, &PageData) -> Option<Arc<dyn PageLifecycle>> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    pub(crate) fn produce(&self, key: &str, data: &PageData) -> Option<Arc<dyn PageLifecycle>> {
        match self {
            Self::Shared(lifecycle) => Some(lifecycle.clone()),
            Self::Factory(factory) => factory(key, data),
        }
    }
}

/// Data bag accompanying a page instance or a transition.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    /// Unique page key (usually the route string).
    pub key: String,
    /// Optional document title.
    pub title: Option<String>,
    /// Explicit content selector, overriding the derived one.
    pub selector: Option<String>,
    /// Free-form payload handed to `enter` and to notification handlers.
    pub data: Value,
}

impl PageData {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Set a boolean flag in the payload, promoting a null payload to an
    /// object first.
    pub fn set_flag(&mut self, name: &str, value: bool) {
        if !self.data.is_object() {
            self.data = Value::Object(serde_json::Map::new());
        }
        if let Some(map) = self.data.as_object_mut() {
            map.insert(name.to_string(), Value::Bool(value));
        }
    }
}

/// One concrete page, uniquely keyed, owning its behavior and one-shot
/// initialization flag.
pub struct PageInstance {
    key: String,
    selector: String,
    initialized: AtomicBool,
    lifecycle: Arc<dyn PageLifecycle>,
    data: PageData,
}

impl PageInstance {
    pub(crate) fn new(data: PageData, lifecycle: Arc<dyn PageLifecycle>) -> Self {
        let selector = data
            .selector
            .clone()
            .or_else(|| lifecycle.selector())
            .unwrap_or_else(|| derived_selector(&data.key));
        Self {
            key: data.key.clone(),
            selector,
            initialized: AtomicBool::new(false),
            lifecycle,
            data,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Selector of this page's content node in the document.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn data(&self) -> &PageData {
        &self.data
    }

    pub fn lifecycle(&self) -> &Arc<dyn PageLifecycle> {
        &self.lifecycle
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Set the initialization flag; `true` exactly once.
    pub(crate) fn mark_initialized(&self) -> bool {
        !self.initialized.swap(true, Ordering::SeqCst)
    }

    pub fn can_enter(&self) -> bool {
        self.lifecycle.can_enter()
    }

    pub fn can_leave(&self) -> bool {
        self.lifecycle.can_leave()
    }
}

/// Derive a content selector from a page key: `/news/today` becomes
/// `#page-news-today`.
fn derived_selector(key: &str) -> String {
    let slug: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "#page-root".to_string()
    } else {
        format!("#page-{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_selector_should_slug_route_keys() {
        assert_eq!(derived_selector("/news/today"), "#page-news-today");
        assert_eq!(derived_selector("/"), "#page-root");
        assert_eq!(derived_selector("plain"), "#page-plain");
    }

    #[test]
    fn instance_should_prefer_explicit_selector() {
        let data = PageData::new("/a").with_selector("#custom");
        let instance = PageInstance::new(data, Arc::new(DefaultPage));
        assert_eq!(instance.selector(), "#custom");
    }

    #[test]
    fn mark_initialized_should_trip_once() {
        let instance = PageInstance::new(PageData::new("/a"), Arc::new(DefaultPage));
        assert!(!instance.is_initialized());
        assert!(instance.mark_initialized());
        assert!(!instance.mark_initialized());
        assert!(instance.is_initialized());
    }

    #[test]
    fn set_flag_should_promote_null_payload() {
        let mut data = PageData::new("/a");
        data.set_flag("firstTime", true);
        assert_eq!(data.data["firstTime"], true);
    }
}
