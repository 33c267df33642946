//! # Document Collaborator
//!
//! The mediator's view of the document: where the application currently
//! is, whether a page's content node is present, and grafting fetched
//! content into the application root. A page's "loaded" state is derived
//! from node presence, never persisted.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::DomError;

/// Document access for page transitions.
pub trait Dom: Send + Sync {
    /// Current document location (href).
    fn location(&self) -> String;

    /// Whether a node matching `selector` is present in the document.
    fn has_node(&self, selector: &str) -> bool;

    /// Parse `html`, locate the node matching `selector`, and graft it
    /// hidden into the node matching `root`.
    ///
    /// `Ok(true)` on success, `Ok(false)` when the payload parsed but
    /// contains no such node, `Err` when the payload cannot be parsed.
    fn graft_hidden(&self, html: &str, selector: &str, root: &str) -> Result<bool, DomError>;
}

/// Headless in-memory document.
///
/// "Parsing" is a containment scan: a fragment holds the node for
/// `#page-b` when it contains `id="page-b"`. Parse failures are scripted
/// through [`MemoryDom::fail_parse`].
#[derive(Default)]
pub struct MemoryDom {
    inner: Mutex<MemoryDomState>,
}

#[derive(Default)]
struct MemoryDomState {
    location: String,
    nodes: HashSet<String>,
    fail_parse: bool,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current document location.
    pub fn set_location(&self, href: impl Into<String>) {
        self.lock().location = href.into();
    }

    /// Mark a node as present in the document.
    pub fn add_node(&self, selector: impl Into<String>) {
        self.lock().nodes.insert(selector.into());
    }

    /// When set, every graft attempt fails to parse.
    pub fn fail_parse(&self, fail: bool) {
        self.lock().fail_parse = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryDomState> {
        self.inner.lock().expect("memory dom poisoned")
    }
}

impl Dom for MemoryDom {
    fn location(&self) -> String {
        self.lock().location.clone()
    }

    fn has_node(&self, selector: &str) -> bool {
        self.lock().nodes.contains(selector)
    }

    fn graft_hidden(&self, html: &str, selector: &str, _root: &str) -> Result<bool, DomError> {
        let mut state = self.lock();
        if state.fail_parse {
            return Err(DomError::Parse("scripted parse failure".to_string()));
        }
        let id = selector.trim_start_matches('#');
        if html.contains(&format!("id=\"{id}\"")) {
            state.nodes.insert(selector.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
