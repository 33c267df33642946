//! # Actions
//!
//! The notification-handling pipeline: handler bags contributed by pages
//! and modules, resolution of a key to a handler, and execution of resolved
//! handlers with read/write staging.
//!
//! A handler is invoked with the notification key and its data bag and may
//! return a deferred side effect: either a bare write, or a read/write pair
//! whose `read` observes state before any `write` in the same drain pass
//! mutates it. The executor owns the shared staging stack; see
//! [`executor::Dispatcher`] for the drain protocol.

pub mod executor;
pub mod invoker;
pub mod resolver;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::app::App;
use crate::error::HandlerError;

/// Type alias for a deferred side effect invoked during a drain pass.
pub type EffectFn = Box<dyn FnOnce(&App) + Send>;

/// Type alias for a notification handler to reduce signature complexity.
pub type HandlerFn =
    Arc<dyn Fn(&App, &str, &Value) -> Result<ActionOutcome, HandlerError> + Send + Sync>;

/// Type alias for a lazy handler-bag producer.
pub type BagProducer = Arc<dyn Fn() -> ActionMap + Send + Sync>;

/// A bag of handlers keyed by notification key, possibly nested.
pub type ActionMap = HashMap<String, ActionNode>;

/// One entry handed to the executor for a single notification.
pub enum Action {
    /// A handler to invoke with `(key, data)`.
    Handler(HandlerFn),
    /// An already-resolved outcome, passed through the invoker unchanged.
    Ready(ActionOutcome),
}

/// The return value of one invoked handler.
pub enum ActionOutcome {
    /// Nothing to stage.
    None,
    /// A bare write; staged as `{read: None, write}`.
    Write(EffectFn),
    /// A read/write pair; the read runs in the read phase of its drain
    /// pass, the write in the write phase.
    ReadWrite {
        read: Option<EffectFn>,
        write: EffectFn,
    },
}

impl ActionOutcome {
    /// Stage a bare write effect.
    pub fn write<W>(write: W) -> Self
    where
        W: FnOnce(&App) + Send + 'static,
    {
        Self::Write(Box::new(write))
    }

    /// Stage a read/write pair.
    pub fn read_write<R, W>(read: R, write: W) -> Self
    where
        R: FnOnce(&App) + Send + 'static,
        W: FnOnce(&App) + Send + 'static,
    {
        Self::ReadWrite {
            read: Some(Box::new(read)),
            write: Box::new(write),
        }
    }

    /// Whether this outcome stages nothing.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("ActionOutcome::None"),
            Self::Write(_) => f.write_str("ActionOutcome::Write"),
            Self::ReadWrite { read, .. } => f
                .debug_struct("ActionOutcome::ReadWrite")
                .field("has_read", &read.is_some())
                .finish(),
        }
    }
}

/// One node in a handler bag: a handler, or a nested group reached by
/// dotted-path resolution.
#[derive(Clone)]
pub enum ActionNode {
    Handler(HandlerFn),
    Group(ActionMap),
}

/// A set of handlers contributed by a page or module.
///
/// `Direct` bags are plain maps; `Lazy` bags are produced on every
/// resolution, for contributors whose handler set depends on runtime state.
#[derive(Clone)]
pub enum HandlerBag {
    Direct(ActionMap),
    Lazy(BagProducer),
}

impl HandlerBag {
    /// A bag with no handlers.
    pub fn empty() -> Self {
        Self::Direct(ActionMap::new())
    }

    /// A bag produced on every resolution.
    pub fn lazy<F>(producer: F) -> Self
    where
        F: Fn() -> ActionMap + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(producer))
    }

    /// Start building a direct bag.
    pub fn builder() -> BagBuilder {
        BagBuilder::default()
    }
}

impl Default for HandlerBag {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builder for direct handler bags.
#[derive(Default)]
pub struct BagBuilder {
    map: ActionMap,
}

impl BagBuilder {
    /// Register a handler under a key. Dots in the key are legal literal
    /// characters; exact lookup wins over path traversal.
    pub fn on<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&App, &str, &Value) -> Result<ActionOutcome, HandlerError> + Send + Sync + 'static,
    {
        self.map
            .insert(key.into(), ActionNode::Handler(Arc::new(handler)));
        self
    }

    /// Register a nested group reachable by dotted-path resolution.
    pub fn group(mut self, key: impl Into<String>, group: BagBuilder) -> Self {
        self.map.insert(key.into(), ActionNode::Group(group.map));
        self
    }

    /// Finish into a direct bag.
    pub fn build(self) -> HandlerBag {
        HandlerBag::Direct(self.map)
    }

    /// Finish into a bare map, for use inside lazy producers.
    pub fn into_map(self) -> ActionMap {
        self.map
    }
}
