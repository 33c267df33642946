//! # Action Resolver
//!
//! Finds the single best-matching handler for a notification key inside a
//! handler bag. Exact top-level lookup wins, so a key containing dots may
//! name a literal entry; only when that misses, and the key has at least
//! two segments, does resolution fall back to walking nested groups
//! segment by segment.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{ActionMap, ActionNode, HandlerBag, HandlerFn};

/// Resolves notification keys against handler bags.
///
/// Owns a per-key cache of split path segments so repeated notifications
/// on the same key do not re-split it.
pub struct ActionResolver {
    path_cache: Mutex<HashMap<String, Arc<[String]>>>,
}

impl ActionResolver {
    pub fn new() -> Self {
        Self {
            path_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `key` in `bag` to a handler, or `None`.
    ///
    /// Lazy bags are materialized by calling their producer on every
    /// resolution. Path traversal aborts as soon as an intermediate
    /// segment does not name a nested group.
    pub fn resolve(&self, bag: &HandlerBag, key: &str) -> Option<HandlerFn> {
        let produced;
        let map: &ActionMap = match bag {
            HandlerBag::Direct(map) => map,
            HandlerBag::Lazy(producer) => {
                produced = producer();
                &produced
            }
        };

        if let Some(ActionNode::Handler(handler)) = map.get(key) {
            return Some(handler.clone());
        }

        // Path walking needs at least two segments.
        if !key.contains('.') {
            return None;
        }

        let segments = self.segments(key);
        let mut group = map;
        for (index, segment) in segments.iter().enumerate() {
            let last = index + 1 == segments.len();
            match group.get(segment.as_str()) {
                Some(ActionNode::Handler(handler)) if last => return Some(handler.clone()),
                Some(ActionNode::Group(nested)) if !last => group = nested,
                _ => return None,
            }
        }
        None
    }

    /// Split `key` on dots, caching the result per key.
    fn segments(&self, key: &str) -> Arc<[String]> {
        let mut cache = self
            .path_cache
            .lock()
            .expect("resolver path cache poisoned");
        cache
            .entry(key.to_string())
            .or_insert_with(|| key.split('.').map(str::to_string).collect())
            .clone()
    }
}

impl Default for ActionResolver {
    fn default() -> Self {
        Self::new()
    }
}
