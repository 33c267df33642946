//! # Storage Collaborator
//!
//! Persistent key/value storage. Every failure path reduces to `false`
//! or `None` plus a log line; storage problems must never break the
//! dispatch pipeline or a transition.

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;
use serde_json::Value;

/// Persistent storage for pages and modules.
pub trait Storage: Send + Sync {
    /// Read a value; `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value; `false` when the write failed.
    fn set(&self, key: &str, value: Value) -> bool;

    /// Remove a key; `false` when nothing was removed.
    fn remove(&self, key: &str) -> bool;

    /// Remove every key, or only those matching `pattern`.
    fn clear(&self, pattern: Option<&Regex>) -> bool;
}

/// In-memory storage.
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.map.lock().expect("memory storage poisoned")
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> bool {
        self.lock().insert(key.to_string(), value);
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    fn clear(&self, pattern: Option<&Regex>) -> bool {
        let mut map = self.lock();
        match pattern {
            None => {
                map.clear();
                true
            }
            Some(re) => {
                let before = map.len();
                map.retain(|key, _| !re.is_match(key));
                before != map.len()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn storage_should_round_trip_values() {
        let storage = MemoryStorage::new();
        assert!(storage.set("user", json!({"name": "mei"})));
        assert_eq!(storage.get("user").unwrap()["name"], "mei");
        assert!(storage.remove("user"));
        assert!(storage.get("user").is_none());
        assert!(!storage.remove("user"));
    }

    #[test]
    fn clear_should_honor_pattern() {
        let storage = MemoryStorage::new();
        storage.set("session.token", json!(1));
        storage.set("session.user", json!(2));
        storage.set("theme", json!("dark"));

        assert!(storage.clear(Some(&Regex::new("^session\\.").unwrap())));
        assert!(storage.get("session.token").is_none());
        assert!(storage.get("theme").is_some());
    }
}
