//! # History Collaborator
//!
//! Browser-history integration. The mediator pushes one entry per
//! accepted transition unless the transition itself was driven by a
//! popped history entry.

use std::sync::Mutex;

/// One recorded history mutation (tests and diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryChange {
    Push(String),
    Replace(String),
}

/// History access for page transitions.
pub trait History: Send + Sync {
    /// Push a new entry for `url`.
    fn push_state(&self, url: &str);

    /// Replace the current entry with `url`.
    fn replace_state(&self, url: &str);
}

/// In-memory history recording every mutation.
#[derive(Default)]
pub struct MemoryHistory {
    changes: Mutex<Vec<HistoryChange>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mutation recorded so far, in order.
    pub fn changes(&self) -> Vec<HistoryChange> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HistoryChange>> {
        self.changes.lock().expect("memory history poisoned")
    }
}

impl History for MemoryHistory {
    fn push_state(&self, url: &str) {
        self.lock().push(HistoryChange::Push(url.to_string()));
    }

    fn replace_state(&self, url: &str) {
        self.lock().push(HistoryChange::Replace(url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_history_should_record_changes_in_order() {
        let history = MemoryHistory::new();
        history.push_state("/a");
        history.replace_state("/b");
        assert_eq!(
            history.changes(),
            vec![
                HistoryChange::Push("/a".to_string()),
                HistoryChange::Replace("/b".to_string()),
            ]
        );
    }
}
