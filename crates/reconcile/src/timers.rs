use core_types::Millis;
use dom::{Document, NodeKey};
use std::collections::HashMap;

/// A deferred second attempt at coloring a row's sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorRetry {
    pub row: NodeKey,
    /// Name the retry was scheduled for; a row renamed since is skipped.
    pub name: String,
    pub due: Millis,
}

/// At most one pending retry per row. Scheduling again replaces it.
#[derive(Debug, Default)]
pub struct RetryQueue {
    pending: HashMap<NodeKey, ColorRetry>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, row: NodeKey, name: &str, due: Millis) {
        self.pending.insert(row, ColorRetry {
            row,
            name: name.to_string(),
            due,
        });
    }

    pub fn cancel(&mut self, row: NodeKey) -> bool {
        self.pending.remove(&row).is_some()
    }

    /// Remove and return every retry due at `now`, earliest first.
    pub fn take_due(&mut self, now: Millis) -> Vec<ColorRetry> {
        let due_rows: Vec<NodeKey> = self
            .pending
            .values()
            .filter(|r| r.due <= now)
            .map(|r| r.row)
            .collect();
        let mut due: Vec<ColorRetry> = due_rows
            .into_iter()
            .filter_map(|row| self.pending.remove(&row))
            .collect();
        due.sort_by_key(|r| (r.due, r.row.0));
        due
    }

    /// Drop retries for rows that are no longer connected.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.pending.len();
        self.pending.retain(|row, _| doc.is_connected(*row));
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
