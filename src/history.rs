use std::collections::VecDeque;

use tracing::debug;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::core::errors::{CoreError, Result};
use crate::models::models::HistoryEntry;

/// Bounded browsing history. Access is LIFO, but once full the oldest entry
/// (the bottom of the stack) is evicted to make room.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    // front = oldest, back = top
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        HistoryStack::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        HistoryStack {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns false when the entry names the same resource as the current
    /// top and was therefore not recorded.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if self.entries.back().is_some_and(|top| top.same_target(&entry)) {
            return false;
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(target_id = %evicted.target_id, "history full, evicted oldest entry");
            }
        }
        self.entries.push_back(entry);
        true
    }

    pub fn pop(&mut self) -> Result<HistoryEntry> {
        self.entries.pop_back().ok_or(CoreError::HistoryEmpty)
    }

    pub fn peek(&self) -> Result<&HistoryEntry> {
        self.entries.back().ok_or(CoreError::HistoryEmpty)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter().rev()
    }
}
