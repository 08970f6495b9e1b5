//! Rolling session history of completed searches.
//!
//! The history is owned by the caller (a CLI session, a request handler) and
//! passed into each query explicitly. Newest entries sit at the front; once
//! the capacity is exceeded the oldest entry is evicted.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::{HISTORY_CAPACITY, HISTORY_DESCRIPTION_CHARS, HISTORY_TOP_SUGGESTIONS};
use crate::models::{Region, Suggestion};

/// A truncated record of one successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Original description, truncated for display.
    pub description: String,
    pub region: Region,
    /// Top suggestions, best first.
    pub top_suggestions: Vec<Suggestion>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn new(description: &str, region: Region, suggestions: &[Suggestion]) -> Self {
        Self {
            timestamp: Utc::now(),
            description: truncate_chars(description.trim(), HISTORY_DESCRIPTION_CHARS),
            region,
            top_suggestions: suggestions
                .iter()
                .take(HISTORY_TOP_SUGGESTIONS)
                .cloned()
                .collect(),
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Bounded, most-recent-first search history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchHistory {
    /// Empty history with the default capacity of 10.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Empty history with a custom capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, returning the evicted oldest entry if any.
    pub fn append(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Entries, newest first.
    pub fn list(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
