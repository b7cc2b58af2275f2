// Calculation history - bounded, most-recent-first, memory only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default maximum number of entries retained in the log.
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Where a history entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A keypad calculation logged on `=`.
    Standard,
    /// An AI-solver query; the result field holds a fixed label, not the
    /// solved value.
    Ai,
}

/// One logged calculation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub expression: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
}

impl HistoryEntry {
    pub fn standard(expression: &str, result: &str) -> Self {
        Self::new(expression, result, EntryKind::Standard)
    }

    pub fn ai(query: &str, result_label: &str) -> Self {
        Self::new(query, result_label, EntryKind::Ai)
    }

    fn new(expression: &str, result: &str, kind: EntryKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expression: expression.to_string(),
            result: result.to_string(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Bounded most-recent-first log. Entries past the cap are evicted oldest
/// first; an explicit clear destroys everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    cap: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Prepend an entry, evicting the oldest beyond the cap.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.cap);
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
