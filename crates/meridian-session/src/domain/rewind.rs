//! Undo stack of player decisions.

use chrono::{DateTime, Utc};
use meridian_story::Choice;
use serde::{Deserialize, Serialize};

/// One recorded decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewindEntry {
    /// Node the choice was taken on.
    pub node_id: String,
    /// The choice taken.
    pub choice: Choice,
    /// Position of the choice in the node's list.
    pub choice_index: usize,
    /// Wall-clock time of the decision.
    pub recorded_at: DateTime<Utc>,
    /// Number of transcript messages displayed before the node was entered.
    /// Rewinding retracts everything after this mark.
    #[serde(default)]
    pub transcript_mark: usize,
}

/// Stack of decisions, newest last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewindManager {
    entries: Vec<RewindEntry>,
}

impl RewindManager {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a stack from persisted entries, oldest first.
    #[must_use]
    pub fn from_entries(entries: Vec<RewindEntry>) -> Self {
        Self { entries }
    }

    /// Records a decision.
    pub fn push(&mut self, entry: RewindEntry) {
        self.entries.push(entry);
    }

    /// Removes and returns the latest decision.
    pub fn pop(&mut self) -> Option<RewindEntry> {
        self.entries.pop()
    }

    /// Number of recorded decisions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing can be rewound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries oldest first.
    #[must_use]
    pub fn entries(&self) -> &[RewindEntry] {
        &self.entries
    }
}
