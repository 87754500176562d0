//! Undo/redo history: a bounded ring of serialized document snapshots.
//!
//! DESIGN
//! ======
//! Each durable mutation stores a JSON copy of the whole document. The cursor
//! points at the entry matching the live document. Recording truncates any
//! redo branch past the cursor, appends, then evicts from the front until both
//! the entry and byte limits hold. `record_if_changed` skips all of that when
//! the document equals the current entry. Undo and redo only move the cursor and hand
//! back the decoded entry; they never record.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::{HISTORY_MAX_BYTES, HISTORY_MAX_ENTRIES};
use crate::doc::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("snapshot encode failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("snapshot decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Capacity bounds for the history ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    /// Maximum number of entries kept.
    pub max_entries: usize,
    /// Maximum total size of all serialized entries, in bytes. The newest
    /// entry is always kept even if it alone exceeds this.
    pub max_bytes: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self { max_entries: HISTORY_MAX_ENTRIES, max_bytes: HISTORY_MAX_BYTES }
    }
}

/// Linear undo history with branch discard.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    bytes: usize,
    limits: HistoryLimits,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: HistoryLimits) -> Self {
        Self { limits, ..Self::default() }
    }

    #[must_use]
    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry matching the live document.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Total bytes held by all entries.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.bytes = 0;
    }

    /// Record `snap` as the newest entry, discarding the redo branch past
    /// the cursor.
    ///
    /// # Errors
    ///
    /// Returns `Encode` if the snapshot cannot be serialized.
    pub fn record(&mut self, snap: &Snapshot) -> Result<(), HistoryError> {
        let encoded = serde_json::to_string(snap).map_err(HistoryError::Encode)?;
        self.push(encoded);
        Ok(())
    }

    /// Like [`History::record`], but does nothing when the snapshot equals
    /// the entry under the cursor. The redo branch survives in that case.
    /// Returns whether an entry was appended.
    ///
    /// # Errors
    ///
    /// Returns `Encode` if the snapshot cannot be serialized.
    pub fn record_if_changed(&mut self, snap: &Snapshot) -> Result<bool, HistoryError> {
        let encoded = serde_json::to_string(snap).map_err(HistoryError::Encode)?;
        if let Some(c) = self.cursor
            && self.entries.get(c).is_some_and(|cur| *cur == encoded)
        {
            return Ok(false);
        }
        self.push(encoded);
        Ok(true)
    }

    fn push(&mut self, encoded: String) {
        self.truncate_redo();
        self.bytes += encoded.len();
        self.entries.push_back(encoded);
        self.evict();
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry and return it.
    ///
    /// # Errors
    ///
    /// Returns `NothingToUndo` at the first entry, `Decode` if the stored
    /// entry is unreadable (the cursor is left unchanged in both cases).
    pub fn undo(&mut self) -> Result<Snapshot, HistoryError> {
        let target = match self.cursor {
            Some(c) if c > 0 => c - 1,
            _ => return Err(HistoryError::NothingToUndo),
        };
        let snap = self.decode(target)?;
        self.cursor = Some(target);
        Ok(snap)
    }

    /// Step forward one entry and return it.
    ///
    /// # Errors
    ///
    /// Returns `NothingToRedo` at the last entry, `Decode` if the stored
    /// entry is unreadable.
    pub fn redo(&mut self) -> Result<Snapshot, HistoryError> {
        let target = match self.cursor {
            Some(c) if c + 1 < self.entries.len() => c + 1,
            _ => return Err(HistoryError::NothingToRedo),
        };
        let snap = self.decode(target)?;
        self.cursor = Some(target);
        Ok(snap)
    }

    fn decode(&self, idx: usize) -> Result<Snapshot, HistoryError> {
        let raw = self.entries.get(idx).map_or("", String::as_str);
        serde_json::from_str(raw).map_err(HistoryError::Decode)
    }

    fn truncate_redo(&mut self) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        while self.entries.len() > keep {
            if let Some(dropped) = self.entries.pop_back() {
                self.bytes -= dropped.len();
            }
        }
    }

    fn evict(&mut self) {
        while self.entries.len() > 1
            && (self.entries.len() > self.limits.max_entries || self.bytes > self.limits.max_bytes)
        {
            if let Some(dropped) = self.entries.pop_front() {
                self.bytes -= dropped.len();
            }
        }
    }
}
