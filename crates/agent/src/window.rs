//! History window. Splits caller history into a verbatim "recent" slice
//! and an "older" remainder.
//!
//! The split is positional only: entries are never reordered, copied, or
//! edited, so `older ++ recent` is always the original history.

use cyclemate_core::message::Turn;

/// A borrowed split of one request's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryWindow<'a> {
    /// Everything before the window, oldest first.
    pub older: &'a [Turn],
    /// The last `min(len, 2 * max_pairs)` turns, oldest first.
    pub recent: &'a [Turn],
}

impl<'a> HistoryWindow<'a> {
    /// Split `history` keeping `max_pairs` user/assistant exchanges verbatim.
    pub fn split(history: &'a [Turn], max_pairs: usize) -> Self {
        let keep = history.len().min(max_pairs.saturating_mul(2));
        let (older, recent) = history.split_at(history.len() - keep);
        Self { older, recent }
    }

    pub fn has_older(&self) -> bool {
        !self.older.is_empty()
    }

    pub fn total(&self) -> usize {
        self.older.len() + self.recent.len()
    }
}
