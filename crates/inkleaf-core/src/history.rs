//! Undo/redo log of full-scene snapshots.

use crate::clock::Instant;
use crate::events::{SceneChange, SceneListener};

/// Default maximum number of snapshots to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Ordered snapshots plus a cursor at the one shown on the surface.
///
/// Entries after the cursor are redoable. Recording a new snapshot drops them
/// first, so a new edit after an undo permanently discards the old branch.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history bounded to `limit` snapshots (at least 1).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Drop every entry and start again from `initial`.
    pub fn reset(&mut self, initial: String) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Append a snapshot after the cursor, discarding any redo branch.
    pub fn record(&mut self, snapshot: String) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);

        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back. Returns the snapshot to restore, `None` at the start.
    pub fn undo(&mut self) -> Option<&str> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward. Returns the snapshot to restore, `None` at the end.
    pub fn redo(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SceneListener for History {
    fn scene_changed(&mut self, _change: SceneChange, snapshot: &str, _now: Instant) {
        self.record(snapshot.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(snapshots: &[&str]) -> History {
        let mut history = History::default();
        history.reset(snapshots[0].to_string());
        for s in &snapshots[1..] {
            history.record(s.to_string());
        }
        history
    }

    #[test]
    fn test_undo_redo_walks_the_log() {
        let mut history = seeded(&["s0", "s1", "s2", "s3"]);

        assert_eq!(history.undo(), Some("s2"));
        assert_eq!(history.undo(), Some("s1"));
        assert_eq!(history.redo(), Some("s2"));
        assert_eq!(history.redo(), Some("s3"));
        assert_eq!(history.current(), Some("s3"));
    }

    #[test]
    fn test_undo_k_then_redo_k_restores() {
        let snapshots = ["s0", "s1", "s2", "s3", "s4", "s5"];
        for k in 0..snapshots.len() {
            let mut history = seeded(&snapshots);
            for _ in 0..k {
                history.undo();
            }
            for _ in 0..k {
                history.redo();
            }
            assert_eq!(history.current(), Some("s5"), "k = {}", k);
        }
    }

    #[test]
    fn test_new_edit_drops_redo_branch() {
        let mut history = seeded(&["s0", "s1", "s2"]);
        history.undo();
        history.record("s2b".to_string());

        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some("s1"));
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut history = seeded(&["s0", "s1"]);
        assert_eq!(history.redo(), None);
        assert_eq!(history.cursor(), 1);

        history.undo();
        assert_eq!(history.undo(), None);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(3);
        history.reset("s0".to_string());
        for s in ["s1", "s2", "s3", "s4"] {
            history.record(s.to_string());
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some("s4"));
        assert_eq!(history.undo(), Some("s3"));
        assert_eq!(history.undo(), Some("s2"));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_listener_records() {
        let mut history = History::default();
        history.reset("s0".to_string());
        history.scene_changed(SceneChange::Replaced, "s1", Instant::now());
        assert_eq!(history.current(), Some("s1"));
        assert!(history.can_undo());
    }
}
