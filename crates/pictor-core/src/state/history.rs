//! Bounded linear history of committed snapshots.

use serde::Serialize;

use super::options::Snapshot;

/// Committed snapshots with a head index.
///
/// The stack is never empty: it starts with the default snapshot and
/// `head` always points inside it. Pushing after an undo drops the
/// redo tail. When the stack exceeds `limit`, the oldest entries go.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    stack: Vec<Snapshot>,
    head: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            stack: vec![Snapshot::default()],
            head: 0,
            limit: limit.max(1),
        }
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Never zero: the stack always holds at least the initial snapshot.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current(&self) -> &Snapshot {
        &self.stack[self.head]
    }

    pub fn can_undo(&self) -> bool {
        self.head > 0
    }

    pub fn can_redo(&self) -> bool {
        self.head + 1 < self.stack.len()
    }

    /// Record a snapshot. Returns `false` if it equals the head.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if *self.current() == snapshot {
            return false;
        }
        self.stack.truncate(self.head + 1);
        self.stack.push(snapshot);
        if self.stack.len() > self.limit {
            let excess = self.stack.len() - self.limit;
            self.stack.drain(..excess);
        }
        self.head = self.stack.len() - 1;
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.head -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.head += 1;
        true
    }

    /// Back to a single default snapshot.
    pub fn reset(&mut self) {
        self.stack = vec![Snapshot::default()];
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(sharpen: u32) -> Snapshot {
        let mut s = Snapshot::default();
        s.adjust.sharpen = Some(sharpen);
        s
    }

    #[test]
    fn test_push_and_navigate() {
        let mut h = History::new(10);
        assert!(h.push(snap(1)));
        assert!(h.push(snap(2)));
        assert_eq!(h.len(), 3);
        assert_eq!(h.head(), 2);

        assert!(h.undo());
        assert_eq!(h.current(), &snap(1));
        assert!(h.redo());
        assert_eq!(h.current(), &snap(2));
        assert!(!h.redo());
    }

    #[test]
    fn test_base_snapshot_always_present() {
        let mut h = History::new(1);
        assert_eq!(h.len(), 1);
        h.push(snap(1));
        h.push(snap(2));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current(), &snap(2));
        h.reset();
        assert_eq!(h.len(), 1);
        assert_eq!(h.current(), &Snapshot::default());
    }

    #[test]
    fn test_identical_push_is_ignored() {
        let mut h = History::new(10);
        assert!(!h.push(Snapshot::default()));
        h.push(snap(5));
        assert!(!h.push(snap(5)));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_push_after_undo_truncates_redo_tail() {
        let mut h = History::new(10);
        h.push(snap(1));
        h.push(snap(2));
        h.undo();
        h.undo();
        h.push(snap(3));
        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert_eq!(h.current(), &snap(3));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = History::new(3);
        for i in 1..=5 {
            h.push(snap(i));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.head(), 2);
        assert_eq!(h.current(), &snap(5));
        h.undo();
        h.undo();
        assert!(!h.can_undo());
        assert_eq!(h.current(), &snap(3));
    }

    #[test]
    fn test_reset() {
        let mut h = History::new(3);
        h.push(snap(1));
        h.reset();
        assert_eq!(h.len(), 1);
        assert!(h.current().is_default());
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let mut h = History::new(0);
        h.push(snap(1));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current(), &snap(1));
    }
}
