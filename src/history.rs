//! Bounded undo buffer.
//!
//! Stack discipline: the most recent push is the first pop. The buffer is
//! scoped to the edit chain of a single loaded image — loading a genuinely
//! new image flushes it.

use crate::picture::Picture;
use std::collections::VecDeque;

/// Default retention, matching the viewer's undo depth.
pub const DEFAULT_LIMIT: usize = 15;

#[derive(Debug)]
pub struct HistoryStore {
    entries: VecDeque<Picture>,
    limit: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Inserts at the front, evicting the oldest entry past the limit.
    pub fn push(&mut self, picture: Picture) {
        self.entries.push_front(picture);
        while self.entries.len() > self.limit {
            self.entries.pop_back();
        }
    }

    /// Removes and returns the most recent entry. `None` means "nothing to
    /// undo", not an error.
    pub fn pop(&mut self) -> Option<Picture> {
        self.entries.pop_front()
    }

    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pic(tag: u8) -> Picture {
        Picture::from_encoded(vec![tag], "image/png")
    }

    #[test]
    fn pop_returns_most_recent_first() {
        let mut store = HistoryStore::new();
        store.push(pic(1));
        store.push(pic(2));
        assert_eq!(store.pop().unwrap().bytes(), &[2]);
        assert_eq!(store.pop().unwrap().bytes(), &[1]);
        assert!(store.pop().is_none());
    }

    #[test]
    fn never_exceeds_limit_and_evicts_oldest() {
        let mut store = HistoryStore::with_limit(3);
        for tag in 0..7u8 {
            store.push(pic(tag));
        }
        assert_eq!(store.len(), 3);
        // The four oldest (0..=3) were evicted; 6, 5, 4 remain in LIFO order.
        assert_eq!(store.pop().unwrap().bytes(), &[6]);
        assert_eq!(store.pop().unwrap().bytes(), &[5]);
        assert_eq!(store.pop().unwrap().bytes(), &[4]);
        assert!(store.pop().is_none());
    }

    #[test]
    fn flush_empties_the_store() {
        let mut store = HistoryStore::new();
        store.push(pic(1));
        store.push(pic(2));
        store.flush();
        assert!(store.is_empty());
        assert!(store.pop().is_none());
    }
}
