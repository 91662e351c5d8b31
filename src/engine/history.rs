//! Bounded undo/redo over whole-document snapshots.

use std::collections::VecDeque;

/// Two-stack history.
///
/// `past` holds at most `capacity` snapshots (oldest evicted first); `future`
/// is emptied by every new [`push`](History::push).
#[derive(Debug, Clone)]
pub struct History<S> {
    capacity: usize,
    past: VecDeque<S>,
    future: Vec<S>,
}

impl<S: Clone> History<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            past: VecDeque::with_capacity(capacity.min(64)),
            future: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record the state before an edit. Invalidates all redo entries.
    pub fn push(&mut self, snapshot: S) {
        self.push_past(snapshot);
        self.future.clear();
    }

    /// Step back: returns the state to restore and stores `current` for redo.
    pub fn undo(&mut self, current: S) -> Option<S> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward: returns the state to restore and stores `current` for undo.
    pub fn redo(&mut self, current: S) -> Option<S> {
        let next = self.future.pop()?;
        self.push_past(current);
        Some(next)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    #[inline]
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    #[inline]
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, snapshot: S) {
        if self.capacity == 0 {
            return;
        }
        self.past.push_back(snapshot);
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
    }
}
