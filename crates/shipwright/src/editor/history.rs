//! Bounded undo/redo stacks
//!
//! [`HistoryStack`] keeps `past / present / future` for values the editor
//! owns outright (the source text). [`SnapshotHistory`] keeps only
//! `past / future`: its present is the live graphic, which the caller
//! captures and hands in on every undo and redo.

use std::collections::VecDeque;

use crate::core::VisualSnapshot;

/// Value history with a present entry
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    limit: usize,
}

impl<T: Clone + PartialEq> HistoryStack<T> {
    pub fn new(initial: T, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Record a new present value; returns `false` when it equals the
    /// current one and nothing changed
    pub fn set_value(&mut self, value: T) -> bool {
        if value == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, value);
        self.past.push_back(previous);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(&self.present)
    }

    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(&self.present)
    }

    pub fn reset(&mut self, initial: T) {
        self.past.clear();
        self.future.clear();
        self.present = initial;
    }
}

/// Visual history of whole-graphic snapshots
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    past: VecDeque<VisualSnapshot>,
    future: Vec<VisualSnapshot>,
    limit: usize,
}

impl SnapshotHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Record the state before a visual change
    ///
    /// Ignored when the markup equals the most recent entry; otherwise the
    /// redo stack is cleared.
    pub fn push_snapshot(&mut self, snapshot: VisualSnapshot) -> bool {
        if self
            .past
            .back()
            .is_some_and(|last| last.same_markup(&snapshot))
        {
            return false;
        }
        self.past.push_back(snapshot);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Pop the previous state, keeping `current` for redo
    pub fn undo(&mut self, current: VisualSnapshot) -> Option<VisualSnapshot> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Pop the next state, keeping `current` for undo; the rest of the redo
    /// stack survives
    pub fn redo(&mut self, current: VisualSnapshot) -> Option<VisualSnapshot> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(next)
    }

    pub fn clear_future(&mut self) {
        self.future.clear();
    }

    pub fn reset(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
