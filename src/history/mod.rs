//! Undo history — a bounded stack of inverse batches.
//!
//! Each entry undoes one executed batch when replayed top to bottom.
//! Pushing past capacity evicts the oldest entry.

pub mod persistence;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::dsl::Command;

/// Default number of batches kept.
pub const DEFAULT_UNDO_DEPTH: usize = 20;

/// Bounded stack of inverse batches, newest last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoHistory {
    depth: usize,
    batches: VecDeque<Vec<Command>>,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    /// Create an empty history with the default depth.
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_UNDO_DEPTH)
    }

    /// Create an empty history holding at most `depth` batches (minimum 1).
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            batches: VecDeque::new(),
        }
    }

    /// Record an inverse batch. Empty batches are ignored.
    pub fn push(&mut self, batch: Vec<Command>) {
        if batch.is_empty() {
            return;
        }
        self.batches.push_back(batch);
        while self.batches.len() > self.depth {
            self.batches.pop_front();
        }
    }

    /// Take the most recent inverse batch.
    pub fn pop(&mut self) -> Option<Vec<Command>> {
        self.batches.pop_back()
    }

    /// The most recent inverse batch, without removing it.
    pub fn peek(&self) -> Option<&[Command]> {
        self.batches.back().map(Vec::as_slice)
    }

    /// Change the capacity, dropping the oldest entries if needed.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth.max(1);
        while self.batches.len() > self.depth {
            self.batches.pop_front();
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batches from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &[Command]> {
        self.batches.iter().map(Vec::as_slice)
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
