//! Undo/redo stacks of applied operation batches.

use crate::input::Instant;
use crate::operation::Operation;
use std::time::Duration;

/// Undo and redo stacks.
///
/// Batches recorded within the merge window of the start of the previous
/// entry are folded into it, so a burst of edits undoes in one step.
#[derive(Debug, Clone)]
pub struct History {
    undos: Vec<Vec<Operation>>,
    redos: Vec<Vec<Operation>>,
    /// When the newest undo entry was opened.
    last_recorded: Option<Instant>,
    merge_window: Duration,
    max_entries: usize,
}

impl History {
    pub fn new(merge_window: Duration, max_entries: usize) -> Self {
        Self {
            undos: Vec::new(),
            redos: Vec::new(),
            last_recorded: None,
            merge_window,
            max_entries,
        }
    }

    /// Record an applied batch. Clears the redo stack.
    pub fn record(&mut self, operations: Vec<Operation>, now: Instant) {
        if operations.is_empty() {
            return;
        }
        self.redos.clear();
        let merge = self
            .last_recorded
            .is_some_and(|last| now.saturating_duration_since(last) < self.merge_window);
        if merge {
            if let Some(entry) = self.undos.last_mut() {
                entry.extend(operations);
                return;
            }
        }
        self.undos.push(operations);
        self.last_recorded = Some(now);
        if self.undos.len() > self.max_entries {
            self.undos.remove(0);
        }
    }

    /// Start a new entry for the next recorded batch regardless of timing.
    pub fn break_merge(&mut self) {
        self.last_recorded = None;
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Vec<Operation>> {
        self.last_recorded = None;
        self.undos.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Vec<Operation>> {
        self.redos.pop()
    }

    pub(crate) fn push_undo(&mut self, operations: Vec<Operation>) {
        self.undos.push(operations);
    }

    pub(crate) fn push_redo(&mut self, operations: Vec<Operation>) {
        self.redos.push(operations);
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undos.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redos.len()
    }

    pub fn clear(&mut self) {
        self.undos.clear();
        self.redos.clear();
        self.last_recorded = None;
    }
}
