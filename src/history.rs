//! Undo/redo history
//!
//! One entry per applied transaction, so a user edit and the marker edits
//! merged into it undo in a single step.

use crate::text::{ChangeSet, EditorSelection};

/// An applied transaction, with what it takes to revert it
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Changes as applied, against the document before the edit
    pub changes: ChangeSet,
    /// Changes reverting the edit, against the document after it
    pub inverse: ChangeSet,
    pub selection_before: EditorSelection,
    pub selection_after: EditorSelection,
}

impl HistoryEntry {
    pub fn new(
        changes: ChangeSet,
        inverse: ChangeSet,
        selection_before: EditorSelection,
        selection_after: EditorSelection,
    ) -> Self {
        Self {
            changes,
            inverse,
            selection_before,
            selection_after,
        }
    }
}

/// Edit history with undo/redo stacks.
///
/// Entries move between the stacks unchanged; undo applies `inverse`, redo
/// applies `changes`.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_size: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Record an applied edit (clears redo stack)
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Take the latest edit to revert it (moves to redo stack)
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.clone());
        Some(entry)
    }

    /// Take the latest reverted edit to reapply it (moves to undo stack)
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.clone());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
