//! # Undo/Redo Stack
//!
//! Keeps earlier committed documents. Documents share structure, so each
//! entry costs only the nodes its edit touched.
//!
//! - Committing a changed tree pushes the previous document and clears redo
//! - Undo swaps the current document for the most recent entry
//! - Redo reverses an undo
//! - Cursor-only moves are not recorded

use crate::Document;

/// Undo/redo stack for one session
#[derive(Debug)]
pub struct UndoStack {
    /// Earlier documents (most recent last)
    undo_stack: Vec<Document>,

    /// Undone documents (most recent last)
    redo_stack: Vec<Document>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Remember `previous` as the state before a new edit
    pub fn record(&mut self, previous: Document) {
        self.undo_stack.push(previous);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // a new edit invalidates the undone future
        self.redo_stack.clear();
    }

    /// Step back; `current` moves onto the redo stack
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Step forward again; `current` moves back onto the undo stack
    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
