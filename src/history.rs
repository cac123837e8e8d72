//! Linear undo/redo log with a cursor. Committing while the cursor is not at
//! the tail prunes the redo branch; there is no history tree.

use std::sync::Arc;

use thiserror::Error;

use crate::buffer::PixelBuffer;

pub type ImageHistory = HistoryStack<Arc<PixelBuffer>>;

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl HistoryAction {
    pub const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "No more undo's available",
            Self::Redo => "No more redo's available",
        }
    }

    pub const fn failure_title(self) -> &'static str {
        match self {
            Self::Undo => "Cannot undo",
            Self::Redo => "Cannot redo",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to {action}")]
    NoHistory { action: HistoryAction },
}

#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryStack<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Drops every entry and seeds the log with `original` at index 0.
    pub fn reset(&mut self, original: T) {
        self.entries.clear();
        self.entries.push(original);
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Truncates anything after the cursor, appends `entry` and moves the
    /// cursor onto it. On an empty log the entry becomes the original.
    pub fn commit(&mut self, entry: T) {
        if self.entries.is_empty() {
            self.reset(entry);
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> HistoryResult<&T> {
        if !self.can_undo() {
            return Err(HistoryError::NoHistory {
                action: HistoryAction::Undo,
            });
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor])
    }

    pub fn redo(&mut self) -> HistoryResult<&T> {
        if !self.can_redo() {
            return Err(HistoryError::NoHistory {
                action: HistoryAction::Redo,
            });
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor])
    }

    pub fn step(&mut self, action: HistoryAction) -> HistoryResult<&T> {
        match action {
            HistoryAction::Undo => self.undo(),
            HistoryAction::Redo => self.redo(),
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn original(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
