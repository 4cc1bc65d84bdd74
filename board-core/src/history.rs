//! Snapshot history with branch-pruning undo/redo.
//!
//! Entries are raw raster captures in chronological commit order. The cursor
//! marks the displayed state; `None` means the surface shows nothing (fresh
//! session, or undone past the first entry). Committing while the cursor is
//! behind the end discards the redo branch, the standard "new edit invalidates
//! the redo future" rule.

use crate::snapshot::Snapshot;

/// What the surface should show after an undo.
#[derive(Debug, PartialEq, Eq)]
pub enum UndoStep<'a> {
    /// Repaint from this earlier entry.
    Repaint(&'a Snapshot),
    /// Undone past the first entry: blank the surface. The entry itself is
    /// kept so a redo can bring it back.
    Blank,
    /// Nothing to undo.
    Noop,
}

/// Navigable timeline of committed surface states.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the currently displayed entry, `None` when the surface shows
    /// no committed state.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The currently displayed entry, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.map(|c| &self.entries[c])
    }

    /// Whether an undo would change the displayed state.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    /// Whether a redo would change the displayed state.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        match self.cursor {
            None => !self.entries.is_empty(),
            Some(c) => c + 1 < self.entries.len(),
        }
    }

    /// Append a completed operation's snapshot, discarding any redo branch.
    pub fn commit(&mut self, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step the cursor back one entry.
    pub fn undo(&mut self) -> UndoStep<'_> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                UndoStep::Repaint(&self.entries[c - 1])
            }
            Some(_) => {
                self.cursor = None;
                UndoStep::Blank
            }
            None => UndoStep::Noop,
        }
    }

    /// Step the cursor forward one entry, returning what to repaint.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = match self.cursor {
            None if !self.entries.is_empty() => 0,
            Some(c) if c + 1 < self.entries.len() => c + 1,
            _ => return None,
        };
        self.cursor = Some(next);
        Some(&self.entries[next])
    }
}
