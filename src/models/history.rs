//! Undo/redo over coarse edit groups.
//!
//! Every entry stores the rows it replaced and the rows it produced, so
//! reverting and re-applying are exact regardless of the edit kind.

use compact_str::CompactString;
use std::time::{Duration, Instant};

use super::document::{Document, Pos};
use super::selection::Selection;

pub const DEFAULT_IDLE_BOUNDARY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    InsertRune,
    InsertText,
    DeleteRange,
    SplitLine,
    JoinLines,
    SwapLines,
    IndentRange,
    UnindentRange,
    ReplaceChar,
    ApplyFormatted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: EntryKind,
    pub start_row: usize,
    /// Rows `start_row..start_row + before.len()` prior to the edit.
    pub before: Vec<CompactString>,
    /// Rows `start_row..start_row + after.len()` after the edit.
    pub after: Vec<CompactString>,
    pub cursor_before: Pos,
    pub cursor_after: Pos,
    pub selection_before: Option<Selection>,
    pub selection_after: Option<Selection>,
}

impl HistoryEntry {
    pub fn new(
        kind: EntryKind,
        start_row: usize,
        before: Vec<CompactString>,
        after: Vec<CompactString>,
    ) -> Self {
        let origin = Pos::new(start_row, 0);
        Self {
            kind,
            start_row,
            before,
            after,
            cursor_before: origin,
            cursor_after: origin,
            selection_before: None,
            selection_after: None,
        }
    }

    pub fn with_cursors(mut self, before: Pos, after: Pos) -> Self {
        self.cursor_before = before;
        self.cursor_after = after;
        self
    }

    pub fn with_selections(mut self, before: Option<Selection>, after: Option<Selection>) -> Self {
        self.selection_before = before;
        self.selection_after = after;
        self
    }

    pub fn revert(&self, doc: &mut Document) {
        doc.replace_rows(self.start_row, self.after.len(), to_lines(&self.before));
    }

    pub fn reapply(&self, doc: &mut Document) {
        doc.replace_rows(self.start_row, self.before.len(), to_lines(&self.after));
    }

    /// Folds `next`, applied right after `self`, into one entry. Returns
    /// `None` when `next` touches rows `self` did not produce.
    pub fn merged_with(mut self, next: HistoryEntry) -> Option<Self> {
        let offset = next.start_row.checked_sub(self.start_row)?;
        let end = offset + next.before.len();
        if end > self.after.len() || self.after[offset..end] != next.before[..] {
            return None;
        }
        self.after.splice(offset..end, next.after);
        self.cursor_after = next.cursor_after;
        self.selection_after = next.selection_after;
        Some(self)
    }

    fn extends(&self, next: &HistoryEntry) -> bool {
        self.kind == EntryKind::InsertRune
            && next.kind == EntryKind::InsertRune
            && self.start_row == next.start_row
            && self.after.len() == 1
            && next.before.len() == 1
            && self.after[0] == next.before[0]
            && next.cursor_before == self.cursor_after
            && next.cursor_after.row == next.cursor_before.row
            && next.cursor_after.col == next.cursor_before.col + 1
    }

    fn absorb(&mut self, next: HistoryEntry) {
        self.after = next.after;
        self.cursor_after = next.cursor_after;
        self.selection_after = next.selection_after;
    }
}

fn to_lines(lines: &[CompactString]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}

/// What undo/redo restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restored {
    pub cursor: Pos,
    pub selection: Option<Selection>,
}

#[derive(Debug)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    group_open: bool,
    last_commit: Option<Instant>,
    idle_boundary: Duration,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_IDLE_BOUNDARY_MS))
    }
}

impl History {
    pub fn new(idle_boundary: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group_open: false,
            last_commit: None,
            idle_boundary,
        }
    }

    pub fn set_idle_boundary(&mut self, idle_boundary: Duration) {
        self.idle_boundary = idle_boundary;
    }

    pub fn commit(&mut self, entry: HistoryEntry) {
        self.commit_at(entry, Instant::now());
    }

    pub fn commit_at(&mut self, entry: HistoryEntry, now: Instant) {
        self.redo_stack.clear();
        let keeps_group_open = entry.kind == EntryKind::InsertRune;

        match self.undo_stack.last_mut() {
            Some(top) if self.group_open && top.extends(&entry) => top.absorb(entry),
            _ => self.undo_stack.push(entry),
        }

        self.group_open = keeps_group_open;
        self.last_commit = Some(now);
    }

    /// Forces the next commit to start a new group.
    pub fn begin_boundary(&mut self) {
        self.group_open = false;
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Closes the open group once no edit has been committed for the idle
    /// boundary.
    pub fn tick(&mut self, now: Instant) {
        if !self.group_open {
            return;
        }
        if self
            .last_commit
            .is_some_and(|at| now.saturating_duration_since(at) >= self.idle_boundary)
        {
            self.group_open = false;
        }
    }

    pub fn undo(&mut self, doc: &mut Document) -> Option<Restored> {
        let entry = self.undo_stack.pop()?;
        self.group_open = false;
        entry.revert(doc);
        let restored = Restored {
            cursor: entry.cursor_before,
            selection: entry.selection_before,
        };
        self.redo_stack.push(entry);
        Some(restored)
    }

    pub fn redo(&mut self, doc: &mut Document) -> Option<Restored> {
        let entry = self.redo_stack.pop()?;
        self.group_open = false;
        entry.reapply(doc);
        let restored = Restored {
            cursor: entry.cursor_after,
            selection: entry.selection_after,
        };
        self.undo_stack.push(entry);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_group_open(&self) -> bool {
        self.group_open
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/history.rs"]
mod tests;
