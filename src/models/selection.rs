use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::document::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub active: bool,
    pub anchor: Pos,
    pub head: Pos,
}

impl Selection {
    pub fn new(anchor: Pos, head: Pos) -> Self {
        Self {
            active: true,
            anchor,
            head,
        }
    }

    pub fn caret(pos: Pos) -> Self {
        Self::new(pos, pos)
    }

    /// `(start, end)` in document order.
    pub fn range(&self) -> (Pos, Pos) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn contains(&self, pos: Pos) -> bool {
        let (start, end) = self.range();
        self.active && start <= pos && pos < end
    }

    /// Rows an indent/unindent applies to. A selection ending at column 0 of a
    /// later row does not touch that row.
    pub fn rows(&self) -> RangeInclusive<usize> {
        let (start, end) = self.range();
        let last = if end.col == 0 && end.row > start.row {
            end.row - 1
        } else {
            end.row
        };
        start.row..=last
    }

    /// The `[start, end)` columns of `row` covered by the selection.
    pub fn range_for_line(&self, row: usize, line_len: usize) -> Option<(usize, usize)> {
        if !self.active {
            return None;
        }
        let (start, end) = self.range();
        if row < start.row || row > end.row {
            return None;
        }

        let from = if row == start.row { start.col } else { 0 };
        let to = if row == end.row { end.col } else { line_len };
        let to = to.min(line_len);
        (from < to).then_some((from, to))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/selection.rs"]
mod tests;
