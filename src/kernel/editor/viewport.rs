use crate::kernel::services::ports::LineNumberMode;
use crate::models::motion::visual_col;
use crate::models::Pos;

use super::state::EditorState;

/// Rows reserved below the text area for the status and prompt lines.
pub const CHROME_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Top,
    Center,
    Bottom,
}

/// The visible window onto the document, in document rows and visual columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
    pub left: usize,
    pub width: usize,
    pub height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            width: 80,
            height: 22,
        }
    }
}

impl Viewport {
    pub fn bottom(&self, line_count: usize) -> usize {
        (self.top + self.height.max(1) - 1).min(line_count.saturating_sub(1))
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.top && row < self.top + self.height.max(1)
    }

    /// Scrolls the minimum amount that brings `(row, vcol)` into view.
    pub fn follow(&mut self, row: usize, vcol: usize) {
        let height = self.height.max(1);
        if row < self.top {
            self.top = row;
        } else if row >= self.top + height {
            self.top = row + 1 - height;
        }

        let width = self.width.max(1);
        if vcol < self.left {
            self.left = vcol;
        } else if vcol >= self.left + width {
            self.left = vcol + 1 - width;
        }
    }

    pub fn align(&mut self, row: usize, align: Align) {
        let height = self.height.max(1);
        self.top = match align {
            Align::Top => row,
            Align::Center => row.saturating_sub(height / 2),
            Align::Bottom => row.saturating_sub(height - 1),
        };
    }

    /// Moves the top row by `delta`, keeping at least the last line visible.
    pub fn scroll_by(&mut self, delta: isize, line_count: usize) -> bool {
        let max_top = line_count.saturating_sub(1);
        let top = self.top.saturating_add_signed(delta).min(max_top);
        let changed = top != self.top;
        self.top = top;
        changed
    }
}

/// Width of the line-number gutter, including its trailing space.
pub fn gutter_width(line_count: usize, mode: LineNumberMode) -> usize {
    match mode {
        LineNumberMode::Off => 0,
        LineNumberMode::Abs | LineNumberMode::Rel => {
            let digits = line_count.max(1).to_string().len();
            digits.max(3) + 1
        }
    }
}

impl EditorState {
    /// Applies a terminal size.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        self.screen = (width, height);
        self.layout_viewport();
        self.follow_cursor();
        true
    }

    pub fn gutter_width(&self) -> usize {
        gutter_width(self.doc.line_count(), self.config.line_numbers)
    }

    pub(super) fn layout_viewport(&mut self) {
        let (width, height) = self.screen;
        self.viewport.width = (width as usize).saturating_sub(self.gutter_width()).max(1);
        self.viewport.height = (height as usize).saturating_sub(CHROME_ROWS).max(1);
    }

    pub(super) fn cursor_visual_col(&self) -> usize {
        let line = self.doc.line(self.cursor.row).unwrap_or_default();
        visual_col(line, self.cursor.col, self.config.tab_width)
    }

    pub(super) fn follow_cursor(&mut self) {
        let vcol = self.cursor_visual_col();
        self.viewport.follow(self.cursor.row, vcol);
    }

    pub(super) fn align_view(&mut self, align: Align) -> bool {
        let before = self.viewport;
        self.viewport.align(self.cursor.row, align);
        before != self.viewport
    }

    /// Scrolls the view and drags the cursor along when it would leave it.
    pub(super) fn scroll_view(&mut self, delta: isize) -> bool {
        if !self.viewport.scroll_by(delta, self.doc.line_count()) {
            return false;
        }
        let top = self.viewport.top;
        let bottom = self.viewport.bottom(self.doc.line_count());
        let row = self.cursor.row.clamp(top, bottom);
        if row != self.cursor.row {
            self.cursor = self.doc.clamp(Pos::new(row, self.cursor.col));
        }
        true
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/viewport.rs"]
mod tests;
