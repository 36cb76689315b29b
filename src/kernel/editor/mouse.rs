use crate::core::event::{MouseButton, MouseEvent, MouseEventKind};
use crate::kernel::Effect;
use crate::models::motion::col_for_visual;
use crate::models::{Pos, Selection};

use super::mode::Mode;
use super::state::EditorState;

impl EditorState {
    /// Maps a screen cell to a document position. Cells in the gutter map to
    /// column 0; cells below the text map to the last line.
    pub fn screen_to_pos(&self, column: u16, row: u16) -> Option<Pos> {
        let row = row as usize;
        if row >= self.viewport.height {
            return None;
        }
        let doc_row = (self.viewport.top + row).min(self.doc.line_count() - 1);
        let vcol = (column as usize)
            .checked_sub(self.gutter_width())
            .map_or(0, |c| c + self.viewport.left);
        let line = self.doc.line(doc_row).unwrap_or_default();
        Some(Pos::new(doc_row, col_for_visual(line, vcol, self.config.tab_width)))
    }

    pub(super) fn handle_mouse(&mut self, event: MouseEvent) -> (bool, Vec<Effect>) {
        if matches!(self.mode, Mode::Command | Mode::Search | Mode::Picker) {
            return (false, Vec::new());
        }

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(pos) = self.screen_to_pos(event.column, event.row) else {
                    return (false, Vec::new());
                };
                self.chord = None;
                self.history.begin_boundary();
                self.cursor = pos;
                self.goal_col = None;
                self.selection = None;
                self.drag_anchor = Some(pos);
                if self.mode == Mode::Select {
                    self.set_mode(Mode::Normal);
                }
                (true, Vec::new())
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (Some(anchor), Some(pos)) =
                    (self.drag_anchor, self.screen_to_pos(event.column, event.row))
                else {
                    return (false, Vec::new());
                };
                self.cursor = pos;
                self.goal_col = None;
                self.selection = Some(Selection::new(anchor, pos));
                (true, Vec::new())
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_anchor = None;
                if self.selection.is_some_and(|s| s.is_empty()) {
                    self.selection = None;
                }
                (false, Vec::new())
            }
            MouseEventKind::ScrollUp => {
                let lines = self.config.scroll_lines as isize;
                (self.scroll_view(-lines), Vec::new())
            }
            MouseEventKind::ScrollDown => {
                let lines = self.config.scroll_lines as isize;
                (self.scroll_view(lines), Vec::new())
            }
            _ => (false, Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/mouse.rs"]
mod tests;
