use tracing::debug;

use crate::kernel::Effect;
use crate::models::motion::first_non_blank;
use crate::models::{DocError, EntryKind, HistoryEntry, Pos, Selection};

use super::mode::Mode;
use super::state::{EditorState, Register};

/// Cursor and selection captured before an edit.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    cursor: Pos,
    selection: Option<Selection>,
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..end]
}

impl EditorState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cursor: self.cursor,
            selection: self.selection,
        }
    }

    /// Commits an edit result with the cursor/selection before it and the
    /// current ones after it. Rejected edits change nothing.
    fn record(&mut self, result: Result<HistoryEntry, DocError>, before: Snapshot) -> bool {
        match result {
            Ok(entry) => {
                let entry = entry
                    .with_cursors(before.cursor, self.cursor)
                    .with_selections(before.selection, self.selection);
                self.history.commit(entry);
                true
            }
            Err(err) => {
                debug!(%err, "edit rejected");
                self.cursor = before.cursor;
                self.selection = before.selection;
                false
            }
        }
    }

    fn active_range(&self) -> Option<(Pos, Pos)> {
        self.selection
            .filter(|s| s.active && !s.is_empty())
            .map(|s| s.range())
    }

    /// Rows touched by the selection, or the cursor row.
    fn target_rows(&self) -> Vec<usize> {
        match self.selection.filter(|s| s.active && !s.is_empty()) {
            Some(sel) => sel.rows().collect(),
            None => vec![self.cursor.row],
        }
    }

    pub(super) fn insert_char(&mut self, ch: char) -> bool {
        let before = self.snapshot();
        let pos = self.cursor;
        let result = self.doc.insert_rune(pos, ch);
        self.cursor = Pos::new(pos.row, pos.col + 1);
        self.selection = None;
        self.record(result, before)
    }

    pub(super) fn insert_text_at_cursor(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let before = self.snapshot();
        let pos = self.cursor;
        let result = self.doc.insert_text(pos, text);
        self.cursor = self.end_of_inserted(pos, text);
        self.selection = None;
        self.history.begin_boundary();
        let ok = self.record(result, before);
        self.history.begin_boundary();
        ok
    }

    fn end_of_inserted(&self, pos: Pos, text: &str) -> Pos {
        let newlines = text.matches('\n').count();
        let tail = text.rsplit('\n').next().unwrap_or_default().chars().count();
        if newlines == 0 {
            Pos::new(pos.row, pos.col + tail)
        } else {
            Pos::new(pos.row + newlines, tail)
        }
    }

    /// Bracketed paste: inserts at the cursor in insert mode, or after the
    /// cursor otherwise. Prompts take the text as typed input.
    pub(super) fn paste_text(&mut self, text: &str) -> (bool, Vec<Effect>) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        match self.mode {
            Mode::Command => {
                self.command_prompt.insert_str(&text);
                (true, Vec::new())
            }
            Mode::Search => {
                self.search_paste(&text);
                (true, Vec::new())
            }
            Mode::Picker => (false, Vec::new()),
            Mode::Insert | Mode::Normal | Mode::Select => {
                if let Some((start, end)) = self.active_range() {
                    self.delete_span(start, end);
                }
                (self.insert_text_at_cursor(&text), Vec::new())
            }
        }
    }

    fn delete_span(&mut self, start: Pos, end: Pos) -> bool {
        let before = self.snapshot();
        let text = self.doc.text_range(start, end);
        let result = self.doc.delete_range(start, end);
        if result.is_ok() {
            self.register = Some(Register { text, linewise: false });
        }
        self.cursor = start;
        self.selection = None;
        self.record(result, before)
    }

    /// `d`: deletes the selection, or the character under the cursor.
    pub(super) fn delete_selection(&mut self) -> bool {
        let deleted = match self.active_range() {
            Some((start, end)) => self.delete_span(start, end),
            None => {
                let pos = self.cursor;
                if pos.col >= self.doc.line_len(pos.row) {
                    return false;
                }
                self.delete_span(pos, Pos::new(pos.row, pos.col + 1))
            }
        };
        if self.mode == Mode::Select {
            self.set_mode(Mode::Normal);
        }
        deleted
    }

    /// `D`: deletes the cursor line (or every selected line) and stores it
    /// linewise.
    pub(super) fn delete_line(&mut self) -> bool {
        let rows = self.target_rows();
        let (first, last) = (rows[0], rows[rows.len() - 1]);
        let line_count = self.doc.line_count();

        let mut text = self.doc.lines()[first..=last].join("\n");
        text.push('\n');
        let (start, end) = if last + 1 < line_count {
            (Pos::new(first, 0), Pos::new(last + 1, 0))
        } else if first > 0 {
            (
                Pos::new(first - 1, self.doc.line_len(first - 1)),
                Pos::new(last, self.doc.line_len(last)),
            )
        } else {
            (Pos::new(0, 0), Pos::new(last, self.doc.line_len(last)))
        };

        let before = self.snapshot();
        let result = self.doc.delete_range(start, end);
        let row = first.min(self.doc.line_count() - 1);
        self.cursor = Pos::new(row, first_non_blank(&self.doc, row));
        self.selection = None;
        let ok = self.record(result, before);
        if ok {
            self.register = Some(Register { text, linewise: true });
            if self.mode == Mode::Select {
                self.set_mode(Mode::Normal);
            }
        }
        ok
    }

    pub(super) fn delete_forward(&mut self) -> bool {
        if let Some((start, end)) = self.active_range() {
            return self.delete_span(start, end);
        }
        let pos = self.cursor;
        let end = if pos.col < self.doc.line_len(pos.row) {
            Pos::new(pos.row, pos.col + 1)
        } else if pos.row + 1 < self.doc.line_count() {
            Pos::new(pos.row + 1, 0)
        } else {
            return false;
        };
        let before = self.snapshot();
        let result = self.doc.delete_range(pos, end);
        self.record(result, before)
    }

    /// Backspace. Crossing a line boundary is a structural edit and closes the
    /// open group.
    pub(super) fn delete_backward(&mut self) -> bool {
        if let Some((start, end)) = self.active_range() {
            return self.delete_span(start, end);
        }
        let pos = self.cursor;
        let start = if pos.col > 0 {
            Pos::new(pos.row, pos.col - 1)
        } else if pos.row > 0 {
            self.history.begin_boundary();
            Pos::new(pos.row - 1, self.doc.line_len(pos.row - 1))
        } else {
            return false;
        };
        let before = self.snapshot();
        let result = self.doc.delete_range(start, pos);
        self.cursor = start;
        self.record(result, before)
    }

    /// Enter. With auto-indent the new line copies the current line's leading
    /// whitespace.
    pub(super) fn insert_newline(&mut self) -> bool {
        let pos = self.cursor;
        let indent = if self.config.auto_indent {
            leading_whitespace(self.doc.line(pos.row).unwrap_or_default()).to_string()
        } else {
            String::new()
        };

        let before = self.snapshot();
        self.history.begin_boundary();
        let result = if indent.is_empty() {
            self.doc.split_line(pos)
        } else {
            self.doc.insert_text(pos, &format!("\n{indent}"))
        };
        self.cursor = Pos::new(pos.row + 1, indent.chars().count());
        self.selection = None;
        let ok = self.record(result, before);
        self.history.begin_boundary();
        ok
    }

    /// `o` / `O`: opens an indented line below or above and enters insert mode.
    pub(super) fn open_line(&mut self, below: bool) -> bool {
        let row = self.cursor.row;
        let indent = if self.config.auto_indent {
            leading_whitespace(self.doc.line(row).unwrap_or_default()).to_string()
        } else {
            String::new()
        };
        let width = indent.chars().count();

        let before = self.snapshot();
        let (result, cursor) = if below {
            let at = Pos::new(row, self.doc.line_len(row));
            (self.doc.insert_text(at, &format!("\n{indent}")), Pos::new(row + 1, width))
        } else {
            (self.doc.insert_text(Pos::new(row, 0), &format!("{indent}\n")), Pos::new(row, width))
        };
        self.cursor = cursor;
        self.selection = None;
        self.set_mode(Mode::Insert);
        self.record(result, before)
    }

    pub(super) fn join_lines(&mut self) -> bool {
        let row = match self.active_range() {
            Some((start, _)) => start.row,
            None => self.cursor.row,
        };
        let before = self.snapshot();
        let result = self.doc.join_lines(row);
        if let Ok(entry) = &result {
            self.cursor = entry.cursor_after;
        }
        self.selection = None;
        self.record(result, before)
    }

    /// Swaps the cursor line with its neighbour; the cursor follows the line.
    pub(super) fn move_line(&mut self, down: bool) -> bool {
        let row = self.cursor.row;
        let other = if down {
            if row + 1 >= self.doc.line_count() {
                return false;
            }
            row + 1
        } else {
            if row == 0 {
                return false;
            }
            row - 1
        };

        let before = self.snapshot();
        let result = self.doc.swap_lines(row, other);
        self.cursor = Pos::new(other, self.cursor.col);
        self.selection = None;
        self.record(result, before)
    }

    /// Tab. Indents the selected rows, keeping the selection, or the cursor
    /// line in any mode.
    pub(super) fn indent(&mut self) -> bool {
        let rows = self.target_rows();
        let before = self.snapshot();
        let result = self.doc.indent_range(&rows, "\t");
        let shift = |pos: Pos| {
            if rows.contains(&pos.row) && pos.col > 0 {
                Pos::new(pos.row, pos.col + 1)
            } else {
                pos
            }
        };
        self.cursor = shift(self.cursor);
        self.selection = self
            .selection
            .map(|s| Selection { anchor: shift(s.anchor), head: shift(s.head), ..s });
        self.history.begin_boundary();
        self.record(result, before)
    }

    pub(super) fn unindent(&mut self) -> bool {
        let rows = self.target_rows();
        let tabbed: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&row| self.doc.line(row).is_some_and(|l| l.starts_with('\t')))
            .collect();
        let before = self.snapshot();
        let result = self.doc.unindent_range(&rows, "\t");
        let shift = |pos: Pos| {
            if tabbed.contains(&pos.row) {
                Pos::new(pos.row, pos.col.saturating_sub(1))
            } else {
                pos
            }
        };
        self.cursor = shift(self.cursor);
        self.selection = self
            .selection
            .map(|s| Selection { anchor: shift(s.anchor), head: shift(s.head), ..s });
        self.history.begin_boundary();
        self.record(result, before)
    }

    /// `r<c>`: replaces the character under the cursor, or every character
    /// of the selection, as one undo step.
    pub(super) fn replace_chars(&mut self, ch: char) -> bool {
        let Some((start, end)) = self.active_range() else {
            let before = self.snapshot();
            let result = self.doc.replace_char(self.cursor, ch);
            self.history.begin_boundary();
            return self.record(result, before);
        };

        let text = self.doc.text_range(start, end);
        let replaced: String = text
            .chars()
            .map(|c| if c == '\n' { c } else { ch })
            .collect();
        let before = self.snapshot();
        self.history.begin_boundary();
        let deleted = self.doc.delete_range(start, end);
        let Ok(entry) = deleted else {
            return self.record(deleted, before);
        };
        let ok = match self.doc.insert_text(start, &replaced) {
            Ok(inserted) => match entry.clone().merged_with(inserted.clone()) {
                Some(mut merged) => {
                    merged.kind = EntryKind::ReplaceChar;
                    self.record(Ok(merged), before)
                }
                None => self.record(Ok(entry), before) && self.record(Ok(inserted), before),
            },
            Err(err) => {
                entry.revert(&mut self.doc);
                self.record(Err(err), before)
            }
        };
        self.history.begin_boundary();
        ok
    }

    pub(super) fn undo(&mut self) -> bool {
        let Some(restored) = self.history.undo(&mut self.doc) else {
            self.set_status("already at oldest change".to_string());
            return false;
        };
        self.cursor = self.doc.clamp(restored.cursor);
        self.selection = restored.selection;
        self.goal_col = None;
        true
    }

    pub(super) fn redo(&mut self) -> bool {
        let Some(restored) = self.history.redo(&mut self.doc) else {
            self.set_status("already at newest change".to_string());
            return false;
        };
        self.cursor = self.doc.clamp(restored.cursor);
        self.selection = restored.selection;
        self.goal_col = None;
        true
    }

    /// `y`: copies the selection, or the cursor line linewise.
    pub(super) fn yank(&mut self) -> bool {
        let register = match self.active_range() {
            Some((start, end)) => Register {
                text: self.doc.text_range(start, end),
                linewise: false,
            },
            None => Register {
                text: format!("{}\n", self.doc.line(self.cursor.row).unwrap_or_default()),
                linewise: true,
            },
        };
        let count = register.text.chars().count();
        self.register = Some(register);
        self.set_status(format!("yanked {count} chars"));
        true
    }

    /// `p` / `P`: linewise text goes on its own line below or above the cursor
    /// line; other text after or at the cursor.
    pub(super) fn paste(&mut self, after: bool) -> bool {
        let Some(register) = self.register.clone() else {
            self.set_error("register is empty".to_string());
            return false;
        };

        let before = self.snapshot();
        self.history.begin_boundary();
        let row = self.cursor.row;
        let (result, cursor) = if register.linewise {
            let body = register.text.strip_suffix('\n').unwrap_or(&register.text);
            if after {
                let at = Pos::new(row, self.doc.line_len(row));
                (self.doc.insert_text(at, &format!("\n{body}")), Pos::new(row + 1, 0))
            } else {
                (self.doc.insert_text(Pos::new(row, 0), &format!("{body}\n")), Pos::new(row, 0))
            }
        } else {
            let at = match (after, self.active_range()) {
                (true, Some((_, end))) => end,
                (false, Some((start, _))) => start,
                (true, None) => Pos::new(row, (self.cursor.col + 1).min(self.doc.line_len(row))),
                (false, None) => self.cursor,
            };
            let end = self.end_of_inserted(at, &register.text);
            (self.doc.insert_text(at, &register.text), end)
        };
        self.cursor = cursor;
        self.selection = None;
        let ok = self.record(result, before);
        self.history.begin_boundary();
        ok
    }

    pub(super) fn request_format(&mut self) -> (bool, Vec<Effect>) {
        let Some(language) = self.language.clone() else {
            self.set_error("no formatter for this file".to_string());
            return (true, Vec::new());
        };
        (
            true,
            vec![Effect::Format {
                language,
                text: self.doc.text(),
                tick: self.doc.change_tick(),
            }],
        )
    }

    /// Delivers formatter output for the document as it was at `tick`.
    pub fn formatted(&mut self, tick: u64, result: Result<String, String>) -> bool {
        let text = match result {
            Ok(text) => text,
            Err(err) => {
                self.set_error(err);
                return true;
            }
        };
        if tick != self.doc.change_tick() {
            self.set_error("buffer changed while formatting".to_string());
            return true;
        }
        if normalize_line_endings(&text) != normalize_line_endings(&self.doc.text()) {
            let before = self.snapshot();
            self.history.begin_boundary();
            let entry = self.doc.apply_formatted(&text);
            self.cursor = self.doc.clamp(self.cursor);
            self.selection = None;
            self.record(Ok(entry), before);
            self.history.begin_boundary();
        }
        self.set_status("formatted".to_string());
        true
    }
}

fn normalize_line_endings(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains('\r') {
        std::borrow::Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/edit.rs"]
mod tests;
