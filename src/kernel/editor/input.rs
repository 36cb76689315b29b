use tracing::debug;

use crate::core::event::{InputEvent, KeyEvent};
use crate::kernel::effect::{Location, LocationKind};
use crate::kernel::keymap::key_string;
use crate::kernel::Effect;
use crate::models::motion::{
    col_for_visual, first_non_blank, matching_bracket, move_word_end, move_word_left,
    move_word_right, visual_col,
};
use crate::models::{Pos, Selection};

use super::action::Action;
use super::chord::Chord;
use super::mode::Mode;
use super::picker::Picker;
use super::state::EditorState;
use super::viewport::Align;

impl EditorState {
    pub fn handle_input(&mut self, event: InputEvent) -> (bool, Vec<Effect>) {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => {
                let (changed, mut effects) = self.handle_mouse(mouse);
                self.after_input(&mut effects);
                (changed, effects)
            }
            InputEvent::Resize(width, height) => (self.resize(width, height), Vec::new()),
            InputEvent::Paste(text) => {
                let (changed, mut effects) = self.paste_text(&text);
                self.after_input(&mut effects);
                (changed, effects)
            }
            InputEvent::FocusGained | InputEvent::FocusLost => (false, Vec::new()),
        }
    }

    /// Routes one key through the pending chord or the current mode.
    pub fn handle_key(&mut self, key: KeyEvent) -> (bool, Vec<Effect>) {
        if !key.is_press() {
            return (false, Vec::new());
        }
        let had_status = self.status.take().is_some();

        let (changed, mut effects) = match self.chord.take() {
            Some(chord) => self.chord_key(chord, &key),
            None => match self.mode {
                Mode::Command => self.command_key(&key),
                Mode::Search => self.search_key(&key),
                Mode::Picker => self.picker_key(&key),
                Mode::Insert => self.insert_key(&key),
                Mode::Normal | Mode::Select => self.normal_key(&key),
            },
        };

        self.after_input(&mut effects);
        (changed || had_status, effects)
    }

    fn normal_key(&mut self, key: &KeyEvent) -> (bool, Vec<Effect>) {
        let Some(name) = key_string(key) else {
            return (false, Vec::new());
        };
        match self.normal_keymap.resolve(&name).and_then(Action::from_name) {
            Some(action) => self.run_action(action),
            None => {
                debug!(key = %name, "unbound key");
                (false, Vec::new())
            }
        }
    }

    fn insert_key(&mut self, key: &KeyEvent) -> (bool, Vec<Effect>) {
        let action = key_string(key)
            .and_then(|name| self.insert_keymap.resolve(&name).and_then(Action::from_name));
        if let Some(action) = action {
            return self.run_action(action);
        }
        match key.text() {
            Some(ch) => (self.insert_char(ch), Vec::new()),
            None => (false, Vec::new()),
        }
    }

    /// Clamps the cursor, keeps it in view and reports document changes to the
    /// language server.
    pub(super) fn after_input(&mut self, effects: &mut Vec<Effect>) {
        self.cursor = self.doc.clamp(self.cursor);
        self.follow_cursor();

        let tick = self.doc.change_tick();
        if !self.lsp_enabled || self.lsp_tick == Some(tick) {
            return;
        }
        if let (Some(path), Some(language)) = (&self.path, &self.language) {
            effects.push(Effect::LspDidChange {
                path: path.clone(),
                language: language.clone(),
                text: self.doc.text(),
            });
            self.lsp_tick = Some(tick);
        }
    }

    pub fn run_action(&mut self, action: Action) -> (bool, Vec<Effect>) {
        if action.is_motion() {
            return (self.run_motion(action), Vec::new());
        }

        match action {
            // modes
            Action::NormalMode => (self.enter_normal(), Vec::new()),
            Action::InsertMode => {
                let at = self.selection.map_or(self.cursor, |s| s.range().0);
                (self.enter_insert(at), Vec::new())
            }
            Action::AppendMode => {
                let at = match self.selection {
                    Some(sel) if !sel.is_empty() => sel.range().1,
                    _ => Pos::new(self.cursor.row, self.cursor.col + 1),
                };
                (self.enter_insert(self.doc.clamp(at)), Vec::new())
            }
            Action::InsertLineStart => {
                let row = self.cursor.row;
                (self.enter_insert(Pos::new(row, first_non_blank(&self.doc, row))), Vec::new())
            }
            Action::AppendLineEnd => {
                let row = self.cursor.row;
                (self.enter_insert(Pos::new(row, self.doc.line_len(row))), Vec::new())
            }
            Action::OpenBelow => (self.open_line(true), Vec::new()),
            Action::OpenAbove => (self.open_line(false), Vec::new()),
            Action::SelectMode => (self.toggle_select(), Vec::new()),
            Action::CommandMode => {
                self.set_mode(Mode::Command);
                self.command_prompt.open();
                (true, Vec::new())
            }
            Action::SearchForward => self.begin_search(false),
            Action::SearchBackward => self.begin_search(true),
            Action::SearchNext => self.search_next(false),
            Action::SearchPrev => self.search_next(true),
            Action::BranchPicker => (
                true,
                vec![Effect::ListBranches {
                    root: self.repo_root.clone(),
                }],
            ),

            // selection
            Action::SelectLine => (self.select_line(), Vec::new()),
            Action::SelectAll => {
                self.set_selection(Selection::new(Pos::new(0, 0), self.doc.end_pos()));
                (true, Vec::new())
            }
            Action::CollapseSelection => (self.collapse_selection(), Vec::new()),
            Action::ExpandSelection => (self.expand_selection(), Vec::new()),
            Action::ShrinkSelection => (self.shrink_selection(), Vec::new()),

            // edits
            Action::DeleteSelection => (self.delete_selection(), Vec::new()),
            Action::ChangeSelection => {
                self.delete_selection();
                (self.enter_insert(self.cursor), Vec::new())
            }
            Action::DeleteLine => (self.delete_line(), Vec::new()),
            Action::DeleteChar | Action::DeleteForward => (self.delete_forward(), Vec::new()),
            Action::DeleteBackward => (self.delete_backward(), Vec::new()),
            Action::InsertNewline => (self.insert_newline(), Vec::new()),
            Action::JoinLines => (self.join_lines(), Vec::new()),
            Action::MoveLineUp => (self.move_line(false), Vec::new()),
            Action::MoveLineDown => (self.move_line(true), Vec::new()),
            Action::Indent => (self.indent(), Vec::new()),
            Action::Unindent => (self.unindent(), Vec::new()),
            Action::Undo => (self.undo(), Vec::new()),
            Action::Redo => (self.redo(), Vec::new()),
            Action::Yank => (self.yank(), Vec::new()),
            Action::PasteAfter => (self.paste(true), Vec::new()),
            Action::PasteBefore => (self.paste(false), Vec::new()),
            Action::Format => self.request_format(),

            // chords
            Action::GotoMode => self.begin_chord(Chord::Goto),
            Action::MatchMode => self.begin_chord(Chord::Match),
            Action::ViewMode => self.begin_chord(Chord::View),
            Action::SpaceMode => self.begin_chord(Chord::Space),
            Action::FindChar => self.begin_chord(Chord::FindChar {
                forward: true,
                till: false,
            }),
            Action::FindCharBackward => self.begin_chord(Chord::FindChar {
                forward: false,
                till: false,
            }),
            Action::TillChar => self.begin_chord(Chord::FindChar {
                forward: true,
                till: true,
            }),
            Action::TillCharBackward => self.begin_chord(Chord::FindChar {
                forward: false,
                till: true,
            }),
            Action::Replace => self.begin_chord(Chord::Replace),

            // view
            Action::AlignCenter => (self.align_view(Align::Center), Vec::new()),
            Action::AlignTop => (self.align_view(Align::Top), Vec::new()),
            Action::AlignBottom => (self.align_view(Align::Bottom), Vec::new()),
            Action::ScrollDown => (self.scroll_view(self.config.scroll_lines as isize), Vec::new()),
            Action::ScrollUp => (self.scroll_view(-(self.config.scroll_lines as isize)), Vec::new()),

            // language server
            Action::GotoDefinition => self.location_query(LocationKind::Definition),
            Action::GotoDeclaration => self.location_query(LocationKind::Declaration),
            Action::GotoTypeDefinition => self.location_query(LocationKind::TypeDefinition),
            Action::GotoImplementation => self.location_query(LocationKind::Implementation),
            Action::GotoReferences => self.location_query(LocationKind::References),

            // app
            Action::Save => self.execute_command("w"),
            Action::Quit => self.execute_command("q"),

            // motions are handled above
            _ => (false, Vec::new()),
        }
    }

    // ==================== motions ====================

    fn run_motion(&mut self, action: Action) -> bool {
        let from = self.cursor;
        let page = self.viewport.height.max(1);
        let half = (page / 2).max(1);

        let target = match action {
            Action::MoveLeft => Pos::new(from.row, from.col.saturating_sub(1)),
            Action::MoveRight => Pos::new(from.row, (from.col + 1).min(self.doc.line_len(from.row))),
            Action::MoveUp => return self.move_vertical(-1),
            Action::MoveDown => return self.move_vertical(1),
            Action::PageUp => {
                self.viewport.scroll_by(-(page as isize), self.doc.line_count());
                return self.move_vertical(-(page as isize));
            }
            Action::PageDown => {
                self.viewport.scroll_by(page as isize, self.doc.line_count());
                return self.move_vertical(page as isize);
            }
            Action::HalfPageUp => {
                self.viewport.scroll_by(-(half as isize), self.doc.line_count());
                return self.move_vertical(-(half as isize));
            }
            Action::HalfPageDown => {
                self.viewport.scroll_by(half as isize, self.doc.line_count());
                return self.move_vertical(half as isize);
            }
            Action::MoveWordLeft | Action::WordBackward => move_word_left(&self.doc, from),
            Action::MoveWordRight | Action::WordForward => move_word_right(&self.doc, from),
            Action::WordEnd => move_word_end(&self.doc, from),
            Action::LineStart => Pos::new(from.row, 0),
            Action::LineEnd => Pos::new(from.row, self.doc.line_len(from.row)),
            Action::FirstNonBlank => Pos::new(from.row, first_non_blank(&self.doc, from.row)),
            Action::FileStart => Pos::new(0, 0),
            Action::FileEnd => self.doc.end_pos(),
            Action::MatchBracket => match matching_bracket(&self.doc, from) {
                Some(pos) => pos,
                None => return false,
            },
            _ => return false,
        };

        let selects_word = matches!(
            action,
            Action::WordForward | Action::WordBackward | Action::WordEnd
        );
        self.move_cursor(target, selects_word)
    }

    /// Moves the cursor to `target`. Select mode extends the selection; in
    /// normal mode a word motion selects the span it crossed and any other
    /// motion drops the selection.
    pub(super) fn move_cursor(&mut self, target: Pos, select_span: bool) -> bool {
        let from = self.cursor;
        let target = self.doc.clamp(target);
        self.goal_col = None;

        match self.mode {
            Mode::Select => {
                let anchor = self.selection.map_or(from, |s| s.anchor);
                self.selection = Some(Selection::new(anchor, target));
            }
            Mode::Normal if select_span && target != from => {
                self.history.begin_boundary();
                self.selection = Some(Selection::new(from, target));
            }
            _ => {
                if self.selection.take().is_some() {
                    self.history.begin_boundary();
                }
            }
        }

        self.cursor = target;
        true
    }

    fn move_vertical(&mut self, delta: isize) -> bool {
        let from = self.cursor;
        let last = self.doc.line_count() - 1;
        let row = from.row.saturating_add_signed(delta).min(last);
        if row == from.row {
            return false;
        }

        let tab = self.config.tab_width;
        let goal = self.goal_col.unwrap_or_else(|| {
            visual_col(self.doc.line(from.row).unwrap_or_default(), from.col, tab)
        });
        let col = col_for_visual(self.doc.line(row).unwrap_or_default(), goal, tab);
        self.move_cursor(Pos::new(row, col), false);
        self.goal_col = Some(goal);
        true
    }

    // ==================== modes ====================

    fn enter_normal(&mut self) -> bool {
        match self.mode {
            Mode::Select => {
                self.selection = None;
                self.set_mode(Mode::Normal);
            }
            Mode::Normal => {
                if self.selection.take().is_none() {
                    return false;
                }
                self.history.begin_boundary();
            }
            _ => self.set_mode(Mode::Normal),
        }
        true
    }

    pub(super) fn enter_insert(&mut self, at: Pos) -> bool {
        self.cursor = self.doc.clamp(at);
        self.goal_col = None;
        self.selection = None;
        self.set_mode(Mode::Insert);
        true
    }

    fn toggle_select(&mut self) -> bool {
        if self.mode == Mode::Select {
            self.set_mode(Mode::Normal);
            return true;
        }
        if self.selection.is_none() {
            self.selection = Some(Selection::caret(self.cursor));
        }
        self.set_mode(Mode::Select);
        true
    }

    // ==================== selection ====================

    pub(super) fn set_selection(&mut self, selection: Selection) {
        self.history.begin_boundary();
        self.cursor = self.doc.clamp(selection.head);
        self.selection = Some(selection);
        self.goal_col = None;
    }

    fn collapse_selection(&mut self) -> bool {
        if self.selection.take().is_none() {
            return false;
        }
        self.history.begin_boundary();
        if self.mode == Mode::Select {
            self.set_mode(Mode::Normal);
        }
        true
    }

    /// `x`: selects the cursor line, or extends a line selection by one line.
    fn select_line(&mut self) -> bool {
        let last = self.doc.line_count() - 1;
        let line_end = |row: usize| {
            if row < last {
                Pos::new(row + 1, 0)
            } else {
                Pos::new(row, self.doc.line_len(row))
            }
        };

        let (start_row, end) = match self.selection {
            Some(sel) if !sel.is_empty() => {
                let (start, end) = sel.range();
                let whole = start.col == 0 && (end.col == 0 || end == self.doc.end_pos());
                if whole {
                    let next = if end.col == 0 { end.row } else { end.row + 1 };
                    (start.row, line_end(next.min(last)))
                } else {
                    (start.row, line_end(end.row))
                }
            }
            _ => (self.cursor.row, line_end(self.cursor.row)),
        };
        self.set_selection(Selection::new(Pos::new(start_row, 0), end));
        true
    }

    fn current_range(&self) -> (Pos, Pos) {
        self.selection
            .filter(|s| s.active)
            .map_or((self.cursor, self.cursor), |s| s.range())
    }

    /// Grows the selection to the smallest syntax node strictly containing it.
    fn expand_selection(&mut self) -> bool {
        let (start, end) = self.current_range();
        let ranges = self.highlighter.node_ranges_at(&mut self.doc, start);
        let Some(node) = ranges
            .into_iter()
            .find(|r| r.start <= start && r.end >= end && (r.start, r.end) != (start, end))
        else {
            return false;
        };
        self.set_selection(Selection::new(node.start, node.end));
        true
    }

    /// Narrows the selection to the largest syntax node strictly inside it.
    fn shrink_selection(&mut self) -> bool {
        let (start, end) = self.current_range();
        if start == end {
            return false;
        }
        let ranges = self.highlighter.node_ranges_at(&mut self.doc, start);
        let Some(node) = ranges
            .into_iter()
            .rev()
            .find(|r| r.start >= start && r.end <= end && (r.start, r.end) != (start, end) && r.start != r.end)
        else {
            return false;
        };
        self.set_selection(Selection::new(node.start, node.end));
        true
    }

    // ==================== language server ====================

    pub(super) fn location_query(&mut self, kind: LocationKind) -> (bool, Vec<Effect>) {
        let (Some(path), Some(language)) = (self.path.clone(), self.language.clone()) else {
            self.set_error("no language server for this file".to_string());
            return (true, Vec::new());
        };
        if !self.lsp_enabled {
            self.set_error(format!("no language server for {language}"));
            return (true, Vec::new());
        }
        let effect = Effect::LspQuery {
            kind,
            path,
            language,
            row: self.cursor.row,
            utf16_col: self.doc.utf16_col(self.cursor.row, self.cursor.col),
        };
        (true, vec![effect])
    }

    /// Delivers the reply to a location query.
    pub fn show_locations(
        &mut self,
        kind: LocationKind,
        result: Result<Vec<Location>, String>,
    ) -> (bool, Vec<Effect>) {
        let mut locations = match result {
            Ok(locations) => locations,
            Err(err) => {
                self.set_error(format!("{}: {err}", kind.label()));
                return (true, Vec::new());
            }
        };

        match locations.len() {
            0 => {
                self.set_error(format!("no {} found", kind.label()));
                (true, Vec::new())
            }
            1 => {
                let location = locations.remove(0);
                self.jump_to_location(location)
            }
            _ => {
                let labels = locations.iter().map(|l| self.location_label(l)).collect();
                self.open_picker(Picker::locations(kind, locations, labels));
                (true, Vec::new())
            }
        }
    }

    fn location_label(&self, location: &Location) -> String {
        let path = location
            .path
            .strip_prefix(&self.repo_root)
            .unwrap_or(&location.path);
        format!("{}:{}", path.display(), location.row + 1)
    }

    pub(super) fn jump_to_location(&mut self, location: Location) -> (bool, Vec<Effect>) {
        if self.path.as_deref() == Some(location.path.as_path()) {
            self.goto_location(&location);
            return (true, Vec::new());
        }
        if self.doc.is_dirty() {
            self.set_error("no write since last change (use :w first)".to_string());
            return (true, Vec::new());
        }
        (
            true,
            vec![Effect::OpenFile {
                path: location.path.clone(),
                location: Some(location),
            }],
        )
    }

    /// Places the cursor on a location in the open document.
    pub fn goto_location(&mut self, location: &Location) {
        let row = location.row.min(self.doc.line_count() - 1);
        let col = self.doc.col_from_utf16(row, location.utf16_col);
        self.set_mode(Mode::Normal);
        self.move_cursor(Pos::new(row, col), false);
        self.follow_cursor();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/input.rs"]
mod tests;
