//! Multi-key commands: each chord captures exactly one more key.

use crate::core::event::{KeyCode, KeyEvent};
use crate::kernel::effect::LocationKind;
use crate::kernel::keymap::key_string;
use crate::kernel::Effect;
use crate::models::motion::{find_char, first_non_blank, matching_bracket, surrounding_pair, word_bounds};
use crate::models::{Pos, Selection};

use super::action::Action;
use super::state::EditorState;
use super::viewport::Align;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    Goto,
    Match,
    MatchInside,
    MatchAround,
    View,
    Space,
    SpaceWindow,
    FindChar { forward: bool, till: bool },
    Replace,
}

impl Chord {
    /// The keys typed so far, as shown in the status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Goto => "g",
            Self::Match => "m",
            Self::MatchInside => "mi",
            Self::MatchAround => "ma",
            Self::View => "z",
            Self::Space => "space",
            Self::SpaceWindow => "space w",
            Self::FindChar { forward: true, till: false } => "f",
            Self::FindChar { forward: false, till: false } => "F",
            Self::FindChar { forward: true, till: true } => "t",
            Self::FindChar { forward: false, till: true } => "T",
            Self::Replace => "r",
        }
    }
}

fn pair_for(ch: char) -> Option<(char, char)> {
    match ch {
        '(' | ')' => Some(('(', ')')),
        '[' | ']' => Some(('[', ']')),
        '{' | '}' => Some(('{', '}')),
        '<' | '>' => Some(('<', '>')),
        _ => None,
    }
}

impl EditorState {
    pub fn pending_chord(&self) -> Option<Chord> {
        self.chord
    }

    pub(super) fn begin_chord(&mut self, chord: Chord) -> (bool, Vec<Effect>) {
        self.chord = Some(chord);
        (true, Vec::new())
    }

    pub(super) fn chord_key(&mut self, chord: Chord, key: &KeyEvent) -> (bool, Vec<Effect>) {
        if key.code == KeyCode::Esc {
            return (true, Vec::new());
        }

        let handled = match chord {
            Chord::Goto => self.goto_chord(key),
            Chord::Match => self.match_chord(key),
            Chord::MatchInside => self.select_object(key, false),
            Chord::MatchAround => self.select_object(key, true),
            Chord::View => self.view_chord(key),
            Chord::Space => self.space_chord(key),
            Chord::SpaceWindow => self.window_chord(key),
            Chord::FindChar { forward, till } => match key.text() {
                Some(ch) => {
                    if let Some(target) = find_char(&self.doc, self.cursor, ch, forward, till) {
                        self.move_cursor(target, false);
                    }
                    Some((true, Vec::new()))
                }
                None => Some((true, Vec::new())),
            },
            Chord::Replace => match key.text() {
                Some(ch) => Some((self.replace_chars(ch), Vec::new())),
                None => Some((true, Vec::new())),
            },
        };

        handled.unwrap_or_else(|| {
            let completion = key_string(key).unwrap_or_else(|| "?".to_string());
            self.set_error(format!("{} {} (not implemented)", chord.label(), completion));
            (true, Vec::new())
        })
    }

    fn goto_chord(&mut self, key: &KeyEvent) -> Option<(bool, Vec<Effect>)> {
        let row = self.cursor.row;
        let target = match key.text()? {
            'g' => Pos::new(0, 0),
            'e' => self.doc.end_pos(),
            'h' => Pos::new(row, 0),
            'l' => Pos::new(row, self.doc.line_len(row)),
            's' => Pos::new(row, first_non_blank(&self.doc, row)),
            't' => self.row_start(self.viewport.top),
            'b' => self.row_start(self.viewport.bottom(self.doc.line_count())),
            'c' => {
                let top = self.viewport.top;
                let bottom = self.viewport.bottom(self.doc.line_count());
                self.row_start(top + (bottom - top) / 2)
            }
            'd' => return Some(self.location_query(LocationKind::Definition)),
            'D' => return Some(self.location_query(LocationKind::Declaration)),
            'y' => return Some(self.location_query(LocationKind::TypeDefinition)),
            'i' => return Some(self.location_query(LocationKind::Implementation)),
            'r' => return Some(self.location_query(LocationKind::References)),
            _ => return None,
        };
        self.move_cursor(target, false);
        Some((true, Vec::new()))
    }

    fn row_start(&self, row: usize) -> Pos {
        Pos::new(row, first_non_blank(&self.doc, row))
    }

    fn match_chord(&mut self, key: &KeyEvent) -> Option<(bool, Vec<Effect>)> {
        match key.text()? {
            'm' => {
                if let Some(target) = matching_bracket(&self.doc, self.cursor) {
                    self.move_cursor(target, false);
                }
                Some((true, Vec::new()))
            }
            'i' => Some(self.begin_chord(Chord::MatchInside)),
            'a' => Some(self.begin_chord(Chord::MatchAround)),
            _ => None,
        }
    }

    /// `mi<c>` / `ma<c>`: selects inside or around a bracket pair, or the word
    /// under the cursor for `w`.
    fn select_object(&mut self, key: &KeyEvent, around: bool) -> Option<(bool, Vec<Effect>)> {
        let ch = key.text()?;
        let range = if ch == 'w' {
            word_bounds(&self.doc, self.cursor)
                .map(|(start, end)| (Pos::new(self.cursor.row, start), Pos::new(self.cursor.row, end)))
        } else {
            let (open, close) = pair_for(ch)?;
            surrounding_pair(&self.doc, self.cursor, open, close).map(|(start, end)| {
                if around {
                    (start, Pos::new(end.row, end.col + 1))
                } else {
                    (Pos::new(start.row, start.col + 1), end)
                }
            })
        };

        if let Some((start, end)) = range {
            self.history.begin_boundary();
            self.selection = Some(Selection::new(start, end));
            self.cursor = end;
            self.goal_col = None;
        }
        Some((true, Vec::new()))
    }

    fn view_chord(&mut self, key: &KeyEvent) -> Option<(bool, Vec<Effect>)> {
        let changed = match key.text()? {
            'z' | 'c' => self.align_view(Align::Center),
            't' => self.align_view(Align::Top),
            'b' => self.align_view(Align::Bottom),
            'j' => self.scroll_view(1),
            'k' => self.scroll_view(-1),
            _ => return None,
        };
        Some((changed, Vec::new()))
    }

    fn space_chord(&mut self, key: &KeyEvent) -> Option<(bool, Vec<Effect>)> {
        match key.text()? {
            'f' => Some(self.run_action(Action::Format)),
            'b' => Some(self.run_action(Action::BranchPicker)),
            'y' => Some(self.run_action(Action::Yank)),
            'p' => Some(self.run_action(Action::PasteAfter)),
            'w' => Some(self.begin_chord(Chord::SpaceWindow)),
            _ => None,
        }
    }

    /// There is a single window; only closing it is meaningful.
    fn window_chord(&mut self, key: &KeyEvent) -> Option<(bool, Vec<Effect>)> {
        match key.text()? {
            'q' => Some(self.run_action(Action::Quit)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/chord.rs"]
mod tests;
