//! Single-line prompt used by the `:` command line and `/` `?` search.

use crate::core::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::models::byte_index;

pub const PROMPT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Unchanged,
    Moved,
    Edited,
    Submit(String),
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct Prompt {
    text: String,
    /// Cursor as a code point index into `text`.
    cursor: usize,
    history: Vec<String>,
    browsing: Option<usize>,
    draft: String,
}

impl Prompt {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Starts a fresh line; history is kept.
    pub fn open(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.browsing = None;
        self.draft.clear();
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
    }

    /// Inserts pasted text at the cursor. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(if ch == '\n' || ch == '\r' { ' ' } else { ch });
        }
    }

    /// Appends a submitted line to the history ring, skipping blanks and
    /// immediate repeats.
    pub fn remember(&mut self, line: &str) {
        if line.trim().is_empty() || self.history.last().is_some_and(|last| last == line) {
            return;
        }
        self.history.push(line.to_string());
        if self.history.len() > PROMPT_HISTORY_LIMIT {
            self.history.remove(0);
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => PromptOutcome::Submit(self.text.clone()),
            KeyCode::Esc => PromptOutcome::Cancel,
            KeyCode::Char('c') if ctrl => PromptOutcome::Cancel,
            KeyCode::Up => self.history_prev(),
            KeyCode::Char('p') if ctrl => self.history_prev(),
            KeyCode::Down => self.history_next(),
            KeyCode::Char('n') if ctrl => self.history_next(),
            KeyCode::Char('u') if ctrl => self.edit(|p| {
                let at = p.byte_cursor();
                p.text.drain(..at);
                p.cursor = 0;
            }),
            KeyCode::Char('k') if ctrl => self.edit(|p| {
                let at = p.byte_cursor();
                p.text.truncate(at);
            }),
            KeyCode::Char('w') if ctrl => self.erase_word(),
            KeyCode::Home => self.move_to(0),
            KeyCode::Char('a') if ctrl => self.move_to(0),
            KeyCode::End => self.move_to(self.len()),
            KeyCode::Char('e') if ctrl => self.move_to(self.len()),
            KeyCode::Left => self.move_to(self.cursor.saturating_sub(1)),
            KeyCode::Char('b') if ctrl => self.move_to(self.cursor.saturating_sub(1)),
            KeyCode::Right => self.move_to((self.cursor + 1).min(self.len())),
            KeyCode::Char('f') if ctrl => self.move_to((self.cursor + 1).min(self.len())),
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return PromptOutcome::Unchanged;
                }
                self.edit(|p| {
                    p.cursor -= 1;
                    let at = p.byte_cursor();
                    p.text.remove(at);
                })
            }
            KeyCode::Delete => {
                if self.cursor >= self.len() {
                    return PromptOutcome::Unchanged;
                }
                self.edit(|p| {
                    let at = p.byte_cursor();
                    p.text.remove(at);
                })
            }
            _ => match key.text() {
                Some(ch) => {
                    self.insert_char(ch);
                    PromptOutcome::Edited
                }
                None => PromptOutcome::Unchanged,
            },
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_cursor(&self) -> usize {
        byte_index(&self.text, self.cursor)
    }

    fn insert_char(&mut self, ch: char) {
        let at = self.byte_cursor();
        self.text.insert(at, ch);
        self.cursor += 1;
        self.browsing = None;
    }

    fn edit(&mut self, f: impl FnOnce(&mut Self)) -> PromptOutcome {
        let before = self.text.clone();
        f(self);
        self.browsing = None;
        if before == self.text {
            PromptOutcome::Unchanged
        } else {
            PromptOutcome::Edited
        }
    }

    fn move_to(&mut self, cursor: usize) -> PromptOutcome {
        if cursor == self.cursor {
            return PromptOutcome::Unchanged;
        }
        self.cursor = cursor;
        PromptOutcome::Moved
    }

    /// Erases back to the start of the previous word, whitespace first.
    fn erase_word(&mut self) -> PromptOutcome {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        if start == self.cursor {
            return PromptOutcome::Unchanged;
        }
        self.edit(|p| {
            let from = byte_index(&p.text, start);
            let to = p.byte_cursor();
            p.text.drain(from..to);
            p.cursor = start;
        })
    }

    fn history_prev(&mut self) -> PromptOutcome {
        let index = match self.browsing {
            None if self.history.is_empty() => return PromptOutcome::Unchanged,
            None => {
                self.draft = self.text.clone();
                self.history.len() - 1
            }
            Some(0) => return PromptOutcome::Unchanged,
            Some(i) => i - 1,
        };
        self.browsing = Some(index);
        let entry = self.history[index].clone();
        self.set_text(&entry);
        PromptOutcome::Edited
    }

    fn history_next(&mut self) -> PromptOutcome {
        let Some(i) = self.browsing else {
            return PromptOutcome::Unchanged;
        };
        if i + 1 < self.history.len() {
            self.browsing = Some(i + 1);
            let entry = self.history[i + 1].clone();
            self.set_text(&entry);
        } else {
            self.browsing = None;
            let draft = std::mem::take(&mut self.draft);
            self.set_text(&draft);
        }
        PromptOutcome::Edited
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/prompt.rs"]
mod tests;
