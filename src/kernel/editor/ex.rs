//! `:` commands.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::event::KeyEvent;
use crate::kernel::services::ports::LineNumberMode;
use crate::kernel::Effect;
use crate::models::motion::first_non_blank;
use crate::models::Pos;

use super::mode::Mode;
use super::prompt::PromptOutcome;
use super::state::EditorState;

const DIRTY_QUIT: &str = "no write since last change (use :q!)";

impl EditorState {
    pub(super) fn command_key(&mut self, key: &KeyEvent) -> (bool, Vec<Effect>) {
        match self.command_prompt.handle_key(key) {
            PromptOutcome::Unchanged => (false, Vec::new()),
            PromptOutcome::Moved | PromptOutcome::Edited => (true, Vec::new()),
            PromptOutcome::Cancel => {
                self.set_mode(Mode::Normal);
                (true, Vec::new())
            }
            PromptOutcome::Submit(line) => {
                self.command_prompt.remember(&line);
                self.set_mode(Mode::Normal);
                self.execute_command(&line)
            }
        }
    }

    /// Runs one command line. Unknown commands only set a status message.
    pub fn execute_command(&mut self, line: &str) -> (bool, Vec<Effect>) {
        let line = line.trim();
        if line.is_empty() {
            return (false, Vec::new());
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        if let Ok(number) = name.parse::<usize>() {
            if number > 0 {
                return (self.goto_line(number), Vec::new());
            }
        }

        match name {
            "w" | "write" => (true, self.write(rest, false)),
            "wq" | "x" => (true, self.write(rest, true)),
            "q" | "quit" => {
                if self.doc.is_dirty() {
                    self.set_error(DIRTY_QUIT.to_string());
                    (true, Vec::new())
                } else {
                    (true, vec![Effect::Quit])
                }
            }
            "q!" | "quit!" => (true, vec![Effect::Quit]),
            "ln" => (self.set_line_numbers(rest), Vec::new()),
            "fmt" => self.request_format(),
            "set" => (self.set_option(rest), Vec::new()),
            _ => {
                self.set_error(format!("unknown command: {name}"));
                (true, Vec::new())
            }
        }
    }

    fn write(&mut self, arg: &str, quit_after: bool) -> Vec<Effect> {
        let path = if arg.is_empty() {
            self.path.clone()
        } else {
            Some(PathBuf::from(arg))
        };
        let Some(path) = path else {
            self.set_error("no file name".to_string());
            return Vec::new();
        };
        self.history.begin_boundary();
        vec![Effect::WriteFile {
            path,
            text: self.doc.text(),
            quit_after,
        }]
    }

    /// Delivers the outcome of a write. A failed write leaves the buffer dirty.
    pub fn file_written(
        &mut self,
        path: PathBuf,
        result: Result<usize, String>,
        quit_after: bool,
    ) -> (bool, Vec<Effect>) {
        match result {
            Ok(bytes) => {
                info!(path = %path.display(), bytes, "file written");
                self.doc.mark_saved();
                self.set_status(format!("wrote {}", path.display()));
                if self.path.is_none() {
                    self.path = Some(path);
                }
                if quit_after {
                    return (true, vec![Effect::Quit]);
                }
                (true, Vec::new())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "write failed");
                self.set_error(format!("write failed: {err}"));
                (true, Vec::new())
            }
        }
    }

    fn goto_line(&mut self, number: usize) -> bool {
        let row = number.saturating_sub(1).min(self.doc.line_count() - 1);
        let col = first_non_blank(&self.doc, row);
        self.move_cursor(Pos::new(row, col), false)
    }

    fn set_line_numbers(&mut self, value: &str) -> bool {
        match LineNumberMode::parse(value) {
            Some(mode) => {
                self.config.line_numbers = mode;
                self.layout_viewport();
                true
            }
            None => {
                self.set_error("usage: ln abs|rel|off".to_string());
                true
            }
        }
    }

    /// `set <option> <value>` or `set <option>=<value>`.
    fn set_option(&mut self, args: &str) -> bool {
        let (option, value) = match args.split_once('=') {
            Some((option, value)) => (option.trim(), value.trim()),
            None => match args.split_once(char::is_whitespace) {
                Some((option, value)) => (option.trim(), value.trim()),
                None => (args, ""),
            },
        };

        match option {
            "tab-width" => match value.parse::<usize>() {
                Ok(width) if (1..=16).contains(&width) => {
                    self.config.tab_width = width;
                    true
                }
                _ => {
                    self.set_error(format!("invalid tab-width: {value}"));
                    true
                }
            },
            "line-numbers" => self.set_line_numbers(value),
            "" => {
                self.set_error("usage: set <option>=<value>".to_string());
                true
            }
            _ => {
                self.set_error(format!("unknown option: {option}"));
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/ex.rs"]
mod tests;
