use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::core::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::kernel::Effect;
use crate::models::{Document, Pos, Selection};

use super::mode::Mode;
use super::prompt::PromptOutcome;
use super::state::EditorState;

/// A match as a half-open range on one line.
pub type MatchRange = (Pos, Pos);

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub(super) last_query: Option<String>,
    pub(super) backward: bool,
    pub(super) origin: Pos,
    pub(super) origin_selection: Option<Selection>,
    pub(super) matches: Vec<MatchRange>,
    pub(super) current: Option<usize>,
}

impl SearchState {
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn matches(&self) -> &[MatchRange] {
        &self.matches
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }
}

/// Compiles `query` as a regex, falling back to a literal match when it is
/// not a valid pattern. All-lowercase queries match case-insensitively.
pub fn compile(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    let insensitive = !query.chars().any(char::is_uppercase);
    RegexBuilder::new(query)
        .case_insensitive(insensitive)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(insensitive)
                .build()
        })
        .ok()
}

/// Every non-empty match in document order. Matches never span lines.
pub fn find_matches(doc: &Document, regex: &Regex) -> Vec<MatchRange> {
    let mut out = Vec::new();
    for (row, line) in doc.lines().iter().enumerate() {
        for m in regex.find_iter(line) {
            if m.start() == m.end() {
                continue;
            }
            let start = line[..m.start()].chars().count();
            let len = m.as_str().chars().count();
            out.push((Pos::new(row, start), Pos::new(row, start + len)));
        }
    }
    out
}

/// Index of the match to land on from `from`, wrapping around the document.
/// `inclusive` accepts a match starting exactly at `from`.
pub fn pick_match(matches: &[MatchRange], from: Pos, backward: bool, inclusive: bool) -> Option<usize> {
    if matches.is_empty() {
        return None;
    }
    if backward {
        matches
            .iter()
            .rposition(|(start, _)| *start < from || (inclusive && *start == from))
            .or(Some(matches.len() - 1))
    } else {
        matches
            .iter()
            .position(|(start, _)| *start > from || (inclusive && *start == from))
            .or(Some(0))
    }
}

impl EditorState {
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub(super) fn begin_search(&mut self, backward: bool) -> (bool, Vec<Effect>) {
        self.set_mode(Mode::Search);
        self.search_prompt.open();
        self.search.backward = backward;
        self.search.origin = self.cursor;
        self.search.origin_selection = self.selection;
        self.search.matches.clear();
        self.search.current = None;
        (true, Vec::new())
    }

    pub(super) fn search_key(&mut self, key: &KeyEvent) -> (bool, Vec<Effect>) {
        if key.modifiers.contains(KeyModifiers::ALT) {
            match key.code {
                KeyCode::Up => return (self.cycle_match(false), Vec::new()),
                KeyCode::Down => return (self.cycle_match(true), Vec::new()),
                _ => {}
            }
        }

        match self.search_prompt.handle_key(key) {
            PromptOutcome::Unchanged => (false, Vec::new()),
            PromptOutcome::Moved => (true, Vec::new()),
            PromptOutcome::Edited => {
                self.refresh_search();
                (true, Vec::new())
            }
            PromptOutcome::Submit(query) => {
                self.commit_search(query);
                (true, Vec::new())
            }
            PromptOutcome::Cancel => {
                self.cancel_search();
                (true, Vec::new())
            }
        }
    }

    pub(super) fn search_paste(&mut self, text: &str) {
        self.search_prompt.insert_str(text);
        self.refresh_search();
    }

    /// Recomputes matches for the current query and previews the nearest one.
    fn refresh_search(&mut self) {
        let query = self.search_prompt.text().to_string();
        self.search.matches = compile(&query)
            .map(|regex| find_matches(&self.doc, &regex))
            .unwrap_or_default();
        self.search.current =
            pick_match(&self.search.matches, self.search.origin, self.search.backward, true);
        debug!(query = %query, matches = self.search.matches.len(), "search refreshed");

        match self.search.current {
            Some(i) => self.land_on_match(i),
            None => {
                self.cursor = self.search.origin;
                self.selection = self.search.origin_selection;
            }
        }
    }

    fn land_on_match(&mut self, index: usize) {
        let (start, end) = self.search.matches[index];
        self.cursor = start;
        self.selection = Some(Selection::new(start, end));
        self.goal_col = None;
    }

    fn cycle_match(&mut self, forward: bool) -> bool {
        let len = self.search.matches.len();
        let Some(current) = self.search.current else {
            return false;
        };
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.search.current = Some(next);
        self.land_on_match(next);
        true
    }

    fn commit_search(&mut self, query: String) {
        self.search_prompt.remember(&query);
        if !query.is_empty() {
            self.search.last_query = Some(query.clone());
        }
        if self.search.current.is_none() && !query.is_empty() {
            self.set_error(format!("pattern not found: {query}"));
        }
        self.search.matches.clear();
        self.search.current = None;
        self.set_mode(Mode::Normal);
    }

    fn cancel_search(&mut self) {
        self.cursor = self.search.origin;
        self.selection = self.search.origin_selection;
        self.search.matches.clear();
        self.search.current = None;
        self.set_mode(Mode::Normal);
    }

    /// `n` / `N`: jumps to the next match of the last committed query.
    /// `reverse` flips the direction the search was started with.
    pub(super) fn search_next(&mut self, reverse: bool) -> (bool, Vec<Effect>) {
        let Some(query) = self.search.last_query.clone() else {
            self.set_error("no previous search".to_string());
            return (true, Vec::new());
        };
        let matches = compile(&query)
            .map(|regex| find_matches(&self.doc, &regex))
            .unwrap_or_default();
        let backward = self.search.backward != reverse;
        let Some(index) = pick_match(&matches, self.cursor, backward, false) else {
            self.set_error(format!("pattern not found: {query}"));
            return (true, Vec::new());
        };

        let (start, end) = matches[index];
        let wrapped = if backward { start >= self.cursor } else { start <= self.cursor };
        if wrapped {
            self.set_status(if backward {
                "search hit TOP, continuing at BOTTOM".to_string()
            } else {
                "search hit BOTTOM, continuing at TOP".to_string()
            });
        }
        self.cursor = start;
        self.goal_col = None;
        self.selection = Some(Selection::new(start, end));
        (true, Vec::new())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/search.rs"]
mod tests;
