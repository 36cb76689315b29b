//! Line-oriented document model.
//!
//! A document is a non-empty vector of lines (without terminators). Columns
//! count code points; byte offsets are only materialized for the incremental
//! parser via [`EditDescriptor`].

use compact_str::CompactString;
use memchr::{memchr_iter, memrchr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::history::{EntryKind, HistoryEntry};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocError {
    #[error("position {row}:{col} is out of range")]
    OutOfRange { row: usize, col: usize },
}

impl DocError {
    fn at(pos: Pos) -> Self {
        Self::OutOfRange {
            row: pos.row,
            col: pos.col,
        }
    }
}

/// Byte-level description of the most recent mutation, in the shape an
/// incremental parser expects. Offsets are relative to the parse text
/// (every line terminated by `\n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDescriptor {
    pub start_row: usize,
    pub start_col_bytes: usize,
    pub start_byte: usize,
    pub old_end_row: usize,
    pub old_end_col_bytes: usize,
    pub old_end_byte: usize,
    pub new_end_row: usize,
    pub new_end_col_bytes: usize,
    pub new_end_byte: usize,
    /// Change tick the edit produced.
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
    change_tick: u64,
    last_edit: Option<EditDescriptor>,
    dirty: bool,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            change_tick: 0,
            last_edit: None,
            dirty: false,
            line_ending: LineEnding::Lf,
            trailing_newline: false,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let (lines, line_ending, trailing_newline) = split_lines(text);
        Self {
            lines,
            change_tick: 0,
            last_edit: None,
            dirty: false,
            line_ending,
            trailing_newline,
        }
    }

    /// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(&String::from_utf8_lossy(bytes))
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            ..Self::new()
        }
    }

    // ==================== queries ====================

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Code point length of `row`, or 0 past the end.
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    pub fn char_at(&self, pos: Pos) -> Option<char> {
        self.lines.get(pos.row)?.chars().nth(pos.col)
    }

    pub fn change_tick(&self) -> u64 {
        self.change_tick
    }

    pub fn last_edit(&self) -> Option<&EditDescriptor> {
        self.last_edit.as_ref()
    }

    /// Hands the last edit descriptor to the caller. A second call returns `None`
    /// until the next mutation.
    pub fn take_last_edit(&mut self) -> Option<EditDescriptor> {
        self.last_edit.take()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn is_valid(&self, pos: Pos) -> bool {
        pos.row < self.lines.len() && pos.col <= self.line_len(pos.row)
    }

    pub fn check_pos(&self, pos: Pos) -> Result<(), DocError> {
        if self.is_valid(pos) {
            Ok(())
        } else {
            Err(DocError::at(pos))
        }
    }

    pub fn clamp(&self, pos: Pos) -> Pos {
        let row = pos.row.min(self.lines.len() - 1);
        Pos::new(row, pos.col.min(self.line_len(row)))
    }

    pub fn end_pos(&self) -> Pos {
        let row = self.lines.len() - 1;
        Pos::new(row, self.line_len(row))
    }

    /// Byte column of code point column `col` in `row`.
    pub fn byte_col(&self, row: usize, col: usize) -> usize {
        self.lines.get(row).map_or(0, |line| byte_index(line, col))
    }

    /// Code point column of byte column `byte_col` in `row`.
    pub fn char_col(&self, row: usize, byte_col: usize) -> usize {
        let Some(line) = self.lines.get(row) else {
            return 0;
        };
        let byte_col = byte_col.min(line.len());
        line.char_indices().take_while(|(i, _)| *i < byte_col).count()
    }

    /// UTF-16 code units before code point column `col` in `row`.
    pub fn utf16_col(&self, row: usize, col: usize) -> usize {
        self.lines
            .get(row)
            .map_or(0, |l| l.chars().take(col).map(char::len_utf16).sum())
    }

    /// Code point column at UTF-16 offset `utf16` in `row`. An offset inside a
    /// surrogate pair resolves to the code point that contains it.
    pub fn col_from_utf16(&self, row: usize, utf16: usize) -> usize {
        let Some(line) = self.lines.get(row) else {
            return 0;
        };
        let mut units = 0;
        for (col, ch) in line.chars().enumerate() {
            units += ch.len_utf16();
            if units > utf16 {
                return col;
            }
        }
        line.chars().count()
    }

    /// Offset of `pos` in the parse text.
    pub fn byte_offset(&self, pos: Pos) -> usize {
        let row = pos.row.min(self.lines.len());
        let before: usize = self.lines[..row].iter().map(|l| l.len() + 1).sum();
        before + self.byte_col(pos.row, pos.col)
    }

    /// Size of the parse text in bytes.
    pub fn len_bytes(&self) -> usize {
        self.lines.iter().map(|l| l.len() + 1).sum()
    }

    /// The text handed to the parser: every line terminated by `\n`.
    pub fn parse_text(&self) -> String {
        let mut out = String::with_capacity(self.len_bytes());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// The text as it is written to disk.
    pub fn text(&self) -> String {
        let mut out = self.lines.join(self.line_ending.as_str());
        if self.trailing_newline {
            out.push_str(self.line_ending.as_str());
        }
        out
    }

    /// Text in the half-open range `[start, end)`, joined with `\n`.
    pub fn text_range(&self, start: Pos, end: Pos) -> String {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let start = self.clamp(start);
        let end = self.clamp(end);
        if start.row == end.row {
            let line = &self.lines[start.row];
            return line[byte_index(line, start.col)..byte_index(line, end.col)].to_string();
        }

        let mut out = String::new();
        let first = &self.lines[start.row];
        out.push_str(&first[byte_index(first, start.col)..]);
        for line in &self.lines[start.row + 1..end.row] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        let last = &self.lines[end.row];
        out.push_str(&last[..byte_index(last, end.col)]);
        out
    }

    // ==================== mutations ====================

    pub fn insert_rune(&mut self, pos: Pos, ch: char) -> Result<HistoryEntry, DocError> {
        if ch == '\n' {
            return self.insert_text(pos, "\n");
        }
        self.check_pos(pos)?;

        let mut line = self.lines[pos.row].clone();
        line.insert(byte_index(&line, pos.col), ch);
        let entry = self.splice(EntryKind::InsertRune, pos.row, 1, vec![line]);
        Ok(entry.with_cursors(pos, Pos::new(pos.row, pos.col + 1)))
    }

    pub fn insert_text(&mut self, pos: Pos, text: &str) -> Result<HistoryEntry, DocError> {
        self.insert_text_as(EntryKind::InsertText, pos, text)
    }

    pub fn delete_range(&mut self, start: Pos, end: Pos) -> Result<HistoryEntry, DocError> {
        self.check_pos(start)?;
        self.check_pos(end)?;
        if end < start {
            return Err(DocError::at(end));
        }

        let first = &self.lines[start.row];
        let last = &self.lines[end.row];
        let mut merged = String::with_capacity(first.len() + last.len());
        merged.push_str(&first[..byte_index(first, start.col)]);
        merged.push_str(&last[byte_index(last, end.col)..]);

        let old_len = end.row - start.row + 1;
        let entry = self.splice(EntryKind::DeleteRange, start.row, old_len, vec![merged]);
        Ok(entry.with_cursors(end, start))
    }

    pub fn split_line(&mut self, pos: Pos) -> Result<HistoryEntry, DocError> {
        self.insert_text_as(EntryKind::SplitLine, pos, "\n")
    }

    /// Joins `row` with the next line, dropping the next line's leading
    /// whitespace and separating the two with a single space.
    pub fn join_lines(&mut self, row: usize) -> Result<HistoryEntry, DocError> {
        if row + 1 >= self.lines.len() {
            return Err(DocError::OutOfRange { row: row + 1, col: 0 });
        }

        let current = &self.lines[row];
        let next = self.lines[row + 1].trim_start();
        let join_col = current.chars().count();
        let mut joined = String::with_capacity(current.len() + next.len() + 1);
        joined.push_str(current);
        if !current.is_empty() && !next.is_empty() && !current.ends_with(char::is_whitespace) {
            joined.push(' ');
        }
        joined.push_str(next);

        let entry = self.splice(EntryKind::JoinLines, row, 2, vec![joined]);
        Ok(entry.with_cursors(Pos::new(row, join_col), Pos::new(row, join_col)))
    }

    pub fn swap_lines(&mut self, a: usize, b: usize) -> Result<HistoryEntry, DocError> {
        for row in [a, b] {
            if row >= self.lines.len() {
                return Err(DocError::OutOfRange { row, col: 0 });
            }
        }

        let (lo, hi) = (a.min(b), a.max(b));
        let mut swapped = self.lines[lo..=hi].to_vec();
        swapped.swap(0, hi - lo);
        let entry = self.splice(EntryKind::SwapLines, lo, hi - lo + 1, swapped);
        Ok(entry.with_cursors(Pos::new(a, 0), Pos::new(b, 0)))
    }

    pub fn indent_range(&mut self, rows: &[usize], tab: &str) -> Result<HistoryEntry, DocError> {
        self.retab_rows(EntryKind::IndentRange, rows, |line| {
            line.insert_str(0, tab);
        })
    }

    /// Lines that do not begin with `tab` are left alone; the entry is still
    /// recorded.
    pub fn unindent_range(&mut self, rows: &[usize], tab: &str) -> Result<HistoryEntry, DocError> {
        self.retab_rows(EntryKind::UnindentRange, rows, |line| {
            if line.starts_with(tab) {
                line.drain(..tab.len());
            }
        })
    }

    pub fn replace_char(&mut self, pos: Pos, ch: char) -> Result<HistoryEntry, DocError> {
        if pos.row >= self.lines.len() || pos.col >= self.line_len(pos.row) || ch == '\n' {
            return Err(DocError::at(pos));
        }

        let line = &self.lines[pos.row];
        let start = byte_index(line, pos.col);
        let end = byte_index(line, pos.col + 1);
        let mut replaced = String::with_capacity(line.len() + ch.len_utf8());
        replaced.push_str(&line[..start]);
        replaced.push(ch);
        replaced.push_str(&line[end..]);

        let entry = self.splice(EntryKind::ReplaceChar, pos.row, 1, vec![replaced]);
        Ok(entry.with_cursors(pos, pos))
    }

    /// Replaces the whole content, e.g. with formatter output. The line
    /// ending and final newline of `text` replace the document's own.
    pub fn apply_formatted(&mut self, text: &str) -> HistoryEntry {
        let (lines, line_ending, trailing_newline) = split_lines(text);
        self.line_ending = line_ending;
        self.trailing_newline = trailing_newline;
        let old_len = self.lines.len();
        self.splice(EntryKind::ApplyFormatted, 0, old_len, lines)
    }

    /// Replaces `old_len` rows starting at `start_row` without producing a
    /// history entry. Used by undo/redo.
    pub(crate) fn replace_rows(&mut self, start_row: usize, old_len: usize, new_lines: Vec<String>) {
        let start_row = start_row.min(self.lines.len());
        let old_len = old_len.min(self.lines.len() - start_row);
        let old_text = region_text(&self.lines[start_row..start_row + old_len]);
        let new_text = region_text(&new_lines);
        let start_byte: usize = self.lines[..start_row].iter().map(|l| l.len() + 1).sum();

        self.lines.splice(start_row..start_row + old_len, new_lines);
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }

        self.change_tick += 1;
        self.dirty = true;
        self.last_edit = Some(describe_edit(
            start_row,
            start_byte,
            &old_text,
            &new_text,
            self.change_tick,
        ));
    }

    fn splice(
        &mut self,
        kind: EntryKind,
        start_row: usize,
        old_len: usize,
        new_lines: Vec<String>,
    ) -> HistoryEntry {
        let before: Vec<CompactString> = self.lines[start_row..start_row + old_len]
            .iter()
            .map(|l| CompactString::from(l.as_str()))
            .collect();
        let after: Vec<CompactString> = new_lines
            .iter()
            .map(|l| CompactString::from(l.as_str()))
            .collect();
        self.replace_rows(start_row, old_len, new_lines);
        HistoryEntry::new(kind, start_row, before, after)
    }

    fn insert_text_as(
        &mut self,
        kind: EntryKind,
        pos: Pos,
        text: &str,
    ) -> Result<HistoryEntry, DocError> {
        self.check_pos(pos)?;

        let text = normalize_newlines(text);
        let line = &self.lines[pos.row];
        let at = byte_index(line, pos.col);
        let (prefix, suffix) = line.split_at(at);

        let parts: Vec<&str> = text.split('\n').collect();
        let last_idx = parts.len() - 1;
        let mut new_lines = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let mut l = String::new();
            if i == 0 {
                l.push_str(prefix);
            }
            l.push_str(part);
            if i == last_idx {
                l.push_str(suffix);
            }
            new_lines.push(l);
        }

        let cursor_after = if last_idx == 0 {
            Pos::new(pos.row, pos.col + parts[0].chars().count())
        } else {
            Pos::new(pos.row + last_idx, parts[last_idx].chars().count())
        };

        let entry = self.splice(kind, pos.row, 1, new_lines);
        Ok(entry.with_cursors(pos, cursor_after))
    }

    fn retab_rows(
        &mut self,
        kind: EntryKind,
        rows: &[usize],
        mut edit: impl FnMut(&mut String),
    ) -> Result<HistoryEntry, DocError> {
        let (Some(&lo), Some(&hi)) = (rows.iter().min(), rows.iter().max()) else {
            return Err(DocError::OutOfRange { row: 0, col: 0 });
        };
        if hi >= self.lines.len() {
            return Err(DocError::OutOfRange { row: hi, col: 0 });
        }

        let mut new_lines = self.lines[lo..=hi].to_vec();
        let mut seen = vec![false; hi - lo + 1];
        for &row in rows {
            if std::mem::replace(&mut seen[row - lo], true) {
                continue;
            }
            edit(&mut new_lines[row - lo]);
        }

        let entry = self.splice(kind, lo, hi - lo + 1, new_lines);
        Ok(entry.with_cursors(Pos::new(lo, 0), Pos::new(lo, 0)))
    }
}

/// Byte index of code point column `col`; columns past the end clamp to the
/// line length.
pub fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
}

fn normalize_newlines(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains('\r') {
        std::borrow::Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}

fn split_lines(text: &str) -> (Vec<String>, LineEnding, bool) {
    let line_ending = if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };

    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    for nl in memchr_iter(b'\n', bytes) {
        let line = &text[start..nl];
        lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
        start = nl + 1;
    }

    let trailing_newline = !text.is_empty() && start == text.len();
    if !trailing_newline {
        lines.push(text[start..].to_string());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    (lines, line_ending, trailing_newline)
}

fn region_text(lines: &[String]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Shrinks a row-granular replacement to the bytes that actually changed.
fn describe_edit(
    start_row: usize,
    start_byte: usize,
    old: &str,
    new: &str,
    tick: u64,
) -> EditDescriptor {
    let mut prefix = old
        .bytes()
        .zip(new.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let mut suffix = old
        .bytes()
        .rev()
        .zip(new.bytes().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix) {
        suffix -= 1;
    }

    let (start_row_off, start_col) = point_in(old, prefix);
    let (old_row_off, old_col) = point_in(old, old.len() - suffix);
    let (new_row_off, new_col) = point_in(new, new.len() - suffix);

    EditDescriptor {
        start_row: start_row + start_row_off,
        start_col_bytes: start_col,
        start_byte: start_byte + prefix,
        old_end_row: start_row + old_row_off,
        old_end_col_bytes: old_col,
        old_end_byte: start_byte + old.len() - suffix,
        new_end_row: start_row + new_row_off,
        new_end_col_bytes: new_col,
        new_end_byte: start_byte + new.len() - suffix,
        tick,
    }
}

fn point_in(text: &str, byte: usize) -> (usize, usize) {
    let head = &text.as_bytes()[..byte];
    let rows = memchr_iter(b'\n', head).count();
    let col = match memrchr(b'\n', head) {
        Some(nl) => byte - nl - 1,
        None => byte,
    };
    (rows, col)
}

#[cfg(test)]
#[path = "../../tests/unit/models/document.rs"]
mod tests;
