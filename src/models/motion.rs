//! Cursor motions and column arithmetic over a [`Document`].

use unicode_xid::UnicodeXID;

use super::document::{Document, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Word,
    Punct,
}

pub fn char_class(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else if ch == '_' || ch.is_xid_continue() {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Visual column of code point column `col`: `\t` advances to the next
/// multiple of `tab_width`, everything else by one.
pub fn visual_col(line: &str, col: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    line.chars().take(col).fold(0, |v, ch| {
        if ch == '\t' {
            (v / tab_width + 1) * tab_width
        } else {
            v + 1
        }
    })
}

/// Inverse of [`visual_col`]: the code point column whose cell covers `vcol`.
pub fn col_for_visual(line: &str, vcol: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut v = 0;
    for (col, ch) in line.chars().enumerate() {
        let next = if ch == '\t' {
            (v / tab_width + 1) * tab_width
        } else {
            v + 1
        };
        if vcol < next {
            return col;
        }
        v = next;
    }
    line.chars().count()
}

fn line_chars(doc: &Document, row: usize) -> Vec<char> {
    doc.line(row).map(|l| l.chars().collect()).unwrap_or_default()
}

pub fn first_non_blank(doc: &Document, row: usize) -> usize {
    let chars = line_chars(doc, row);
    chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len())
}

pub fn move_word_right(doc: &Document, pos: Pos) -> Pos {
    let last_row = doc.line_count() - 1;
    let mut row = pos.row.min(last_row);
    let chars = line_chars(doc, row);
    let mut col = pos.col.min(chars.len());

    if col >= chars.len() {
        if row >= last_row {
            return Pos::new(row, chars.len());
        }
        row += 1;
        return Pos::new(row, first_non_blank(doc, row));
    }

    let class = char_class(chars[col]);
    if class != CharClass::Whitespace {
        while col < chars.len() && char_class(chars[col]) == class {
            col += 1;
        }
    }
    while col < chars.len() && chars[col].is_whitespace() {
        col += 1;
    }

    if col == chars.len() && row < last_row {
        row += 1;
        col = first_non_blank(doc, row);
    }
    Pos::new(row, col)
}

pub fn move_word_left(doc: &Document, pos: Pos) -> Pos {
    let mut row = pos.row.min(doc.line_count() - 1);
    let mut chars = line_chars(doc, row);
    let mut col = pos.col.min(chars.len());

    if col == 0 {
        if row == 0 {
            return Pos::new(0, 0);
        }
        row -= 1;
        chars = line_chars(doc, row);
        col = chars.len();
        if col == 0 {
            return Pos::new(row, 0);
        }
    }

    while col > 0 && chars[col - 1].is_whitespace() {
        col -= 1;
    }
    if col == 0 {
        return Pos::new(row, 0);
    }

    let class = char_class(chars[col - 1]);
    while col > 0 && char_class(chars[col - 1]) == class {
        col -= 1;
    }
    Pos::new(row, col)
}

/// Moves to the last code point of the next word (vim `e`).
pub fn move_word_end(doc: &Document, pos: Pos) -> Pos {
    let start = doc.clamp(pos);
    let Some(mut p) = step_forward(doc, start) else {
        return start;
    };

    loop {
        match doc.char_at(p) {
            Some(c) if !c.is_whitespace() => break,
            _ => match step_forward(doc, p) {
                Some(next) => p = next,
                None => return p,
            },
        }
    }

    let Some(ch) = doc.char_at(p) else {
        return p;
    };
    let class = char_class(ch);
    loop {
        let next = Pos::new(p.row, p.col + 1);
        match doc.char_at(next) {
            Some(c) if char_class(c) == class => p = next,
            _ => break,
        }
    }
    p
}

fn step_forward(doc: &Document, pos: Pos) -> Option<Pos> {
    if pos.col < doc.line_len(pos.row) {
        Some(Pos::new(pos.row, pos.col + 1))
    } else if pos.row + 1 < doc.line_count() {
        Some(Pos::new(pos.row + 1, 0))
    } else {
        None
    }
}

/// `f`/`F`/`t`/`T` on the current line.
pub fn find_char(doc: &Document, pos: Pos, target: char, forward: bool, till: bool) -> Option<Pos> {
    let chars = line_chars(doc, pos.row);
    if forward {
        let from = pos.col + 1;
        let idx = chars.get(from..)?.iter().position(|&c| c == target)? + from;
        let col = if till { idx - 1 } else { idx };
        Some(Pos::new(pos.row, col.max(pos.col)))
    } else {
        let upto = pos.col.min(chars.len());
        let idx = chars[..upto].iter().rposition(|&c| c == target)?;
        let col = if till { idx + 1 } else { idx };
        Some(Pos::new(pos.row, col.min(pos.col)))
    }
}

fn bracket_partner(ch: char) -> Option<(char, char, bool)> {
    match ch {
        '(' => Some(('(', ')', true)),
        '[' => Some(('[', ']', true)),
        '{' => Some(('{', '}', true)),
        '<' => Some(('<', '>', true)),
        ')' => Some(('(', ')', false)),
        ']' => Some(('[', ']', false)),
        '}' => Some(('{', '}', false)),
        '>' => Some(('<', '>', false)),
        _ => None,
    }
}

pub fn matching_bracket(doc: &Document, pos: Pos) -> Option<Pos> {
    let (open, close, forward) = bracket_partner(doc.char_at(pos)?)?;
    let mut depth = 0usize;

    if forward {
        for row in pos.row..doc.line_count() {
            let chars = line_chars(doc, row);
            let from = if row == pos.row { pos.col } else { 0 };
            for (col, &c) in chars.iter().enumerate().skip(from) {
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Pos::new(row, col));
                    }
                }
            }
        }
    } else {
        for row in (0..=pos.row).rev() {
            let chars = line_chars(doc, row);
            let upto = if row == pos.row { pos.col + 1 } else { chars.len() };
            for col in (0..upto.min(chars.len())).rev() {
                let c = chars[col];
                if c == close {
                    depth += 1;
                } else if c == open {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Pos::new(row, col));
                    }
                }
            }
        }
    }
    None
}

/// The innermost `open`..`close` pair enclosing `pos` (both ends inclusive).
pub fn surrounding_pair(doc: &Document, pos: Pos, open: char, close: char) -> Option<(Pos, Pos)> {
    let mut depth = 0usize;
    let mut open_pos = None;

    'scan: for row in (0..=pos.row.min(doc.line_count() - 1)).rev() {
        let chars = line_chars(doc, row);
        let upto = if row == pos.row {
            (pos.col + 1).min(chars.len())
        } else {
            chars.len()
        };
        for col in (0..upto).rev() {
            let c = chars[col];
            let here = Pos::new(row, col);
            if c == close && here != pos {
                depth += 1;
            } else if c == open {
                if depth == 0 {
                    open_pos = Some(here);
                    break 'scan;
                }
                depth -= 1;
            }
        }
    }

    let open_pos = open_pos?;
    let close_pos = matching_bracket(doc, open_pos)?;
    (close_pos >= pos).then_some((open_pos, close_pos))
}

/// Column bounds `[start, end)` of the word under `pos`.
pub fn word_bounds(doc: &Document, pos: Pos) -> Option<(usize, usize)> {
    let chars = line_chars(doc, pos.row);
    let ch = *chars.get(pos.col)?;
    let class = char_class(ch);
    if class == CharClass::Whitespace {
        return None;
    }

    let mut start = pos.col;
    while start > 0 && char_class(chars[start - 1]) == class {
        start -= 1;
    }
    let mut end = pos.col + 1;
    while end < chars.len() && char_class(chars[end]) == class {
        end += 1;
    }
    Some((start, end))
}

#[cfg(test)]
#[path = "../../tests/unit/models/motion.rs"]
mod tests;
