//! Key strings and the normal/insert keymaps.
//!
//! A canonical key string lists modifiers in the order `ctrl`, `alt`, `cmd`,
//! `shift`, joined with `+`, followed by the key. Named keys are lowercase;
//! single runes keep their case and carry no `shift`.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::core::event::{KeyCode, KeyEvent, KeyModifiers};

fn named_key(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Enter => "enter",
        KeyCode::Tab => "tab",
        KeyCode::BackTab => "tab",
        KeyCode::Esc => "esc",
        KeyCode::Backspace => "backspace",
        KeyCode::Delete => "delete",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Char(' ') => "space",
        KeyCode::F(n) => return Some(format!("f{n}")),
        KeyCode::Char(_) | KeyCode::Unknown => return None,
    };
    Some(name.to_string())
}

fn join(modifiers: KeyModifiers, key: &str) -> String {
    let mut out = String::new();
    for (flag, name) in [
        (KeyModifiers::CONTROL, "ctrl"),
        (KeyModifiers::ALT, "alt"),
        (KeyModifiers::SUPER, "cmd"),
        (KeyModifiers::SHIFT, "shift"),
    ] {
        if modifiers.contains(flag) {
            out.push_str(name);
            out.push('+');
        }
    }
    out.push_str(key);
    out
}

/// Canonical key string for an input event, or `None` for keys that cannot
/// be bound.
pub fn key_string(key: &KeyEvent) -> Option<String> {
    let mut modifiers = key.modifiers;
    if key.code == KeyCode::BackTab {
        modifiers |= KeyModifiers::SHIFT;
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('\t') | KeyCode::Char('\n') => {
            let code = match key.code {
                KeyCode::Char('\t') => KeyCode::Tab,
                KeyCode::Char('\n') => KeyCode::Enter,
                other => other,
            };
            Some(join(modifiers, &named_key(code)?))
        }
        KeyCode::Char(ch) => {
            let mut rune = ch;
            if modifiers.contains(KeyModifiers::SHIFT) && ch.is_ascii_lowercase() {
                rune = ch.to_ascii_uppercase();
            }
            Some(join(modifiers.without(KeyModifiers::SHIFT), &rune.to_string()))
        }
        code => Some(join(modifiers, &named_key(code)?)),
    }
}

/// Canonicalizes a user-written key string such as `"Shift+Ctrl+Left"`.
/// Returns `None` when the string names no key or an unknown modifier.
pub fn canonicalize(value: &str) -> Option<String> {
    let value = value.trim();
    let (mods_part, key_part) = match value.strip_suffix("++") {
        Some(head) => (head, "+"),
        None => match value.rsplit_once('+') {
            Some((head, key)) if !key.is_empty() => (head, key),
            _ => ("", value),
        },
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in mods_part.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" | "option" | "meta" => modifiers |= KeyModifiers::ALT,
            "cmd" | "command" | "super" | "win" => modifiers |= KeyModifiers::SUPER,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = parse_key_code(key_part.trim())?;
    key_string(&KeyEvent::new(code, modifiers))
}

fn parse_key_code(value: &str) -> Option<KeyCode> {
    let lower = value.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "ret" | "return" | "cr" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" | "bs" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "space" | "spc" => KeyCode::Char(' '),
        "minus" => KeyCode::Char('-'),
        "plus" => KeyCode::Char('+'),
        _ if lower.len() > 1 && lower.starts_with('f') => {
            KeyCode::F(lower[1..].parse::<u8>().ok()?)
        }
        _ => {
            let mut chars = value.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };
    Some(code)
}

const DEFAULT_NORMAL: &[(&str, &str)] = &[
    ("h", "move_left"),
    ("j", "move_down"),
    ("k", "move_up"),
    ("l", "move_right"),
    ("left", "move_left"),
    ("down", "move_down"),
    ("up", "move_up"),
    ("right", "move_right"),
    ("w", "word_forward"),
    ("b", "word_backward"),
    ("e", "word_end"),
    ("W", "move_word_right"),
    ("B", "move_word_left"),
    ("0", "line_start"),
    ("home", "line_start"),
    ("$", "line_end"),
    ("end", "line_end"),
    ("^", "first_non_blank"),
    ("G", "file_end"),
    ("pageup", "page_up"),
    ("pagedown", "page_down"),
    ("ctrl+b", "page_up"),
    ("ctrl+f", "page_down"),
    ("ctrl+u", "half_page_up"),
    ("ctrl+d", "half_page_down"),
    ("i", "insert_mode"),
    ("a", "append_mode"),
    ("I", "insert_line_start"),
    ("A", "append_line_end"),
    ("o", "open_below"),
    ("O", "open_above"),
    ("v", "select_mode"),
    ("x", "select_line"),
    ("%", "select_all"),
    (";", "collapse_selection"),
    ("alt+o", "expand_selection"),
    ("alt+up", "expand_selection"),
    ("alt+i", "shrink_selection"),
    ("alt+down", "shrink_selection"),
    ("d", "delete_selection"),
    ("c", "change_selection"),
    ("D", "delete_line"),
    ("delete", "delete_char"),
    ("J", "join_lines"),
    ("alt+k", "move_line_up"),
    ("alt+j", "move_line_down"),
    ("tab", "indent"),
    (">", "indent"),
    ("shift+tab", "unindent"),
    ("<", "unindent"),
    ("u", "undo"),
    ("U", "redo"),
    ("ctrl+r", "redo"),
    ("y", "yank"),
    ("p", "paste_after"),
    ("P", "paste_before"),
    (":", "command_mode"),
    ("/", "search_forward"),
    ("?", "search_backward"),
    ("n", "search_next"),
    ("N", "search_prev"),
    ("g", "goto_mode"),
    ("m", "match_mode"),
    ("z", "view_mode"),
    ("space", "space_mode"),
    ("f", "find_char"),
    ("F", "find_char_backward"),
    ("t", "till_char"),
    ("T", "till_char_backward"),
    ("r", "replace"),
    ("ctrl+s", "save"),
    ("ctrl+q", "quit"),
    ("esc", "normal_mode"),
];

const DEFAULT_INSERT: &[(&str, &str)] = &[
    ("esc", "normal_mode"),
    ("ctrl+c", "normal_mode"),
    ("backspace", "delete_backward"),
    ("delete", "delete_forward"),
    ("enter", "insert_newline"),
    ("tab", "indent"),
    ("shift+tab", "unindent"),
    ("left", "move_left"),
    ("right", "move_right"),
    ("up", "move_up"),
    ("down", "move_down"),
    ("home", "line_start"),
    ("end", "line_end"),
    ("pageup", "page_up"),
    ("pagedown", "page_down"),
    ("ctrl+s", "save"),
];

/// Defaults for modified navigation keys, consulted when a keymap has no
/// entry for them.
const NAVIGATION_FALLBACKS: &[(&str, &str)] = &[
    ("cmd+home", "file_start"),
    ("cmd+end", "file_end"),
    ("ctrl+home", "file_start"),
    ("ctrl+end", "file_end"),
    ("cmd+up", "file_start"),
    ("cmd+down", "file_end"),
    ("cmd+left", "line_start"),
    ("cmd+right", "line_end"),
    ("ctrl+left", "move_word_left"),
    ("ctrl+right", "move_word_right"),
    ("alt+left", "move_word_left"),
    ("alt+right", "move_word_right"),
];

pub fn navigation_fallback(key: &str) -> Option<&'static str> {
    NAVIGATION_FALLBACKS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, action)| *action)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    bindings: FxHashMap<String, String>,
}

impl Keymap {
    fn from_table(table: &[(&str, &str)]) -> Self {
        let bindings = table
            .iter()
            .filter_map(|(key, action)| Some((canonicalize(key)?, action.to_string())))
            .collect();
        Self { bindings }
    }

    pub fn default_normal() -> Self {
        Self::from_table(DEFAULT_NORMAL)
    }

    pub fn default_insert() -> Self {
        Self::from_table(DEFAULT_INSERT)
    }

    pub fn bind(&mut self, key: &str, action: &str) -> bool {
        match canonicalize(key) {
            Some(key) => {
                self.bindings.insert(key, action.to_string());
                true
            }
            None => false,
        }
    }

    /// Layers `overrides` over this map. `is_known` decides whether an action
    /// name is accepted; rejected entries are returned.
    pub fn layer(
        &mut self,
        overrides: &BTreeMap<String, String>,
        is_known: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let mut rejected = Vec::new();
        for (key, action) in overrides {
            if !is_known(action) || !self.bind(key, action) {
                rejected.push(format!("{key} = {action}"));
            }
        }
        rejected
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(String::as_str)
    }

    /// Looks `key` up, falling back to the built-in navigation defaults.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| navigation_fallback(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, a)| (k.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/keymap.rs"]
mod tests;
