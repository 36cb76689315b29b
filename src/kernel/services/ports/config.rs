use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::history::DEFAULT_IDLE_BOUNDARY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineNumberMode {
    #[default]
    Abs,
    Rel,
    Off,
}

impl LineNumberMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abs" | "absolute" => Some(Self::Abs),
            "rel" | "relative" => Some(Self::Rel),
            "off" | "none" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Rel => "rel",
            Self::Off => "off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    pub tab_width: usize,
    pub line_numbers: LineNumberMode,
    pub git_branch_symbol: String,
    pub idle_boundary_ms: u64,
    pub auto_indent: bool,
    pub scroll_lines: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            line_numbers: LineNumberMode::Abs,
            git_branch_symbol: "git:".to_string(),
            idle_boundary_ms: DEFAULT_IDLE_BOUNDARY_MS,
            auto_indent: true,
            scroll_lines: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#RRGGBB`.
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

const DEFAULT_THEME: &[(&str, &str)] = &[
    ("foreground", "#d4d4d4"),
    ("background", "#1e1e1e"),
    ("statusline-fg", "#1e1e1e"),
    ("statusline-bg", "#7aa2f7"),
    ("statusline-insert-bg", "#9ece6a"),
    ("statusline-select-bg", "#bb9af7"),
    ("line-number-fg", "#5a5a5a"),
    ("line-number-active-fg", "#c6c6c6"),
    ("selection-bg", "#264f78"),
    ("search-match-bg", "#613214"),
    ("syntax-keyword", "#c586c0"),
    ("syntax-string", "#ce9178"),
    ("syntax-comment", "#6a9955"),
    ("syntax-type", "#4ec9b0"),
    ("syntax-function", "#dcdcaa"),
    ("syntax-number", "#b5cea8"),
    ("syntax-constant", "#4fc1ff"),
    ("syntax-operator", "#d4d4d4"),
    ("syntax-punctuation", "#808080"),
    ("syntax-field", "#9cdcfe"),
    ("syntax-builtin", "#569cd6"),
    ("syntax-variable", "#9cdcfe"),
    ("syntax-parameter", "#9cdcfe"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    colors: FxHashMap<String, Rgb>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let colors = DEFAULT_THEME
            .iter()
            .filter_map(|(role, hex)| Some((role.to_string(), Rgb::parse(hex)?)))
            .collect();
        Self { colors }
    }
}

impl ThemeConfig {
    /// Layers user entries over the defaults. Returns the roles whose value
    /// was not a `#RRGGBB` color.
    pub fn with_overrides(mut self, raw: &BTreeMap<String, String>) -> (Self, Vec<String>) {
        let mut invalid = Vec::new();
        for (role, value) in raw {
            match Rgb::parse(value) {
                Some(color) => {
                    self.colors.insert(role.clone(), color);
                }
                None => invalid.push(role.clone()),
            }
        }
        (self, invalid)
    }

    pub fn get(&self, role: &str) -> Option<Rgb> {
        self.colors.get(role).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Raw `[keymap.*]` tables: key string to action name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    pub normal: BTreeMap<String, String>,
    pub insert: BTreeMap<String, String>,
}

/// The typed result of loading `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub editor: EditorConfig,
    pub theme: ThemeConfig,
    pub keymap: KeymapConfig,
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
