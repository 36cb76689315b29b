/// Editor modes. `Picker` covers every list picker (branches, locations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Select,
    Command,
    Search,
    Picker,
}

impl Mode {
    /// Label shown in the status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NOR",
            Self::Insert => "INS",
            Self::Select => "SEL",
            Self::Command => "CMD",
            Self::Search => "SRC",
            Self::Picker => "PCK",
        }
    }

    /// Name stored in the session file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Insert => "insert",
            Self::Select => "select",
            Self::Command => "command",
            Self::Search => "search",
            Self::Picker => "picker",
        }
    }

    /// Modes a session may restore into. Prompt and picker modes come back as
    /// normal.
    pub fn restorable(name: &str) -> Self {
        match name {
            "insert" => Self::Insert,
            "select" => Self::Select,
            _ => Self::Normal,
        }
    }

    pub fn is_prompt(self) -> bool {
        matches!(self, Self::Command | Self::Search)
    }
}
