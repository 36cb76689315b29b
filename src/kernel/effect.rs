use std::path::PathBuf;

/// The five location queries a language server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Definition,
    Declaration,
    TypeDefinition,
    Implementation,
    References,
}

impl LocationKind {
    pub fn method(self) -> &'static str {
        match self {
            Self::Definition => "textDocument/definition",
            Self::Declaration => "textDocument/declaration",
            Self::TypeDefinition => "textDocument/typeDefinition",
            Self::Implementation => "textDocument/implementation",
            Self::References => "textDocument/references",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Declaration => "declaration",
            Self::TypeDefinition => "type definition",
            Self::Implementation => "implementation",
            Self::References => "references",
        }
    }
}

/// A location as reported by a language server. The column is still in
/// UTF-16 code units; it is converted against the target line when shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub row: usize,
    pub utf16_col: usize,
}

/// Work the editor asks its host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    WriteFile {
        path: PathBuf,
        text: String,
        quit_after: bool,
    },
    Format {
        language: String,
        text: String,
        tick: u64,
    },
    OpenFile {
        path: PathBuf,
        location: Option<Location>,
    },
    LspDidOpen {
        path: PathBuf,
        language: String,
        text: String,
    },
    LspDidChange {
        path: PathBuf,
        language: String,
        text: String,
    },
    LspQuery {
        kind: LocationKind,
        path: PathBuf,
        language: String,
        row: usize,
        utf16_col: usize,
    },
    ListBranches {
        root: PathBuf,
    },
    BranchSelected {
        root: PathBuf,
        branch: String,
    },
}
