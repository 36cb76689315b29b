use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Selection;

/// Per-file view snapshot persisted across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSession {
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub scroll_y: usize,
    pub scroll_x: usize,
    pub mode: String,
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSession {
    pub main_branch: Option<String>,
}

/// Contents of `session.json`. Keys are absolute paths.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    pub files: BTreeMap<String, FileSession>,
    pub repos: BTreeMap<String, RepoSession>,
    pub active_file: Option<String>,
    /// Unix seconds of the last save.
    pub last_saved: u64,
}

impl SessionFile {
    pub fn file(&self, path: &str) -> Option<&FileSession> {
        self.files.get(path)
    }

    pub fn record_file(&mut self, path: String, entry: FileSession) {
        self.active_file = Some(path.clone());
        self.files.insert(path, entry);
    }

    pub fn main_branch(&self, root: &str) -> Option<&str> {
        self.repos.get(root)?.main_branch.as_deref()
    }

    pub fn set_main_branch(&mut self, root: String, branch: String) {
        self.repos.entry(root).or_default().main_branch = Some(branch);
    }
}
