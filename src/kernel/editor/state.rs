use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::kernel::keymap::Keymap;
use crate::kernel::services::ports::{EditorConfig, FileSession};
use crate::kernel::Effect;
use crate::models::{Document, History, Pos, Selection};

use super::chord::Chord;
use super::mode::Mode;
use super::picker::Picker;
use super::prompt::Prompt;
use super::search::SearchState;
use super::syntax::{HighlightSpan, Highlighter};
use super::viewport::Viewport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Text captured by `yank` or a delete. Linewise text pastes on its own lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub text: String,
    pub linewise: bool,
}

/// All state of the single open document and the modal machinery around it.
/// Mutated only on the editor thread.
#[derive(Debug)]
pub struct EditorState {
    pub(super) doc: Document,
    pub(super) history: History,
    pub(super) cursor: Pos,
    /// Visual column kept across vertical motions.
    pub(super) goal_col: Option<usize>,
    pub(super) selection: Option<Selection>,
    pub(super) mode: Mode,
    pub(super) chord: Option<Chord>,
    pub(super) command_prompt: Prompt,
    pub(super) search_prompt: Prompt,
    pub(super) search: SearchState,
    pub(super) picker: Option<Picker>,
    pub(super) status: Option<StatusMessage>,
    pub(super) viewport: Viewport,
    pub(super) screen: (u16, u16),
    pub(super) config: EditorConfig,
    pub(super) normal_keymap: Keymap,
    pub(super) insert_keymap: Keymap,
    pub(super) register: Option<Register>,
    pub(super) highlighter: Highlighter,
    pub(super) path: Option<PathBuf>,
    pub(super) language: Option<String>,
    pub(super) lsp_enabled: bool,
    /// Change tick the language server last saw.
    pub(super) lsp_tick: Option<u64>,
    pub(super) repo_root: PathBuf,
    pub(super) branch: Option<String>,
    pub(super) drag_anchor: Option<Pos>,
}

impl EditorState {
    pub fn new(config: EditorConfig) -> Self {
        let history = History::new(Duration::from_millis(config.idle_boundary_ms));
        let mut state = Self {
            doc: Document::new(),
            history,
            cursor: Pos::default(),
            goal_col: None,
            selection: None,
            mode: Mode::Normal,
            chord: None,
            command_prompt: Prompt::default(),
            search_prompt: Prompt::default(),
            search: SearchState::default(),
            picker: None,
            status: None,
            viewport: Viewport::default(),
            screen: (80, 24),
            config,
            normal_keymap: Keymap::default_normal(),
            insert_keymap: Keymap::default_insert(),
            register: None,
            highlighter: Highlighter::default(),
            path: None,
            language: None,
            lsp_enabled: false,
            lsp_tick: None,
            repo_root: PathBuf::from("."),
            branch: None,
            drag_anchor: None,
        };
        state.layout_viewport();
        state
    }

    pub fn with_keymaps(mut self, normal: Keymap, insert: Keymap) -> Self {
        self.normal_keymap = normal;
        self.insert_keymap = insert;
        self
    }

    /// Replaces the open document. Returns the effects announcing it to a
    /// language server.
    pub fn open_document(
        &mut self,
        path: Option<PathBuf>,
        doc: Document,
        language: Option<String>,
        lsp_enabled: bool,
    ) -> Vec<Effect> {
        info!(
            path = ?path,
            language = language.as_deref().unwrap_or("-"),
            lines = doc.line_count(),
            "document opened"
        );
        self.doc = doc;
        self.history = History::new(Duration::from_millis(self.config.idle_boundary_ms));
        self.highlighter = Highlighter::new(language.as_deref());
        self.path = path;
        self.language = language;
        self.lsp_enabled = lsp_enabled;
        self.cursor = Pos::default();
        self.goal_col = None;
        self.selection = None;
        self.chord = None;
        self.picker = None;
        self.mode = Mode::Normal;
        self.viewport.top = 0;
        self.viewport.left = 0;
        self.layout_viewport();

        let mut effects = Vec::new();
        self.lsp_tick = None;
        if let (true, Some(path), Some(language)) = (self.lsp_enabled, &self.path, &self.language) {
            effects.push(Effect::LspDidOpen {
                path: path.clone(),
                language: language.clone(),
                text: self.doc.text(),
            });
            self.lsp_tick = Some(self.doc.change_tick());
        }
        effects
    }

    pub fn set_repo(&mut self, root: PathBuf, branch: Option<String>) {
        self.repo_root = root;
        self.branch = branch;
    }

    // ==================== accessors ====================

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn register(&self) -> Option<&Register> {
        self.register.as_ref()
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.doc.is_dirty()
    }

    /// The prompt line while in command or search mode: leader, text and
    /// cursor column.
    pub fn prompt_line(&self) -> Option<(char, &str, usize)> {
        match self.mode {
            Mode::Command => Some((':', self.command_prompt.text(), self.command_prompt.cursor())),
            Mode::Search => {
                let leader = if self.search.backward { '?' } else { '/' };
                Some((leader, self.search_prompt.text(), self.search_prompt.cursor()))
            }
            _ => None,
        }
    }

    /// Highlight spans for the rows `[start, end]`, reparsing first when the
    /// document moved past the last parse.
    pub fn highlights(&mut self, start_row: usize, end_row: usize) -> BTreeMap<usize, Vec<HighlightSpan>> {
        self.highlighter.highlight(&mut self.doc, start_row, end_row)
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Moves the cursor without touching the selection. Out-of-range
    /// positions are clamped.
    pub fn place_cursor(&mut self, pos: Pos) {
        self.history.begin_boundary();
        self.cursor = self.doc.clamp(pos);
        self.goal_col = None;
        self.follow_cursor();
    }

    /// Sets an active selection with the cursor on `head`.
    pub fn select_range(&mut self, anchor: Pos, head: Pos) {
        let selection = Selection::new(self.doc.clamp(anchor), self.doc.clamp(head));
        self.set_selection(selection);
        self.follow_cursor();
    }

    // ==================== status ====================

    pub fn set_status(&mut self, text: String) {
        self.status = Some(StatusMessage { text, is_error: false });
    }

    pub fn set_error(&mut self, text: String) {
        self.status = Some(StatusMessage { text, is_error: true });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ==================== modes ====================

    /// Switches mode. Every transition closes the open history group.
    pub(super) fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        debug!(from = self.mode.as_str(), to = mode.as_str(), "mode change");
        self.history.begin_boundary();
        self.mode = mode;
    }

    /// Periodic wake-up; closes idle history groups.
    pub fn tick(&mut self, now: Instant) -> bool {
        let open = self.history.is_group_open();
        self.history.tick(now);
        open != self.history.is_group_open()
    }

    // ==================== session ====================

    pub fn session_entry(&self) -> FileSession {
        FileSession {
            cursor_row: self.cursor.row,
            cursor_col: self.cursor.col,
            scroll_y: self.viewport.top,
            scroll_x: self.viewport.left,
            mode: self.mode.as_str().to_string(),
            selection: self.selection,
        }
    }

    /// Restores a session record, clamped to the current document.
    pub fn restore_session(&mut self, entry: &FileSession) {
        self.cursor = self.doc.clamp(Pos::new(entry.cursor_row, entry.cursor_col));
        self.selection = entry.selection.and_then(|sel| {
            let anchor = self.doc.clamp(sel.anchor);
            let head = self.doc.clamp(sel.head);
            (sel.active && anchor != head).then(|| Selection::new(anchor, head))
        });
        self.mode = Mode::restorable(&entry.mode);
        if self.mode == Mode::Select && self.selection.is_none() {
            self.mode = Mode::Normal;
        }
        self.viewport.top = entry.scroll_y.min(self.doc.line_count().saturating_sub(1));
        self.viewport.left = entry.scroll_x;
        self.follow_cursor();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/state.rs"]
mod tests;
