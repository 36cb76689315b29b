use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::adapters::file::{absolute, load_document, write_text};
use super::adapters::formatter::format_for_language;
use super::adapters::git::{current_branch, find_repo_root, list_branches};
use super::adapters::lsp::{to_editor_locations, LspError, LspRegistry};
use super::adapters::session::SessionStore;
use super::bus::{KernelBusSender, KernelMessage};
use super::ports::SessionFile;
use crate::kernel::editor::EditorState;
use crate::kernel::effect::{Effect, Location};
use crate::kernel::language::Languages;

/// Executes the editor's effects: file IO and session bookkeeping inline,
/// formatter, git and LSP queries on background threads that report back
/// through the bus.
pub struct KernelServiceHost {
    bus: KernelBusSender,
    languages: Languages,
    lsp: LspRegistry,
    store: Option<SessionStore>,
    session: SessionFile,
    quit: bool,
    exit_code: i32,
}

fn session_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl KernelServiceHost {
    pub fn new(bus: KernelBusSender, languages: Languages, store: Option<SessionStore>) -> Self {
        let session = store.as_ref().map(SessionStore::load).unwrap_or_default();
        Self {
            bus,
            lsp: LspRegistry::new(languages.clone()),
            languages,
            store,
            session,
            quit: false,
            exit_code: 0,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn session(&self) -> &SessionFile {
        &self.session
    }

    /// Opens the file named on the command line, or an empty buffer rooted
    /// at the working directory.
    pub fn open_initial(&mut self, state: &mut EditorState, path: Option<&Path>) -> bool {
        match path {
            Some(path) => {
                let effects = self.open_path(state, path, None);
                self.run_effects(state, effects)
            }
            None => {
                let cwd = absolute(Path::new("."));
                self.set_repo(state, &cwd);
                true
            }
        }
    }

    pub fn handle_message(&mut self, state: &mut EditorState, msg: KernelMessage) -> bool {
        match msg {
            KernelMessage::Input(event) => {
                let (changed, effects) = state.handle_input(event);
                self.run_effects(state, effects) || changed
            }
            KernelMessage::Tick => state.tick(Instant::now()),
            KernelMessage::Formatted { tick, result } => state.formatted(tick, result),
            KernelMessage::Locations { kind, result } => {
                let (changed, effects) = state.show_locations(kind, result);
                self.run_effects(state, effects) || changed
            }
            KernelMessage::Branches {
                root,
                result,
                current,
            } => state.open_branch_picker(root, result, current.as_deref()),
            KernelMessage::Terminate(code) => {
                tracing::info!(code, "termination requested");
                self.quit = true;
                self.exit_code = code;
                false
            }
        }
    }

    /// Runs `effects` and everything they lead to. Returns whether the
    /// editor state changed.
    pub fn run_effects(&mut self, state: &mut EditorState, effects: Vec<Effect>) -> bool {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut changed = false;
        while let Some(effect) = queue.pop_front() {
            let (dirty, more) = self.run_effect(state, effect);
            changed |= dirty;
            queue.extend(more);
        }
        changed
    }

    fn run_effect(&mut self, state: &mut EditorState, effect: Effect) -> (bool, Vec<Effect>) {
        match effect {
            Effect::Quit => {
                self.quit = true;
                (false, Vec::new())
            }
            Effect::WriteFile {
                path,
                text,
                quit_after,
            } => {
                let result = write_text(&path, &text).map_err(|err| err.to_string());
                state.file_written(path, result, quit_after)
            }
            Effect::Format {
                language,
                text,
                tick,
            } => {
                let languages = self.languages.clone();
                self.spawn("medit-format", move |bus| {
                    let result = format_for_language(&languages, &language, &text)
                        .map_err(|err| err.to_string());
                    let _ = bus.send(KernelMessage::Formatted { tick, result });
                });
                (false, Vec::new())
            }
            Effect::OpenFile { path, location } => {
                self.remember(state);
                (true, self.open_path(state, &path, location.as_ref()))
            }
            Effect::LspDidOpen {
                path,
                language,
                text,
            } => {
                match self.lsp.did_open(&path, &language, text) {
                    Ok(_) => {}
                    Err(err @ LspError::Spawn { .. }) => {
                        state.set_error(format!("lsp: {err}"));
                        return (true, Vec::new());
                    }
                    Err(err) => tracing::warn!(path = %path.display(), error = %err, "didOpen failed"),
                }
                (false, Vec::new())
            }
            Effect::LspDidChange {
                path,
                language,
                text,
            } => {
                if let Err(err) = self.lsp.did_change(&path, &language, text) {
                    tracing::debug!(path = %path.display(), error = %err, "didChange dropped");
                }
                (false, Vec::new())
            }
            Effect::LspQuery {
                kind,
                path,
                language,
                row,
                utf16_col,
            } => {
                let Some(client) = self.lsp.client(&path, &language) else {
                    return state.show_locations(kind, Err("no language server running".to_string()));
                };
                self.spawn("medit-lsp-query", move |bus| {
                    let result = client
                        .locations(kind, &path, row, utf16_col)
                        .map(to_editor_locations)
                        .map_err(|err| err.to_string());
                    let _ = bus.send(KernelMessage::Locations { kind, result });
                });
                (false, Vec::new())
            }
            Effect::ListBranches { root } => {
                let main = self.session.main_branch(&session_key(&root)).map(str::to_string);
                self.spawn("medit-git", move |bus| {
                    let result = list_branches(&root).map_err(|err| err.to_string());
                    let current = main.or_else(|| current_branch(&root));
                    let _ = bus.send(KernelMessage::Branches {
                        root,
                        result,
                        current,
                    });
                });
                (false, Vec::new())
            }
            Effect::BranchSelected { root, branch } => {
                tracing::info!(root = %root.display(), branch = %branch, "main branch selected");
                self.session.set_main_branch(session_key(&root), branch);
                self.save_session();
                (false, Vec::new())
            }
        }
    }

    fn spawn(&self, name: &str, job: impl FnOnce(KernelBusSender) + Send + 'static) {
        let bus = self.bus.clone();
        if let Err(err) = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || job(bus))
        {
            tracing::error!(thread = name, error = %err, "spawn background job failed");
        }
    }

    fn open_path(
        &mut self,
        state: &mut EditorState,
        path: &Path,
        location: Option<&Location>,
    ) -> Vec<Effect> {
        let path = absolute(path);
        let doc = match load_document(&path) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "open failed");
                state.set_error(err.to_string());
                return Vec::new();
            }
        };

        let language = self.languages.for_path(&path).map(|l| l.name.clone());
        let lsp_enabled = language.as_deref().is_some_and(|l| self.lsp.has_server(l));
        let effects = state.open_document(Some(path.clone()), doc, language, lsp_enabled);

        match location {
            Some(location) => state.goto_location(location),
            None => {
                if let Some(entry) = self.session.file(&session_key(&path)) {
                    state.restore_session(entry);
                }
            }
        }
        if let Some(dir) = path.parent() {
            self.set_repo(state, dir);
        }
        effects
    }

    fn set_repo(&self, state: &mut EditorState, dir: &Path) {
        let root: PathBuf = find_repo_root(dir).unwrap_or_else(|| dir.to_path_buf());
        let branch = current_branch(&root);
        state.set_repo(root, branch);
    }

    fn remember(&mut self, state: &EditorState) {
        if let Some(path) = state.path() {
            self.session.record_file(session_key(path), state.session_entry());
        }
    }

    fn save_session(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.save(&mut self.session) {
            tracing::warn!(path = %store.path().display(), error = %err, "session save failed");
        }
    }

    /// Records the open file, saves the session and stops language servers.
    pub fn shutdown(&mut self, state: &EditorState) {
        self.remember(state);
        self.save_session();
        self.lsp.shutdown_all();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/host.rs"]
mod tests;
