use lsp_server::{Message, Notification, RequestId};
use lsp_types::notification::Notification as _;
use lsp_types::request::Request as _;
use lsp_types::Url;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use super::convert::{
    did_change_params, did_open_params, initialize_params, location_params, normalize_locations,
    path_to_uri, workspace_folders,
};
use super::wire::{mark_stopped, reader_loop, request_message, stderr_loop, writer_loop, Shared};
use super::{LspError, REQUEST_TIMEOUT, SHUTDOWN_TIMEOUT};
use crate::kernel::effect::LocationKind;
use crate::kernel::language::LanguageServerConfig;

/// Lifecycle of one server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Spawning,
    Handshaking,
    Ready,
    Stopped,
}

#[derive(Debug, Clone)]
pub(super) struct PendingOpen {
    pub(super) uri: Url,
    pub(super) language_id: String,
    pub(super) text: String,
    pub(super) version: i32,
}

type ReplySlot = mpsc::Sender<Result<Value, LspError>>;

/// Everything the reader thread and callers share, behind one mutex.
pub(super) struct ServerState {
    pub(super) name: String,
    pub(super) phase: Phase,
    pub(super) init_id: RequestId,
    pub(super) next_id: i32,
    pub(super) pending_opens: Vec<PendingOpen>,
    /// Open documents and the version last sent for each.
    pub(super) open_docs: FxHashMap<Url, i32>,
    pub(super) pending_responses: FxHashMap<RequestId, ReplySlot>,
    /// Requests issued before the handshake completed.
    pub(super) queued: Vec<Message>,
}

impl ServerState {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            phase: Phase::Spawning,
            init_id: RequestId::from(0),
            next_id: 1,
            pending_opens: Vec::new(),
            open_docs: FxHashMap::default(),
            pending_responses: FxHashMap::default(),
            queued: Vec::new(),
        }
    }

    fn take_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

/// One running language server, shared between the editor thread and the
/// threads waiting on query replies.
pub struct LspClient {
    name: String,
    root: PathBuf,
    state: Shared,
    tx: mpsc::Sender<Message>,
    child: Mutex<Option<Child>>,
}

impl LspClient {
    /// Spawns the server, starts its I/O threads and sends `initialize`.
    pub fn start(name: &str, config: &LanguageServerConfig, root: &Path) -> Result<Arc<Self>, LspError> {
        let root_uri = path_to_uri(root)?;
        let spawn_err = |message: String| LspError::Spawn {
            server: name.to_string(),
            message,
        };

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if root.is_dir() {
            cmd.current_dir(root);
        }
        let mut child = cmd.spawn().map_err(|err| spawn_err(err.to_string()))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_err("stdio unavailable".to_string()));
        };
        let stderr = child.stderr.take();

        let state: Shared = Arc::new(Mutex::new(ServerState::new(name)));
        let (tx, rx) = mpsc::channel::<Message>();

        let threads = [
            std::thread::Builder::new().name("medit-lsp-writer".to_string()).spawn({
                let state = state.clone();
                move || writer_loop(stdin, rx, state)
            }),
            std::thread::Builder::new().name("medit-lsp-reader".to_string()).spawn({
                let state = state.clone();
                let tx = tx.clone();
                let folders = workspace_folders(root, &root_uri);
                move || reader_loop(stdout, tx, state, folders)
            }),
        ];
        if let Some(err) = threads.into_iter().find_map(Result::err) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_err(err.to_string()));
        }
        if let Some(stderr) = stderr {
            let server = name.to_string();
            if let Err(err) = std::thread::Builder::new()
                .name("medit-lsp-stderr".to_string())
                .spawn(move || stderr_loop(stderr, server))
            {
                tracing::warn!(error = %err, "spawn lsp stderr thread failed");
            }
        }

        let client = Arc::new(Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            state,
            tx,
            child: Mutex::new(Some(child)),
        });
        client.send_initialize(root, &root_uri)?;
        tracing::info!(server = %name, root = %root.display(), command = %config.command, "lsp server spawned");
        Ok(client)
    }

    fn send_initialize(&self, root: &Path, root_uri: &Url) -> Result<(), LspError> {
        let params = serde_json::to_value(initialize_params(root, root_uri))
            .map_err(|err| LspError::Decode(err.to_string()))?;
        let mut state = self.lock()?;
        let id = state.take_id();
        state.init_id = RequestId::from(id);
        state.phase = Phase::Handshaking;
        self.send(request_message(id, lsp_types::request::Initialize::METHOD, params))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().map_or(Phase::Stopped, |s| s.phase)
    }

    pub fn is_open(&self, path: &Path) -> bool {
        let Ok(uri) = path_to_uri(path) else {
            return false;
        };
        self.state.lock().is_ok_and(|s| {
            s.open_docs.contains_key(&uri) || s.pending_opens.iter().any(|o| o.uri == uri)
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ServerState>, LspError> {
        let state = self.state.lock().map_err(|_| LspError::ServerGone)?;
        if state.phase == Phase::Stopped {
            return Err(LspError::ServerGone);
        }
        Ok(state)
    }

    fn send(&self, msg: Message) -> Result<(), LspError> {
        self.tx.send(msg).map_err(|_| LspError::ServerGone)
    }

    fn notify<P: serde::Serialize>(&self, method: &str, params: P) -> Result<(), LspError> {
        self.send(Message::Notification(Notification::new(method.to_string(), params)))
    }

    /// Announces a document. Returns `false` when the URI was already opened
    /// (or queued) on this server.
    pub fn did_open(&self, path: &Path, language_id: &str, text: String) -> Result<bool, LspError> {
        let uri = path_to_uri(path)?;
        let mut state = self.lock()?;
        if state.open_docs.contains_key(&uri) || state.pending_opens.iter().any(|o| o.uri == uri) {
            return Ok(false);
        }

        if state.phase == Phase::Ready {
            tracing::debug!(server = %self.name, uri = %uri, "didOpen");
            self.notify(
                lsp_types::notification::DidOpenTextDocument::METHOD,
                did_open_params(uri.clone(), language_id, 1, text),
            )?;
            state.open_docs.insert(uri, 1);
        } else {
            tracing::debug!(server = %self.name, uri = %uri, "didOpen queued until initialized");
            state.pending_opens.push(PendingOpen {
                uri,
                language_id: language_id.to_string(),
                text,
                version: 1,
            });
        }
        Ok(true)
    }

    /// Sends the full text of an open document. A document still waiting
    /// for the handshake has its queued text replaced instead. Returns
    /// whether anything was sent or updated.
    pub fn did_change(&self, path: &Path, text: String) -> Result<bool, LspError> {
        let uri = path_to_uri(path)?;
        let mut state = self.lock()?;

        if let Some(open) = state.pending_opens.iter_mut().find(|o| o.uri == uri) {
            open.text = text;
            return Ok(true);
        }

        let Some(version) = state.open_docs.get_mut(&uri) else {
            return Ok(false);
        };
        *version += 1;
        let version = *version;
        tracing::debug!(server = %self.name, uri = %uri, version, "didChange");
        self.notify(
            lsp_types::notification::DidChangeTextDocument::METHOD,
            did_change_params(uri, version, text),
        )?;
        Ok(true)
    }

    /// Sends a request and blocks until its reply or `timeout`. Requests made
    /// before the handshake completes are queued; the timeout still runs
    /// from now.
    pub fn request(&self, method: &str, params: Value, timeout: Duration) -> Result<Value, LspError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        let id = {
            let mut state = self.lock()?;
            let id = state.take_id();
            state.pending_responses.insert(RequestId::from(id), reply_tx);
            let msg = request_message(id, method, params);
            if state.phase == Phase::Ready {
                self.send(msg)?;
            } else {
                state.queued.push(msg);
            }
            id
        };
        tracing::debug!(server = %self.name, id, method, "lsp request");

        match reply_rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Ok(mut state) = self.state.lock() {
                    state.pending_responses.remove(&RequestId::from(id));
                }
                tracing::warn!(server = %self.name, id, method, "lsp request timed out");
                Err(LspError::Timeout)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(LspError::ServerGone),
        }
    }

    pub fn locations(
        &self,
        kind: LocationKind,
        path: &Path,
        row: usize,
        utf16_col: usize,
    ) -> Result<Vec<lsp_types::Location>, LspError> {
        self.locations_with_timeout(kind, path, row, utf16_col, REQUEST_TIMEOUT)
    }

    pub fn locations_with_timeout(
        &self,
        kind: LocationKind,
        path: &Path,
        row: usize,
        utf16_col: usize,
        timeout: Duration,
    ) -> Result<Vec<lsp_types::Location>, LspError> {
        let params = location_params(kind, path_to_uri(path)?, row, utf16_col)?;
        let value = self.request(kind.method(), params, timeout)?;
        normalize_locations(value)
    }

    /// `shutdown` (bounded wait), `exit`, then kill and reap the process.
    pub fn shutdown(&self) {
        if self.phase() == Phase::Ready {
            if let Err(err) = self.request(
                lsp_types::request::Shutdown::METHOD,
                Value::Null,
                SHUTDOWN_TIMEOUT,
            ) {
                tracing::debug!(server = %self.name, error = %err, "lsp shutdown request failed");
            }
            let _ = self.notify(lsp_types::notification::Exit::METHOD, ());
        }
        mark_stopped(&self.state);
        self.reap();
    }

    fn reap(&self) {
        let Ok(mut child) = self.child.lock() else {
            return;
        };
        if let Some(mut child) = child.take() {
            // Give `exit` a moment before killing.
            for _ in 0..10 {
                if matches!(child.try_wait(), Ok(Some(_))) {
                    return;
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        mark_stopped(&self.state);
        if let Ok(mut child) = self.child.lock() {
            if let Some(mut child) = child.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}
