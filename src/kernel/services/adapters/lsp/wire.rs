//! Process plumbing: the writer, reader and stderr threads of one server.
//!
//! Framing (`Content-Length: N\r\n\r\n` + N bytes of JSON) is done by
//! `lsp_server::Message::{read, write}`.

use lsp_server::{ErrorCode, Message, Notification, Request, RequestId, Response};
use lsp_types::notification::Notification as _;
use lsp_types::request::Request as _;
use serde_json::Value;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::sync::{mpsc, Arc, Mutex};

use super::client::{Phase, ServerState};
use super::convert::did_open_params;
use super::LspError;

pub(super) type Shared = Arc<Mutex<ServerState>>;

/// Moves the server to `Stopped` and resolves every waiting request with
/// `ServerGone`.
pub(super) fn mark_stopped(state: &Shared) {
    let Ok(mut state) = state.lock() else {
        return;
    };
    if state.phase != Phase::Stopped {
        tracing::info!(server = %state.name, "lsp server stopped");
    }
    state.phase = Phase::Stopped;
    state.pending_opens.clear();
    state.queued.clear();
    for (_, slot) in state.pending_responses.drain() {
        let _ = slot.send(Err(LspError::ServerGone));
    }
}

pub(super) fn writer_loop<W: Write>(output: W, rx: mpsc::Receiver<Message>, state: Shared) {
    let mut writer = BufWriter::new(output);
    while let Ok(msg) = rx.recv() {
        if let Err(err) = msg.write(&mut writer) {
            tracing::warn!(error = %err, "lsp write failed");
            break;
        }
    }
    mark_stopped(&state);
}

pub(super) fn reader_loop<R: Read>(
    input: R,
    tx: mpsc::Sender<Message>,
    state: Shared,
    workspace_folders: Vec<lsp_types::WorkspaceFolder>,
) {
    let mut reader = BufReader::new(input);
    loop {
        let msg = match Message::read(&mut reader) {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "lsp read failed");
                break;
            }
        };

        match msg {
            Message::Request(req) => {
                tracing::debug!(method = %req.method, "lsp server request");
                let resp = handle_server_request(req, &workspace_folders);
                let _ = tx.send(Message::Response(resp));
            }
            Message::Notification(not) => {
                tracing::debug!(method = %not.method, "lsp notification");
            }
            Message::Response(resp) => handle_response(resp, &tx, &state),
        }
    }
    mark_stopped(&state);
}

fn handle_response(resp: Response, tx: &mpsc::Sender<Message>, state: &Shared) {
    let Ok(mut guard) = state.lock() else {
        return;
    };

    if guard.phase == Phase::Handshaking && resp.id == guard.init_id {
        if let Some(err) = resp.error {
            tracing::error!(server = %guard.name, code = err.code, error = %err.message, "lsp initialize failed");
            drop(guard);
            mark_stopped(state);
            return;
        }
        complete_handshake(&mut guard, tx);
        return;
    }

    match guard.pending_responses.remove(&resp.id) {
        Some(slot) => {
            tracing::debug!(id = ?resp.id, "lsp response matched");
            let result = match resp.error {
                Some(err) => Err(LspError::Rpc {
                    code: err.code,
                    message: err.message,
                }),
                None => Ok(resp.result.unwrap_or(Value::Null)),
            };
            let _ = slot.send(result);
        }
        None => tracing::debug!(id = ?resp.id, "lsp response without waiter, treated as notification"),
    }
}

/// Runs with the state lock held so no caller can slip a message between
/// `initialized` and the queued opens.
fn complete_handshake(state: &mut ServerState, tx: &mpsc::Sender<Message>) {
    state.phase = Phase::Ready;
    tracing::info!(server = %state.name, "lsp server ready");

    let initialized = Notification::new(
        lsp_types::notification::Initialized::METHOD.to_string(),
        lsp_types::InitializedParams {},
    );
    let _ = tx.send(Message::Notification(initialized));

    for open in std::mem::take(&mut state.pending_opens) {
        let params = did_open_params(open.uri.clone(), &open.language_id, open.version, open.text);
        let msg = Notification::new(
            lsp_types::notification::DidOpenTextDocument::METHOD.to_string(),
            params,
        );
        let _ = tx.send(Message::Notification(msg));
        state.open_docs.insert(open.uri, open.version);
    }

    for msg in std::mem::take(&mut state.queued) {
        let _ = tx.send(msg);
    }
}

pub(super) fn stderr_loop<R: Read>(input: R, server: String) {
    let reader = BufReader::new(input);
    for line in reader.lines() {
        match line {
            Ok(line) if !line.trim().is_empty() => {
                tracing::debug!(server = %server, line = %line, "lsp stderr");
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
}

/// Answers requests a server sends to the client.
pub(super) fn handle_server_request(
    req: Request,
    workspace_folders: &[lsp_types::WorkspaceFolder],
) -> Response {
    match req.method.as_str() {
        m if m == lsp_types::request::WorkspaceConfiguration::METHOD => {
            let params = serde_json::from_value::<lsp_types::ConfigurationParams>(req.params)
                .unwrap_or_default();
            Response::new_ok(req.id, vec![Value::Null; params.items.len()])
        }
        m if m == lsp_types::request::WorkspaceFoldersRequest::METHOD => {
            Response::new_ok(req.id, workspace_folders.to_vec())
        }
        m if m == lsp_types::request::WorkDoneProgressCreate::METHOD
            || m == lsp_types::request::RegisterCapability::METHOD
            || m == lsp_types::request::UnregisterCapability::METHOD =>
        {
            Response::new_ok(req.id, ())
        }
        m if m == lsp_types::request::ShowMessageRequest::METHOD => {
            Response::new_ok(req.id, Option::<lsp_types::MessageActionItem>::None)
        }
        _ => Response::new_err(
            req.id,
            ErrorCode::MethodNotFound as i32,
            format!("method not found: {}", req.method),
        ),
    }
}

pub(super) fn request_message(id: i32, method: &str, params: Value) -> Message {
    Message::Request(Request::new(RequestId::from(id), method.to_string(), params))
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/lsp/wire.rs"]
mod tests;
