//! Minimal stdio language server used by the integration tests.
//!
//! Environment:
//! - `MEDIT_LSP_STUB_TRACE_PATH`: append one line per received message
//! - `MEDIT_LSP_STUB_INIT_DELAY_MS`: delay before answering `initialize`
//! - `MEDIT_LSP_STUB_INIT_ERROR`: answer `initialize` with an error
//! - `MEDIT_LSP_STUB_IGNORE`: comma separated request methods left unanswered

use lsp_server::{ErrorCode, Message, Request, RequestId, Response};
use lsp_types::notification::Notification as _;
use lsp_types::request::Request as _;
use serde_json::{json, Value};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

struct Trace {
    file: Option<std::fs::File>,
}

impl Trace {
    fn from_env() -> Self {
        let file = std::env::var_os("MEDIT_LSP_STUB_TRACE_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .and_then(|path| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
            });
        Self { file }
    }

    fn log(&mut self, line: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let _ = writeln!(file, "{line}");
        let _ = file.flush();
    }
}

struct Behavior {
    init_delay: Duration,
    init_error: bool,
    ignore: Vec<String>,
}

impl Behavior {
    fn from_env() -> Self {
        let init_delay = std::env::var("MEDIT_LSP_STUB_INIT_DELAY_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_default();
        let init_error = std::env::var_os("MEDIT_LSP_STUB_INIT_ERROR").is_some_and(|v| !v.is_empty());
        let ignore = std::env::var("MEDIT_LSP_STUB_IGNORE")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            init_delay,
            init_error,
            ignore,
        }
    }
}

fn main() {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = BufWriter::new(stdout.lock());

    let mut trace = Trace::from_env();
    let behavior = Behavior::from_env();

    loop {
        let msg = match Message::read(&mut reader) {
            Ok(Some(msg)) => msg,
            Ok(None) | Err(_) => break,
        };

        match msg {
            Message::Request(req) => {
                trace.log(&format!("request {}", req.method));
                if behavior.ignore.iter().any(|m| *m == req.method) {
                    continue;
                }
                let resp = handle_request(req, &behavior);
                if send(&mut writer, Message::Response(resp)).is_err() {
                    break;
                }
            }
            Message::Notification(not) => {
                trace.log(&format!("notification {}", not.method));
                if not.method == lsp_types::notification::Initialized::METHOD {
                    let req = Request::new(
                        RequestId::from("stub-config".to_string()),
                        lsp_types::request::WorkspaceConfiguration::METHOD.to_string(),
                        json!({ "items": [{ "section": "stub" }] }),
                    );
                    if send(&mut writer, Message::Request(req)).is_err() {
                        break;
                    }
                }
                if not.method == lsp_types::notification::Exit::METHOD {
                    break;
                }
            }
            Message::Response(resp) => {
                trace.log(&format!("response {}", resp.result.unwrap_or(Value::Null)));
            }
        }
    }
}

fn send(writer: &mut BufWriter<std::io::StdoutLock<'_>>, msg: Message) -> std::io::Result<()> {
    msg.write(writer)?;
    writer.flush()
}

fn handle_request(req: Request, behavior: &Behavior) -> Response {
    match req.method.as_str() {
        m if m == lsp_types::request::Initialize::METHOD => {
            if !behavior.init_delay.is_zero() {
                std::thread::sleep(behavior.init_delay);
            }
            if behavior.init_error {
                return Response::new_err(
                    req.id,
                    ErrorCode::InternalError as i32,
                    "stub refused to initialize".to_string(),
                );
            }
            let result = lsp_types::InitializeResult {
                capabilities: lsp_types::ServerCapabilities {
                    text_document_sync: Some(lsp_types::TextDocumentSyncCapability::Kind(
                        lsp_types::TextDocumentSyncKind::FULL,
                    )),
                    definition_provider: Some(lsp_types::OneOf::Left(true)),
                    references_provider: Some(lsp_types::OneOf::Left(true)),
                    ..Default::default()
                },
                server_info: Some(lsp_types::ServerInfo {
                    name: "medit-lsp-stub".to_string(),
                    version: Some("0.1".to_string()),
                }),
            };
            Response::new_ok(req.id, result)
        }
        m if m == lsp_types::request::Shutdown::METHOD => Response::new_ok(req.id, ()),
        m if m == lsp_types::request::GotoDefinition::METHOD
            || m == lsp_types::request::GotoDeclaration::METHOD
            || m == lsp_types::request::GotoTypeDefinition::METHOD
            || m == lsp_types::request::GotoImplementation::METHOD
            || m == lsp_types::request::References::METHOD =>
        {
            match position_of(&req.params) {
                Some((uri, pos)) => Response::new_ok(req.id, location_reply(m, uri, pos)),
                None => Response::new_err(
                    req.id,
                    ErrorCode::InvalidParams as i32,
                    "missing text document position".to_string(),
                ),
            }
        }
        _ => Response::new_err(
            req.id,
            ErrorCode::MethodNotFound as i32,
            format!("method not found: {}", req.method),
        ),
    }
}

fn position_of(params: &Value) -> Option<(lsp_types::Url, lsp_types::Position)> {
    let params =
        serde_json::from_value::<lsp_types::TextDocumentPositionParams>(params.clone()).ok()?;
    Some((params.text_document.uri, params.position))
}

/// Each query kind answers in a different response shape:
/// - definition: a single `Location` one line below the request
/// - declaration: `LocationLink[]` targeting line 0, column 2
/// - typeDefinition: `null`
/// - implementation: `Location[]` on lines 0 and 1
/// - references: `Location[]` with line 0 and the request position
fn location_reply(method: &str, uri: lsp_types::Url, pos: lsp_types::Position) -> Value {
    let at = |line: u32, character: u32| {
        let start = lsp_types::Position::new(line, character);
        lsp_types::Range::new(start, lsp_types::Position::new(line, character + 1))
    };
    let location = |range| json!(lsp_types::Location::new(uri.clone(), range));

    match method {
        m if m == lsp_types::request::GotoDefinition::METHOD => location(at(pos.line + 1, 0)),
        m if m == lsp_types::request::GotoDeclaration::METHOD => json!([lsp_types::LocationLink {
            origin_selection_range: None,
            target_uri: uri.clone(),
            target_range: at(0, 0),
            target_selection_range: at(0, 2),
        }]),
        m if m == lsp_types::request::GotoImplementation::METHOD => {
            json!([location(at(0, 0)), location(at(1, 0))])
        }
        m if m == lsp_types::request::References::METHOD => {
            json!([location(at(0, 0)), location(at(pos.line, pos.character))])
        }
        _ => Value::Null,
    }
}
