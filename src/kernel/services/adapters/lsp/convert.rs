use lsp_types::Url;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::LspError;
use crate::kernel::effect::{Location, LocationKind};

pub fn path_to_uri(path: &Path) -> Result<Url, LspError> {
    Url::from_file_path(path)
        .map_err(|_| LspError::Decode(format!("not an absolute path: {}", path.display())))
}

pub fn uri_to_path(uri: &Url) -> Option<PathBuf> {
    if uri.scheme() != "file" {
        return None;
    }
    uri.to_file_path().ok()
}

pub(super) fn workspace_folders(root: &Path, uri: &Url) -> Vec<lsp_types::WorkspaceFolder> {
    let name = root
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("workspace")
        .to_string();
    vec![lsp_types::WorkspaceFolder {
        uri: uri.clone(),
        name,
    }]
}

pub(super) fn client_capabilities() -> lsp_types::ClientCapabilities {
    let goto = lsp_types::GotoCapability {
        dynamic_registration: Some(false),
        link_support: Some(true),
    };

    lsp_types::ClientCapabilities {
        general: Some(lsp_types::GeneralClientCapabilities {
            position_encodings: Some(vec![lsp_types::PositionEncodingKind::UTF16]),
            ..Default::default()
        }),
        text_document: Some(lsp_types::TextDocumentClientCapabilities {
            synchronization: Some(lsp_types::TextDocumentSyncClientCapabilities {
                dynamic_registration: Some(false),
                will_save: Some(false),
                will_save_wait_until: Some(false),
                did_save: Some(false),
            }),
            definition: Some(goto.clone()),
            declaration: Some(goto.clone()),
            type_definition: Some(goto.clone()),
            implementation: Some(goto),
            references: Some(lsp_types::ReferenceClientCapabilities {
                dynamic_registration: Some(false),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(super) fn initialize_params(root: &Path, root_uri: &Url) -> lsp_types::InitializeParams {
    #[allow(deprecated)]
    lsp_types::InitializeParams {
        process_id: Some(std::process::id()),
        root_path: None,
        root_uri: Some(root_uri.clone()),
        initialization_options: None,
        capabilities: client_capabilities(),
        trace: None,
        workspace_folders: Some(workspace_folders(root, root_uri)),
        client_info: Some(lsp_types::ClientInfo {
            name: "medit".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
        locale: None,
        work_done_progress_params: lsp_types::WorkDoneProgressParams::default(),
    }
}

pub(super) fn did_open_params(
    uri: Url,
    language_id: &str,
    version: i32,
    text: String,
) -> lsp_types::DidOpenTextDocumentParams {
    lsp_types::DidOpenTextDocumentParams {
        text_document: lsp_types::TextDocumentItem::new(uri, language_id.to_string(), version, text),
    }
}

/// Full-document sync: the whole text replaces the previous version.
pub(super) fn did_change_params(
    uri: Url,
    version: i32,
    text: String,
) -> lsp_types::DidChangeTextDocumentParams {
    lsp_types::DidChangeTextDocumentParams {
        text_document: lsp_types::VersionedTextDocumentIdentifier::new(uri, version),
        content_changes: vec![lsp_types::TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text,
        }],
    }
}

/// Params for one of the five location queries. `utf16_col` is already in
/// UTF-16 code units.
pub(super) fn location_params(
    kind: LocationKind,
    uri: Url,
    row: usize,
    utf16_col: usize,
) -> Result<Value, LspError> {
    let position = lsp_types::TextDocumentPositionParams::new(
        lsp_types::TextDocumentIdentifier::new(uri),
        lsp_types::Position::new(row as u32, utf16_col as u32),
    );

    let value = match kind {
        LocationKind::References => serde_json::to_value(lsp_types::ReferenceParams {
            text_document_position: position,
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: lsp_types::ReferenceContext {
                include_declaration: true,
            },
        }),
        _ => serde_json::to_value(lsp_types::GotoDefinitionParams {
            text_document_position_params: position,
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        }),
    };
    value.map_err(|err| LspError::Decode(err.to_string()))
}

/// Accepts `null`, a single `Location`, `Location[]` or `LocationLink[]`.
pub fn normalize_locations(value: Value) -> Result<Vec<lsp_types::Location>, LspError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let response: lsp_types::GotoDefinitionResponse =
        serde_json::from_value(value).map_err(|err| LspError::Decode(err.to_string()))?;
    Ok(match response {
        lsp_types::GotoDefinitionResponse::Scalar(location) => vec![location],
        lsp_types::GotoDefinitionResponse::Array(locations) => locations,
        lsp_types::GotoDefinitionResponse::Link(links) => links
            .into_iter()
            .map(|link| lsp_types::Location::new(link.target_uri, link.target_selection_range))
            .collect(),
    })
}

/// Drops non-file URIs; columns stay in UTF-16 units.
pub fn to_editor_locations(locations: Vec<lsp_types::Location>) -> Vec<Location> {
    locations
        .into_iter()
        .filter_map(|loc| {
            Some(Location {
                path: uri_to_path(&loc.uri)?,
                row: loc.range.start.line as usize,
                utf16_col: loc.range.start.character as usize,
            })
        })
        .collect()
}
