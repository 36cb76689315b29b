//! Language server clients: one process per (server, project root).

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::kernel::language::Languages;

mod client;
mod convert;
mod wire;

pub use client::{LspClient, Phase};
pub use convert::{normalize_locations, path_to_uri, to_editor_locations, uri_to_path};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LspError {
    #[error("{server}: {message}")]
    Spawn { server: String, message: String },
    #[error("lsp io: {0}")]
    Io(String),
    #[error("language server is gone")]
    ServerGone,
    #[error("language server timed out")]
    Timeout,
    #[error("language server error {code}: {message}")]
    Rpc { code: i32, message: String },
    #[error("bad lsp payload: {0}")]
    Decode(String),
    #[error("no language server for {0}")]
    NoServer(String),
}

type ClientKey = (String, PathBuf);

/// Starts servers lazily on first `did_open` and keeps them for the life of
/// the editor. A server that fails to spawn is not retried for that root.
pub struct LspRegistry {
    languages: Languages,
    clients: FxHashMap<ClientKey, Arc<LspClient>>,
    failed: FxHashSet<ClientKey>,
}

impl LspRegistry {
    pub fn new(languages: Languages) -> Self {
        Self {
            languages,
            clients: FxHashMap::default(),
            failed: FxHashSet::default(),
        }
    }

    pub fn has_server(&self, language: &str) -> bool {
        self.server_for(language).is_some()
    }

    fn server_for(&self, language: &str) -> Option<&str> {
        self.languages
            .by_name(language)?
            .language_servers
            .iter()
            .find(|name| self.languages.server(name).is_some())
            .map(String::as_str)
    }

    fn key(&self, path: &Path, language: &str) -> Option<ClientKey> {
        let server = self.server_for(language)?;
        let root = self.languages.by_name(language)?.resolve_root(path);
        Some((server.to_string(), root))
    }

    /// The running client for `path`, if one was started.
    pub fn client(&self, path: &Path, language: &str) -> Option<Arc<LspClient>> {
        let key = self.key(path, language)?;
        self.clients.get(&key).filter(|c| c.phase() != Phase::Stopped).cloned()
    }

    fn ensure_client(&mut self, path: &Path, language: &str) -> Result<Arc<LspClient>, LspError> {
        let key = self
            .key(path, language)
            .ok_or_else(|| LspError::NoServer(language.to_string()))?;

        if let Some(client) = self.clients.get(&key) {
            if client.phase() != Phase::Stopped {
                return Ok(client.clone());
            }
            tracing::info!(server = %key.0, root = %key.1.display(), "restarting stopped lsp server");
            self.clients.remove(&key);
        }
        if self.failed.contains(&key) {
            return Err(LspError::ServerGone);
        }

        let (server, root) = &key;
        let config = self
            .languages
            .server(server)
            .ok_or_else(|| LspError::NoServer(language.to_string()))?;
        match LspClient::start(server, config, root) {
            Ok(client) => {
                self.clients.insert(key, client.clone());
                Ok(client)
            }
            Err(err) => {
                tracing::warn!(server = %server, error = %err, "lsp server failed to start");
                self.failed.insert(key);
                Err(err)
            }
        }
    }

    /// Starts the server if needed and announces the document once.
    pub fn did_open(&mut self, path: &Path, language: &str, text: String) -> Result<bool, LspError> {
        let client = self.ensure_client(path, language)?;
        client.did_open(path, language, text)
    }

    pub fn did_change(&mut self, path: &Path, language: &str, text: String) -> Result<bool, LspError> {
        match self.client(path, language) {
            Some(client) => client.did_change(path, text),
            None => Ok(false),
        }
    }

    pub fn shutdown_all(&mut self) {
        for (_, client) in self.clients.drain() {
            client.shutdown();
        }
    }
}

impl Drop for LspRegistry {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/lsp/registry.rs"]
mod tests;
