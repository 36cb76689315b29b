//! Service adapters: OS/process specific implementations (files, child
//! processes, config directories).

pub mod config;
pub mod file;
pub mod formatter;
pub mod git;
pub mod lsp;
pub mod session;

pub use config::{load_all, ConfigDirs, ConfigError, LoadedConfig};
pub use file::{load_document, write_text, FileError};
pub use formatter::{format_for_language, FormatError};
pub use lsp::{LspClient, LspError, LspRegistry};
pub use session::SessionStore;
