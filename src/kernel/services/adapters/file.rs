//! Loading and saving the open document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Document;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("{}: not a file", .0.display())]
    NotAFile(PathBuf),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileError>;

/// Reads `path` into a document. A missing file opens as an empty, clean
/// buffer that will be created on the first write. Invalid UTF-8 is replaced,
/// never rejected.
pub fn load_document(path: &Path) -> Result<Document> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_file() => return Err(FileError::NotAFile(path.to_path_buf())),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "new file");
            return Ok(Document::new());
        }
        Err(err) => return Err(FileError::io(path, err)),
    }

    let bytes = fs::read(path).map_err(|err| FileError::io(path, err))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "file read");
    Ok(Document::from_bytes(&bytes))
}

/// Writes `text` to `path`, creating missing parent directories. Returns the
/// number of bytes written.
pub fn write_text(path: &Path, text: &str) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|err| FileError::io(parent, err))?;
        }
    }
    if path.is_dir() {
        return Err(FileError::NotAFile(path.to_path_buf()));
    }
    fs::write(path, text).map_err(|err| FileError::io(path, err))?;
    Ok(text.len())
}

/// Absolute form of `path` without resolving symlinks.
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/file.rs"]
mod tests;
