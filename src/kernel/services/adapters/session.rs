//! `session.json` persistence in the state directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::config::chown_to_invoking_user;
use crate::kernel::services::ports::SessionFile;

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable sessions start fresh.
    pub fn load(&self) -> SessionFile {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return SessionFile::default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "session read failed");
                return SessionFile::default();
            }
        };
        serde_json::from_str(&data).unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "session file corrupt, ignoring");
            SessionFile::default()
        })
    }

    /// Stamps `last_saved` and writes the file through a temporary sibling.
    pub fn save(&self, session: &mut SessionFile) -> io::Result<()> {
        session.last_saved = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let created = !self.path.exists();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        if created {
            chown_to_invoking_user(&self.path);
        }
        tracing::debug!(path = %self.path.display(), files = session.files.len(), "session saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/session.rs"]
mod tests;
