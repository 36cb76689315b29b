//! Config and state directories, `config.toml` and `languages.toml` loading.
//!
//! Lookup order for the config directory:
//! - `MEDIT_CONFIG_HOME`
//! - `$XDG_CONFIG_HOME/medit`
//! - `<home>/.config/medit`
//!
//! `<home>` is the invoking user's home when running under sudo.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::kernel::editor::Action;
use crate::kernel::keymap::Keymap;
use crate::kernel::language::Languages;
use crate::kernel::services::ports::{AppConfig, EditorConfig, KeymapConfig, ThemeConfig};

const APP_NAME: &str = "medit";
pub const CONFIG_FILE: &str = "config.toml";
pub const LANGUAGES_FILE: &str = "languages.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where configuration is read from and state is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirs {
    pub config: PathBuf,
    pub state: PathBuf,
}

impl ConfigDirs {
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok(), real_home())
    }

    /// Resolves both directories from an environment lookup and a home dir.
    pub fn resolve(env: impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Self {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let home = home.unwrap_or_else(std::env::temp_dir);

        let config = var("MEDIT_CONFIG_HOME")
            .or_else(|| var("XDG_CONFIG_HOME").map(|dir| dir.join(APP_NAME)))
            .unwrap_or_else(|| home.join(".config").join(APP_NAME));
        let state = var("XDG_STATE_HOME")
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| home.join(".local").join("state").join(APP_NAME));

        Self { config, state }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state.join("logs")
    }

    /// Creates the state directory (and chowns it under sudo).
    pub fn ensure_state_dir(&self) -> io::Result<&Path> {
        if !self.state.exists() {
            std::fs::create_dir_all(&self.state)?;
            chown_to_invoking_user(&self.state);
        }
        Ok(&self.state)
    }
}

/// Home directory of the real user: `SUDO_USER`'s passwd entry when set,
/// else `$HOME`.
pub fn real_home() -> Option<PathBuf> {
    if let Some(user) = std::env::var("SUDO_USER").ok().filter(|u| !u.is_empty()) {
        if let Some(home) = passwd_home(&user) {
            return Some(home);
        }
    }
    std::env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from)
}

fn passwd_home(user: &str) -> Option<PathBuf> {
    let name = CString::new(user).ok()?;
    // SAFETY: `name` is a valid NUL-terminated string; the returned record is
    // copied out before any other passwd call on this thread.
    unsafe {
        let entry = libc::getpwnam(name.as_ptr());
        if entry.is_null() || (*entry).pw_dir.is_null() {
            return None;
        }
        let dir = CStr::from_ptr((*entry).pw_dir).to_str().ok()?;
        Some(PathBuf::from(dir))
    }
}

/// Hands `path` to `SUDO_UID`/`SUDO_GID` when both are set. Failures are
/// logged and otherwise ignored.
pub fn chown_to_invoking_user(path: &Path) {
    let id = |key: &str| std::env::var(key).ok()?.parse::<u32>().ok();
    let (Some(uid), Some(gid)) = (id("SUDO_UID"), id("SUDO_GID")) else {
        return;
    };
    let Some(c_path) = path.to_str().and_then(|p| CString::new(p).ok()) else {
        return;
    };
    // SAFETY: `c_path` is a valid NUL-terminated path.
    let ret = unsafe { libc::chown(c_path.as_ptr(), uid, gid) };
    if ret != 0 {
        tracing::warn!(
            path = %path.display(),
            error = %io::Error::last_os_error(),
            "chown to invoking user failed"
        );
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    editor: EditorConfig,
    theme: BTreeMap<String, String>,
    keymap: KeymapConfig,
}

/// Parses `config.toml` text. Returns the config plus warnings for entries
/// that were ignored.
pub fn parse_config(text: &str) -> Result<(AppConfig, Vec<String>), toml::de::Error> {
    let raw: RawConfig = toml::from_str(text)?;
    let (theme, invalid) = ThemeConfig::default().with_overrides(&raw.theme);
    let warnings = invalid
        .into_iter()
        .map(|role| format!("theme.{role}: expected #RRGGBB"))
        .collect();

    let mut editor = raw.editor;
    editor.tab_width = editor.tab_width.clamp(1, 16);

    Ok((
        AppConfig {
            editor,
            theme,
            keymap: raw.keymap,
        },
        warnings,
    ))
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn load_config(dir: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let path = dir.join(CONFIG_FILE);
    let Some(text) = read_optional(&path)? else {
        return Ok((AppConfig::default(), Vec::new()));
    };
    parse_config(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// The built-in table with the user's `languages.toml` merged over it.
pub fn load_languages(dir: &Path) -> Result<Languages, ConfigError> {
    let path = dir.join(LANGUAGES_FILE);
    let builtin = Languages::builtin();
    let Some(text) = read_optional(&path)? else {
        return Ok(builtin);
    };
    let user = Languages::parse(&text).map_err(|source| ConfigError::Parse { path, source })?;
    Ok(builtin.merge(user))
}

/// Everything the editor needs from the config directory. Errors never abort
/// startup; they are collected for the status line.
#[derive(Debug)]
pub struct LoadedConfig {
    pub app: AppConfig,
    pub languages: Languages,
    pub normal_keymap: Keymap,
    pub insert_keymap: Keymap,
    pub errors: Vec<String>,
}

pub fn load_all(dir: &Path) -> LoadedConfig {
    let mut errors = Vec::new();

    let app = match load_config(dir) {
        Ok((app, warnings)) => {
            for warning in &warnings {
                tracing::warn!(warning = %warning, "config entry ignored");
            }
            app
        }
        Err(err) => {
            tracing::error!(error = %err, "config load failed, using defaults");
            errors.push(err.to_string());
            AppConfig::default()
        }
    };

    let languages = load_languages(dir).unwrap_or_else(|err| {
        tracing::error!(error = %err, "languages load failed, using built-in table");
        errors.push(err.to_string());
        Languages::builtin()
    });

    let mut normal_keymap = Keymap::default_normal();
    let mut insert_keymap = Keymap::default_insert();
    let rejected = normal_keymap
        .layer(&app.keymap.normal, Action::is_known)
        .into_iter()
        .chain(insert_keymap.layer(&app.keymap.insert, Action::is_known));
    for entry in rejected {
        tracing::warn!(binding = %entry, "unknown key or action in keymap");
    }

    tracing::info!(
        dir = %dir.display(),
        languages = languages.languages().len(),
        "config loaded"
    );

    LoadedConfig {
        app,
        languages,
        normal_keymap,
        insert_keymap,
        errors,
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/config.rs"]
mod tests;
