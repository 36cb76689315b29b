//! The `languages.toml` model: which language a path belongs to, which
//! servers and formatter it uses, and where its project root is.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const BUILTIN_LANGUAGES: &str = include_str!("assets/languages.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

pub type LanguageServerConfig = CommandConfig;
pub type FormatterConfig = CommandConfig;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LanguageConfig {
    pub name: String,
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub language_servers: Vec<String>,
    #[serde(default)]
    pub formatter: Option<FormatterConfig>,
}

impl LanguageConfig {
    pub fn matches(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let basename = path.file_name().and_then(|n| n.to_str());

        self.file_types.iter().any(|ty| {
            if ext.as_deref() == Some(ty.as_str()) || basename == Some(ty.as_str()) {
                return true;
            }
            match (ty.strip_prefix('.'), ext.as_deref()) {
                (Some(dotted), Some(ext)) => dotted.eq_ignore_ascii_case(ext),
                _ => false,
            }
        })
    }

    /// Walks up from the file's directory until a root marker is found,
    /// falling back to the file's directory.
    pub fn resolve_root(&self, path: &Path) -> PathBuf {
        let start = path.parent().unwrap_or(Path::new("/"));
        start
            .ancestors()
            .find(|dir| self.roots.iter().any(|marker| dir.join(marker).exists()))
            .unwrap_or(start)
            .to_path_buf()
    }
}

#[derive(Debug, Default, Deserialize)]
struct LanguagesFile {
    #[serde(default, rename = "language")]
    languages: Vec<LanguageConfig>,
    #[serde(default, rename = "language-server")]
    servers: BTreeMap<String, LanguageServerConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct Languages {
    languages: Vec<LanguageConfig>,
    servers: BTreeMap<String, LanguageServerConfig>,
}

impl Languages {
    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_LANGUAGES).unwrap_or_default()
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let file: LanguagesFile = toml::from_str(text)?;
        Ok(Self {
            languages: file.languages,
            servers: file.servers,
        })
    }

    /// Entries in `user` replace entries of the same name; new names are appended.
    pub fn merge(mut self, user: Languages) -> Self {
        for lang in user.languages {
            match self.languages.iter_mut().find(|l| l.name == lang.name) {
                Some(slot) => *slot = lang,
                None => self.languages.push(lang),
            }
        }
        self.servers.extend(user.servers);
        self
    }

    pub fn for_path(&self, path: &Path) -> Option<&LanguageConfig> {
        self.languages.iter().find(|l| l.matches(path))
    }

    pub fn by_name(&self, name: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|l| l.name == name)
    }

    pub fn server(&self, name: &str) -> Option<&LanguageServerConfig> {
        self.servers.get(name)
    }

    pub fn languages(&self) -> &[LanguageConfig] {
        &self.languages
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
