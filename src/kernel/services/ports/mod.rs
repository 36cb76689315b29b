//! Service ports: data contracts shared by the editor and the adapters.

pub mod config;
pub mod session;

pub use config::{AppConfig, EditorConfig, KeymapConfig, LineNumberMode, Rgb, ThemeConfig};
pub use session::{FileSession, RepoSession, SessionFile};
