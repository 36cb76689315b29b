//! Headless editor core (state/effect) and the services around it.

pub mod editor;
pub mod effect;
pub mod keymap;
pub mod language;
pub mod services;

pub use editor::{Action, EditorState, Mode};
pub use effect::{Effect, Location, LocationKind};
pub use keymap::Keymap;
pub use language::{LanguageConfig, Languages};
