//! Document, history and selection models.

pub mod document;
pub mod history;
pub mod motion;
pub mod selection;

pub use document::{byte_index, DocError, Document, EditDescriptor, LineEnding, Pos};
pub use history::{EntryKind, History, HistoryEntry, Restored};
pub use selection::Selection;
