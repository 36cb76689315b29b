//! Editor domain: headless state, modes and the input dispatcher.

mod action;
mod chord;
mod edit;
mod ex;
mod input;
mod mode;
mod mouse;
mod picker;
mod prompt;
mod search;
mod state;
mod syntax;
mod viewport;

pub use action::Action;
pub use chord::Chord;
pub use mode::Mode;
pub use picker::{Picker, PickerChoice};
pub use prompt::{Prompt, PromptOutcome, PROMPT_HISTORY_LIMIT};
pub use search::{compile as compile_search, find_matches, MatchRange, SearchState};
pub use state::{EditorState, Register, StatusMessage};
pub use syntax::{
    grammar, HighlightSpan, Highlighter, NodeRange, ParseStats, TokenKind, HIGHLIGHT_SIZE_LIMIT,
};
pub use viewport::{gutter_width, Align, Viewport, CHROME_ROWS};
