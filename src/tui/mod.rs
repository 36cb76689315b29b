//! Terminal frontend (crossterm + ratatui).
//!
//! Kept apart from `kernel`/`models` so the editor core builds without the
//! terminal crates.

pub mod crossterm;
pub mod render;
pub mod terminal_guard;
pub mod ticker;

pub use render::draw;
pub use terminal_guard::{TerminalGuard, TerminalRestorer, TerminationSignal};
pub use ticker::{Ticker, TICK_INTERVAL};
