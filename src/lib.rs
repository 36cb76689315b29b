//! medit - modal terminal editor library.
//!
//! Module layout:
//! - core: input event types
//! - models: document, history, selection and motions
//! - kernel: editor state machine, keymaps, languages and services
//! - tui: crossterm/ratatui frontend (feature `tui`)
//! - logging: file-backed tracing setup

pub mod core;
pub mod kernel;
pub mod logging;
pub mod models;

#[cfg(feature = "tui")]
pub mod tui;
