//! Frontend-neutral building blocks shared by the kernel and the TUI.

pub mod event;

pub use event::{InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
