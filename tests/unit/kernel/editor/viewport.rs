use super::*;

use crate::core::event::{KeyCode, KeyEvent};
use crate::kernel::services::ports::EditorConfig;
use crate::models::Document;

fn view(top: usize, height: usize) -> Viewport {
    Viewport {
        top,
        left: 0,
        width: 10,
        height,
    }
}

fn numbered(lines: usize) -> EditorState {
    let text = (0..lines).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text(&text), None, false);
    state
}

#[test]
fn test_follow_scrolls_minimally() {
    let mut viewport = view(10, 5);
    viewport.follow(12, 0);
    assert_eq!(viewport.top, 10);

    viewport.follow(16, 0);
    assert_eq!(viewport.top, 12);

    viewport.follow(3, 0);
    assert_eq!(viewport.top, 3);

    viewport.follow(3, 25);
    assert_eq!(viewport.left, 16);
    viewport.follow(3, 2);
    assert_eq!(viewport.left, 2);
}

#[test]
fn test_align() {
    let mut viewport = view(0, 10);
    viewport.align(30, Align::Top);
    assert_eq!(viewport.top, 30);
    viewport.align(30, Align::Center);
    assert_eq!(viewport.top, 25);
    viewport.align(30, Align::Bottom);
    assert_eq!(viewport.top, 21);
    viewport.align(2, Align::Bottom);
    assert_eq!(viewport.top, 0);
}

#[test]
fn test_scroll_by_stops_at_last_line() {
    let mut viewport = view(0, 5);
    assert!(viewport.scroll_by(3, 10));
    assert_eq!(viewport.top, 3);
    assert!(viewport.scroll_by(50, 10));
    assert_eq!(viewport.top, 9);
    assert!(!viewport.scroll_by(1, 10));
    assert!(viewport.scroll_by(-50, 10));
    assert_eq!(viewport.top, 0);
    assert!(!viewport.scroll_by(-1, 10));
}

#[test]
fn test_bottom_and_contains_row() {
    let viewport = view(4, 5);
    assert_eq!(viewport.bottom(100), 8);
    assert_eq!(viewport.bottom(6), 5);
    assert!(viewport.contains_row(4));
    assert!(viewport.contains_row(8));
    assert!(!viewport.contains_row(9));
    assert!(!viewport.contains_row(3));
}

#[test]
fn test_gutter_width() {
    assert_eq!(gutter_width(5, LineNumberMode::Abs), 4);
    assert_eq!(gutter_width(12345, LineNumberMode::Abs), 6);
    assert_eq!(gutter_width(12345, LineNumberMode::Rel), 6);
    assert_eq!(gutter_width(12345, LineNumberMode::Off), 0);
}

#[test]
fn test_resize_lays_out_text_area() {
    let mut state = numbered(10);
    assert!(state.resize(30, 12));
    assert_eq!(state.viewport().width, 26);
    assert_eq!(state.viewport().height, 10);

    state.resize(2, 1);
    assert_eq!(state.viewport().width, 1);
    assert_eq!(state.viewport().height, 1);
}

#[test]
fn test_cursor_motion_keeps_cursor_visible() {
    let mut state = numbered(30);
    state.resize(20, 7);
    for _ in 0..8 {
        state.handle_key(KeyEvent::ch('j'));
    }
    assert_eq!(state.cursor().row, 8);
    assert_eq!(state.viewport().top, 4);

    state.handle_key(KeyEvent::plain(KeyCode::Home));
    state.handle_key(KeyEvent::ctrl('d'));
    assert!(state.viewport().contains_row(state.cursor().row));
}

#[test]
fn test_scroll_view_drags_cursor() {
    let mut state = numbered(30);
    state.resize(20, 7);
    assert!(state.scroll_view(10));
    assert_eq!(state.viewport().top, 10);
    assert_eq!(state.cursor().row, 10);

    state.place_cursor(Pos::new(14, 0));
    assert!(state.scroll_view(-10));
    assert_eq!(state.viewport().top, 0);
    assert_eq!(state.cursor().row, 4);
}
