use super::*;

use crate::core::event::{InputEvent, KeyEvent, KeyModifiers};
use crate::kernel::services::ports::EditorConfig;
use crate::models::Document;

fn editor(text: &str) -> EditorState {
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text(text), None, false);
    state.resize(40, 10);
    state
}

fn mouse(state: &mut EditorState, kind: MouseEventKind, column: u16, row: u16) -> bool {
    let event = MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    };
    state.handle_input(InputEvent::Mouse(event)).0
}

#[test]
fn test_screen_to_pos_accounts_for_gutter() {
    let state = editor("hello\nworld");
    assert_eq!(state.gutter_width(), 4);
    assert_eq!(state.screen_to_pos(6, 1), Some(Pos::new(1, 2)));
    assert_eq!(state.screen_to_pos(1, 0), Some(Pos::new(0, 0)));
    assert_eq!(state.screen_to_pos(30, 0), Some(Pos::new(0, 5)));
    assert_eq!(state.screen_to_pos(4, 5), Some(Pos::new(1, 0)));
    assert_eq!(state.screen_to_pos(4, 8), None);
}

#[test]
fn test_screen_to_pos_expands_tabs() {
    let state = editor("\tabc");
    assert_eq!(state.screen_to_pos(4, 0), Some(Pos::new(0, 0)));
    assert_eq!(state.screen_to_pos(7, 0), Some(Pos::new(0, 0)));
    assert_eq!(state.screen_to_pos(8, 0), Some(Pos::new(0, 1)));
}

#[test]
fn test_click_places_cursor_and_drops_selection() {
    let mut state = editor("hello world");
    state.select_range(Pos::new(0, 0), Pos::new(0, 5));

    assert!(mouse(&mut state, MouseEventKind::Down(MouseButton::Left), 10, 0));
    assert_eq!(state.cursor(), Pos::new(0, 6));
    assert_eq!(state.selection(), None);

    mouse(&mut state, MouseEventKind::Up(MouseButton::Left), 10, 0);
    assert_eq!(state.selection(), None);
}

#[test]
fn test_drag_selects_from_press_point() {
    let mut state = editor("hello world");
    mouse(&mut state, MouseEventKind::Down(MouseButton::Left), 4, 0);
    assert!(mouse(&mut state, MouseEventKind::Drag(MouseButton::Left), 9, 0));
    assert_eq!(
        state.selection(),
        Some(Selection::new(Pos::new(0, 0), Pos::new(0, 5)))
    );
    assert_eq!(state.cursor(), Pos::new(0, 5));

    mouse(&mut state, MouseEventKind::Up(MouseButton::Left), 9, 0);
    assert!(state.selection().is_some());

    state.handle_key(KeyEvent::ch('d'));
    assert_eq!(state.document().text(), " world");
}

#[test]
fn test_drag_without_press_is_ignored() {
    let mut state = editor("hello");
    assert!(!mouse(&mut state, MouseEventKind::Drag(MouseButton::Left), 6, 0));
    assert_eq!(state.selection(), None);
}

#[test]
fn test_click_leaves_select_mode() {
    let mut state = editor("hello");
    state.handle_key(KeyEvent::ch('v'));
    assert_eq!(state.mode(), Mode::Select);
    mouse(&mut state, MouseEventKind::Down(MouseButton::Left), 6, 0);
    assert_eq!(state.mode(), Mode::Normal);
}

#[test]
fn test_mouse_ignored_in_prompt_modes() {
    let mut state = editor("hello");
    state.handle_key(KeyEvent::ch(':'));
    assert!(!mouse(&mut state, MouseEventKind::Down(MouseButton::Left), 6, 0));
    assert_eq!(state.cursor(), Pos::new(0, 0));
    assert_eq!(state.mode(), Mode::Command);
}

#[test]
fn test_wheel_scrolls_and_drags_cursor() {
    let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
    let mut state = editor(&text);

    assert!(mouse(&mut state, MouseEventKind::ScrollDown, 0, 0));
    assert_eq!(state.viewport().top, 3);
    assert_eq!(state.cursor().row, 3);

    assert!(mouse(&mut state, MouseEventKind::ScrollUp, 0, 0));
    assert_eq!(state.viewport().top, 0);
    assert_eq!(state.cursor().row, 3);
    assert!(!mouse(&mut state, MouseEventKind::ScrollUp, 0, 0));
}
