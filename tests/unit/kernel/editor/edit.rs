use super::*;

use crate::core::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::kernel::services::ports::EditorConfig;
use crate::models::Document;

fn editor(text: &str) -> EditorState {
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text(text), None, false);
    state
}

fn typed(state: &mut EditorState, keys: &str) {
    for ch in keys.chars() {
        state.handle_key(KeyEvent::ch(ch));
    }
}

fn press(state: &mut EditorState, code: KeyCode) {
    state.handle_key(KeyEvent::plain(code));
}

#[test]
fn test_enter_copies_leading_whitespace() {
    let mut state = editor("    foo");
    typed(&mut state, "A");
    press(&mut state, KeyCode::Enter);
    assert_eq!(state.document().lines(), ["    foo", "    "]);
    assert_eq!(state.cursor(), Pos::new(1, 4));
}

#[test]
fn test_enter_without_auto_indent() {
    let config = EditorConfig {
        auto_indent: false,
        ..EditorConfig::default()
    };
    let mut state = EditorState::new(config);
    let _ = state.open_document(None, Document::from_text("  ab"), None, false);
    state.place_cursor(Pos::new(0, 3));
    typed(&mut state, "i");
    press(&mut state, KeyCode::Enter);
    assert_eq!(state.document().lines(), ["  a", "b"]);
    assert_eq!(state.cursor(), Pos::new(1, 0));
}

#[test]
fn test_backspace_joins_at_line_start() {
    let mut state = editor("ab\ncd");
    state.place_cursor(Pos::new(1, 0));
    typed(&mut state, "i");
    press(&mut state, KeyCode::Backspace);
    assert_eq!(state.document().text(), "abcd");
    assert_eq!(state.cursor(), Pos::new(0, 2));

    press(&mut state, KeyCode::Esc);
    typed(&mut state, "u");
    assert_eq!(state.document().text(), "ab\ncd");
}

#[test]
fn test_backspace_at_document_start_does_nothing() {
    let mut state = editor("ab");
    typed(&mut state, "i");
    press(&mut state, KeyCode::Backspace);
    assert_eq!(state.document().text(), "ab");
    assert!(!state.history().can_undo());
}

#[test]
fn test_delete_line_then_paste_below() {
    let mut state = editor("one\ntwo\nthree");
    state.place_cursor(Pos::new(1, 0));
    typed(&mut state, "D");
    assert_eq!(state.document().text(), "one\nthree");
    assert_eq!(
        state.register(),
        Some(&Register {
            text: "two\n".to_string(),
            linewise: true,
        })
    );

    typed(&mut state, "p");
    assert_eq!(state.document().text(), "one\nthree\ntwo");
    assert_eq!(state.cursor(), Pos::new(2, 0));
}

#[test]
fn test_delete_last_line() {
    let mut state = editor("one\ntwo");
    state.place_cursor(Pos::new(1, 1));
    typed(&mut state, "D");
    assert_eq!(state.document().text(), "one");
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_yank_line_and_paste_above() {
    let mut state = editor("a\nb");
    state.place_cursor(Pos::new(1, 0));
    typed(&mut state, "y");
    assert_eq!(state.status_text(), Some("yanked 2 chars"));

    typed(&mut state, "P");
    assert_eq!(state.document().text(), "a\nb\nb");
    assert_eq!(state.cursor(), Pos::new(1, 0));
}

#[test]
fn test_charwise_paste_after_cursor() {
    let mut state = editor("foo bar");
    typed(&mut state, "wy");
    state.place_cursor(Pos::new(0, 6));
    typed(&mut state, ";p");
    assert_eq!(state.document().text(), "foo barfoo ");
}

#[test]
fn test_paste_with_empty_register() {
    let mut state = editor("abc");
    typed(&mut state, "p");
    assert_eq!(state.status_text(), Some("register is empty"));
    assert_eq!(state.document().text(), "abc");
}

#[test]
fn test_join_lines_trims_next_indent() {
    let mut state = editor("foo\n    bar");
    typed(&mut state, "J");
    assert_eq!(state.document().text(), "foo bar");
    assert_eq!(state.cursor(), Pos::new(0, 3));
}

#[test]
fn test_move_line_down_and_up() {
    let mut state = editor("a\nb\nc");
    state.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::ALT));
    assert_eq!(state.document().text(), "b\na\nc");
    assert_eq!(state.cursor(), Pos::new(1, 0));

    state.handle_key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::ALT));
    state.handle_key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::ALT));
    assert_eq!(state.document().text(), "a\nb\nc");
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_indent_and_unindent_selected_rows() {
    let mut state = editor("a\nb\nc");
    typed(&mut state, "xx>");
    assert_eq!(state.document().text(), "\ta\n\tb\nc");
    assert!(state.selection().is_some());

    typed(&mut state, "<");
    assert_eq!(state.document().text(), "a\nb\nc");
}

#[test]
fn test_tab_in_insert_mode_indents_the_line() {
    let mut state = editor("ab");
    typed(&mut state, "A");
    press(&mut state, KeyCode::Tab);
    assert_eq!(state.document().lines(), ["\tab"]);
    assert_eq!(state.cursor(), Pos::new(0, 3));
    assert_eq!(state.mode(), Mode::Insert);

    press(&mut state, KeyCode::BackTab);
    assert_eq!(state.document().lines(), ["ab"]);
    assert_eq!(state.cursor(), Pos::new(0, 2));
}

#[test]
fn test_change_selection_enters_insert() {
    let mut state = editor("foo bar");
    typed(&mut state, "wcX");
    assert_eq!(state.mode(), Mode::Insert);
    assert_eq!(state.document().text(), "Xbar");
}

#[test]
fn test_undo_redo_status_at_ends() {
    let mut state = editor("abc");
    typed(&mut state, "u");
    assert_eq!(state.status_text(), Some("already at oldest change"));

    typed(&mut state, "x");
    typed(&mut state, "d");
    assert_eq!(state.document().text(), "");
    typed(&mut state, "u");
    assert_eq!(state.document().text(), "abc");
    typed(&mut state, "U");
    assert_eq!(state.document().text(), "");
    typed(&mut state, "U");
    assert_eq!(state.status_text(), Some("already at newest change"));
}

#[test]
fn test_format_result_applies_at_same_tick() {
    let mut state = editor("fn  main(){}");
    let tick = state.document().change_tick();

    assert!(state.formatted(tick, Ok("fn main() {}".to_string())));
    assert_eq!(state.document().text(), "fn main() {}");
    assert_eq!(state.status_text(), Some("formatted"));

    typed(&mut state, "u");
    assert_eq!(state.document().text(), "fn  main(){}");
}

#[test]
fn test_format_result_takes_final_newline() {
    let mut state = editor("package main");
    let tick = state.document().change_tick();
    state.formatted(tick, Ok("package main\n".to_string()));
    assert_eq!(state.document().text(), "package main\n");
    assert!(state.is_dirty());
    assert_eq!(state.history().undo_len(), 1);

    let tick = state.document().change_tick();
    state.formatted(tick, Ok("package main\n".to_string()));
    assert_eq!(state.document().change_tick(), tick);
    assert_eq!(state.history().undo_len(), 1);
}

#[test]
fn test_format_without_changes_keeps_buffer_clean() {
    let mut state = editor("x := 1\r\n");
    let tick = state.document().change_tick();
    state.formatted(tick, Ok("x := 1\n".to_string()));
    assert!(!state.is_dirty());
    assert_eq!(state.document().change_tick(), tick);
    assert_eq!(state.document().text(), "x := 1\r\n");
    assert_eq!(state.status_text(), Some("formatted"));
}

#[test]
fn test_format_result_dropped_when_stale() {
    let mut state = editor("abc");
    let tick = state.document().change_tick();
    typed(&mut state, "rz");

    state.formatted(tick, Ok("formatted".to_string()));
    assert_eq!(state.document().text(), "zbc");
    assert_eq!(state.status_text(), Some("buffer changed while formatting"));
}

#[test]
fn test_format_error_is_reported() {
    let mut state = editor("abc");
    let tick = state.document().change_tick();
    state.formatted(tick, Err("rustfmt: exit status 1".to_string()));
    assert_eq!(state.status_text(), Some("rustfmt: exit status 1"));
    assert_eq!(state.document().text(), "abc");
}

#[test]
fn test_format_request_carries_tick() {
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text("x"), Some("rust".to_string()), false);
    let (_, effects) = state.run_action(crate::kernel::editor::Action::Format);
    assert_eq!(
        effects,
        vec![Effect::Format {
            language: "rust".to_string(),
            text: "x".to_string(),
            tick: state.document().change_tick(),
        }]
    );
}
