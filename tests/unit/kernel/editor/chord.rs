use super::*;
use std::path::PathBuf;

use crate::kernel::services::ports::EditorConfig;
use crate::kernel::editor::Mode;
use crate::models::Document;

fn editor(text: &str) -> EditorState {
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text(text), None, false);
    state
}

fn typed(state: &mut EditorState, keys: &str) -> Vec<Effect> {
    let mut effects = Vec::new();
    for ch in keys.chars() {
        effects.extend(state.handle_key(KeyEvent::ch(ch)).1);
    }
    effects
}

fn selected_text(state: &EditorState) -> Option<String> {
    let (start, end) = state.selection()?.range();
    Some(state.document().text_range(start, end))
}

#[test]
fn test_chord_is_pending_until_next_key() {
    let mut state = editor("one\ntwo\nthree");
    typed(&mut state, "g");
    assert_eq!(state.pending_chord(), Some(Chord::Goto));
    assert_eq!(state.pending_chord().map(Chord::label), Some("g"));

    typed(&mut state, "e");
    assert_eq!(state.pending_chord(), None);
    assert_eq!(state.cursor(), Pos::new(2, 5));

    typed(&mut state, "gg");
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_unknown_completion_reports_and_clears() {
    let mut state = editor("abc");
    typed(&mut state, "gq");
    assert_eq!(state.pending_chord(), None);
    assert_eq!(state.status_text(), Some("g q (not implemented)"));
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_escape_cancels_chord() {
    let mut state = editor("abc");
    typed(&mut state, "m");
    let (changed, effects) = state.handle_key(KeyEvent::plain(KeyCode::Esc));
    assert!(changed);
    assert!(effects.is_empty());
    assert_eq!(state.pending_chord(), None);
    assert_eq!(state.mode(), Mode::Normal);
    assert_eq!(state.status(), None);
}

#[test]
fn test_goto_line_positions() {
    let mut state = editor("  one\ntwo");
    state.place_cursor(Pos::new(0, 3));
    typed(&mut state, "gh");
    assert_eq!(state.cursor(), Pos::new(0, 0));
    typed(&mut state, "gl");
    assert_eq!(state.cursor(), Pos::new(0, 5));
    typed(&mut state, "gs");
    assert_eq!(state.cursor(), Pos::new(0, 2));
}

#[test]
fn test_match_inside_and_around_brackets() {
    let mut state = editor("f(abc)");
    state.place_cursor(Pos::new(0, 3));
    typed(&mut state, "mi(");
    assert_eq!(selected_text(&state).as_deref(), Some("abc"));

    state.place_cursor(Pos::new(0, 3));
    typed(&mut state, "ma)");
    assert_eq!(selected_text(&state).as_deref(), Some("(abc)"));
    assert_eq!(state.pending_chord(), None);
}

#[test]
fn test_match_inside_word() {
    let mut state = editor("let value = 1;");
    state.place_cursor(Pos::new(0, 6));
    typed(&mut state, "miw");
    assert_eq!(selected_text(&state).as_deref(), Some("value"));
}

#[test]
fn test_match_bracket_jump() {
    let mut state = editor("(a [b])");
    typed(&mut state, "mm");
    assert_eq!(state.cursor(), Pos::new(0, 6));
    typed(&mut state, "mm");
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_replace_char_and_selection() {
    let mut state = editor("abc");
    typed(&mut state, "rx");
    assert_eq!(state.document().text(), "xbc");

    typed(&mut state, "vllrz");
    assert_eq!(state.document().text(), "zzc");

    typed(&mut state, "u");
    assert_eq!(state.document().text(), "xbc");
    typed(&mut state, "u");
    assert_eq!(state.document().text(), "abc");
}

#[test]
fn test_view_chord_aligns_cursor_row() {
    let text = (0..100).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let mut state = editor(&text);
    state.resize(80, 12);
    state.place_cursor(Pos::new(50, 0));
    assert_eq!(state.viewport().top, 41);

    typed(&mut state, "zz");
    assert_eq!(state.viewport().top, 45);
    typed(&mut state, "zt");
    assert_eq!(state.viewport().top, 50);
    typed(&mut state, "zb");
    assert_eq!(state.viewport().top, 41);
    typed(&mut state, "zj");
    assert_eq!(state.viewport().top, 42);
}

#[test]
fn test_space_window_quit() {
    let mut state = editor("abc");
    typed(&mut state, " w");
    assert_eq!(state.pending_chord(), Some(Chord::SpaceWindow));
    assert_eq!(state.pending_chord().map(Chord::label), Some("space w"));

    let effects = typed(&mut state, "q");
    assert_eq!(effects, vec![Effect::Quit]);
}

#[test]
fn test_space_format_without_language() {
    let mut state = editor("abc");
    let effects = typed(&mut state, " f");
    assert!(effects.is_empty());
    assert_eq!(state.status_text(), Some("no formatter for this file"));
}

#[test]
fn test_goto_chord_queries_language_server() {
    let path = PathBuf::from("/work/main.go");
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(
        Some(path.clone()),
        Document::from_text("package main"),
        Some("go".to_string()),
        true,
    );

    let effects = typed(&mut state, "gr");
    assert_eq!(
        effects,
        vec![Effect::LspQuery {
            kind: LocationKind::References,
            path,
            language: "go".to_string(),
            row: 0,
            utf16_col: 0,
        }]
    );
}
