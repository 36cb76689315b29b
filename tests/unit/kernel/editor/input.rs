use super::*;
use std::path::PathBuf;

use crate::core::event::{KeyCode, KeyEventKind, KeyModifiers};
use crate::kernel::services::ports::EditorConfig;
use crate::models::Document;

fn editor(text: &str) -> EditorState {
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text(text), None, false);
    state
}

fn lsp_editor(text: &str) -> (EditorState, PathBuf) {
    let path = PathBuf::from("/work/src/main.rs");
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(
        Some(path.clone()),
        Document::from_text(text),
        Some("rust".to_string()),
        true,
    );
    (state, path)
}

fn typed(state: &mut EditorState, keys: &str) -> Vec<Effect> {
    let mut effects = Vec::new();
    for ch in keys.chars() {
        effects.extend(state.handle_key(KeyEvent::ch(ch)).1);
    }
    effects
}

fn press(state: &mut EditorState, code: KeyCode) -> (bool, Vec<Effect>) {
    state.handle_key(KeyEvent::plain(code))
}

#[test]
fn test_insert_then_undo_as_one_group() {
    let mut state = editor("hello");
    typed(&mut state, "ihi");
    assert_eq!(state.mode(), Mode::Insert);
    assert_eq!(state.document().text(), "hihello");
    assert_eq!(state.cursor(), Pos::new(0, 2));

    press(&mut state, KeyCode::Esc);
    assert_eq!(state.mode(), Mode::Normal);
    typed(&mut state, "u");
    assert_eq!(state.document().text(), "hello");
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_word_motion_selects_crossed_span() {
    let mut state = editor("foo bar");
    typed(&mut state, "w");
    assert_eq!(state.cursor(), Pos::new(0, 4));
    assert_eq!(
        state.selection(),
        Some(Selection::new(Pos::new(0, 0), Pos::new(0, 4)))
    );

    typed(&mut state, "d");
    assert_eq!(state.document().text(), "bar");
    assert_eq!(state.register().map(|r| r.text.as_str()), Some("foo "));
}

#[test]
fn test_select_mode_extends_then_deletes() {
    let mut state = editor("hello");
    typed(&mut state, "vll");
    assert_eq!(state.mode(), Mode::Select);
    assert_eq!(
        state.selection(),
        Some(Selection::new(Pos::new(0, 0), Pos::new(0, 2)))
    );

    typed(&mut state, "d");
    assert_eq!(state.document().text(), "llo");
    assert_eq!(state.mode(), Mode::Normal);
}

#[test]
fn test_plain_motion_drops_selection() {
    let mut state = editor("foo bar");
    typed(&mut state, "w");
    assert!(state.selection().is_some());
    typed(&mut state, "h");
    assert_eq!(state.selection(), None);
    assert_eq!(state.cursor(), Pos::new(0, 3));
}

#[test]
fn test_escape_in_normal_clears_selection() {
    let mut state = editor("foo bar");
    typed(&mut state, "w");
    let (changed, _) = press(&mut state, KeyCode::Esc);
    assert!(changed);
    assert_eq!(state.selection(), None);

    let (changed, _) = press(&mut state, KeyCode::Esc);
    assert!(!changed);
}

#[test]
fn test_key_release_is_ignored() {
    let mut state = editor("abc");
    let key = KeyEvent {
        kind: KeyEventKind::Release,
        ..KeyEvent::ch('l')
    };
    assert_eq!(state.handle_key(key), (false, Vec::new()));
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_keypress_clears_status() {
    let mut state = editor("abc");
    state.set_error("boom".to_string());
    let (changed, _) = state.handle_key(KeyEvent::ch('Q'));
    assert!(changed);
    assert_eq!(state.status(), None);

    let (changed, effects) = state.handle_key(KeyEvent::ch('Q'));
    assert!(!changed);
    assert!(effects.is_empty());
}

#[test]
fn test_vertical_motion_keeps_goal_column() {
    let mut state = editor("abcdef\nab\nabcdef");
    state.place_cursor(Pos::new(0, 5));
    typed(&mut state, "j");
    assert_eq!(state.cursor(), Pos::new(1, 2));
    typed(&mut state, "j");
    assert_eq!(state.cursor(), Pos::new(2, 5));
}

#[test]
fn test_select_line_grows_by_lines() {
    let mut state = editor("one\ntwo\nthree");
    typed(&mut state, "x");
    assert_eq!(
        state.selection().map(|s| s.range()),
        Some((Pos::new(0, 0), Pos::new(1, 0)))
    );
    typed(&mut state, "x");
    assert_eq!(
        state.selection().map(|s| s.range()),
        Some((Pos::new(0, 0), Pos::new(2, 0)))
    );
    typed(&mut state, "d");
    assert_eq!(state.document().text(), "three");
}

#[test]
fn test_insert_mode_navigation_keys() {
    let mut state = editor("abc");
    typed(&mut state, "A");
    assert_eq!(state.cursor(), Pos::new(0, 3));
    press(&mut state, KeyCode::Home);
    assert_eq!(state.cursor(), Pos::new(0, 0));
    assert_eq!(state.mode(), Mode::Insert);

    state.handle_key(KeyEvent::ctrl('c'));
    assert_eq!(state.mode(), Mode::Normal);
}

#[test]
fn test_modified_navigation_falls_back_to_defaults() {
    let mut state = editor("one\ntwo\nthree");
    state.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL));
    assert_eq!(state.cursor(), Pos::new(2, 5));
    state.handle_key(KeyEvent::new(KeyCode::Home, KeyModifiers::CONTROL));
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_paste_normalizes_line_endings() {
    let mut state = editor("xy");
    typed(&mut state, "i");
    state.handle_input(InputEvent::Paste("a\r\nb".to_string()));
    assert_eq!(state.document().lines(), ["a", "bxy"]);
    assert_eq!(state.cursor(), Pos::new(1, 1));

    press(&mut state, KeyCode::Esc);
    typed(&mut state, "u");
    assert_eq!(state.document().text(), "xy");
}

#[test]
fn test_resize_event_updates_viewport() {
    let mut state = editor("abc");
    let (changed, _) = state.handle_input(InputEvent::Resize(40, 12));
    assert!(changed);
    assert_eq!(state.viewport().height, 10);
    assert_eq!(state.viewport().width, 40 - state.gutter_width());
}

#[test]
fn test_edits_report_did_change_once_per_tick() {
    let (mut state, path) = lsp_editor("fn main() {}");

    assert!(typed(&mut state, "i").is_empty());
    let effects = typed(&mut state, "x");
    assert_eq!(
        effects,
        vec![Effect::LspDidChange {
            path,
            language: "rust".to_string(),
            text: "xfn main() {}".to_string(),
        }]
    );

    let (_, effects) = press(&mut state, KeyCode::Esc);
    assert!(effects.is_empty());
}

#[test]
fn test_location_query_needs_a_server() {
    let mut state = editor("abc");
    typed(&mut state, "gd");
    assert_eq!(state.status_text(), Some("no language server for this file"));
    assert!(state.status().is_some_and(|s| s.is_error));
}

#[test]
fn test_location_query_sends_utf16_column() {
    let (mut state, path) = lsp_editor("é😀x");
    state.place_cursor(Pos::new(0, 2));
    let effects = typed(&mut state, "gd");
    assert_eq!(
        effects,
        vec![Effect::LspQuery {
            kind: LocationKind::Definition,
            path,
            language: "rust".to_string(),
            row: 0,
            utf16_col: 3,
        }]
    );
}

#[test]
fn test_show_locations_outcomes() {
    let (mut state, path) = lsp_editor("a\né😀x");

    state.show_locations(LocationKind::Definition, Ok(Vec::new()));
    assert_eq!(state.status_text(), Some("no definition found"));

    state.show_locations(LocationKind::References, Err("timed out".to_string()));
    assert_eq!(state.status_text(), Some("references: timed out"));

    let (_, effects) = state.show_locations(
        LocationKind::Definition,
        Ok(vec![Location {
            path: path.clone(),
            row: 1,
            utf16_col: 3,
        }]),
    );
    assert!(effects.is_empty());
    assert_eq!(state.cursor(), Pos::new(1, 2));

    let two = vec![
        Location {
            path: path.clone(),
            row: 0,
            utf16_col: 0,
        },
        Location {
            path,
            row: 1,
            utf16_col: 0,
        },
    ];
    state.show_locations(LocationKind::References, Ok(two));
    assert_eq!(state.mode(), Mode::Picker);
    assert_eq!(state.picker().map(|p| p.items().len()), Some(2));
}

#[test]
fn test_location_in_other_file_opens_it_unless_dirty() {
    let (mut state, _) = lsp_editor("abc");
    let other = Location {
        path: PathBuf::from("/work/src/lib.rs"),
        row: 4,
        utf16_col: 1,
    };

    let (_, effects) = state.show_locations(LocationKind::Definition, Ok(vec![other.clone()]));
    assert_eq!(
        effects,
        vec![Effect::OpenFile {
            path: other.path.clone(),
            location: Some(other.clone()),
        }]
    );

    typed(&mut state, "ix");
    press(&mut state, KeyCode::Esc);
    let (_, effects) = state.show_locations(LocationKind::Definition, Ok(vec![other]));
    assert!(effects.is_empty());
    assert!(state.status().is_some_and(|s| s.is_error));
}

#[test]
fn test_find_and_till_chars() {
    let mut state = editor("hello world");
    typed(&mut state, "fo");
    assert_eq!(state.cursor(), Pos::new(0, 4));
    typed(&mut state, "tw");
    assert_eq!(state.cursor(), Pos::new(0, 5));
    typed(&mut state, "Fh");
    assert_eq!(state.cursor(), Pos::new(0, 0));
}

#[test]
fn test_open_below_copies_indent() {
    let mut state = editor("    foo");
    typed(&mut state, "o");
    assert_eq!(state.mode(), Mode::Insert);
    assert_eq!(state.document().lines(), ["    foo", "    "]);
    assert_eq!(state.cursor(), Pos::new(1, 4));
}

#[test]
fn test_branch_picker_action_requests_branches() {
    let mut state = editor("abc");
    state.set_repo(PathBuf::from("/repo"), Some("main".to_string()));
    let (_, effects) = state.run_action(Action::BranchPicker);
    assert_eq!(
        effects,
        vec![Effect::ListBranches {
            root: PathBuf::from("/repo"),
        }]
    );
}
