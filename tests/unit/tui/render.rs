use super::*;
use crate::core::event::KeyEvent;
use crate::kernel::services::ports::EditorConfig;
use crate::models::Document;

fn editor(text: &str, width: u16, height: u16) -> EditorState {
    let mut state = EditorState::new(EditorConfig::default());
    let _ = state.open_document(None, Document::from_text(text), None, false);
    state.resize(width, height);
    state
}

fn row_text(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn draw_once(state: &mut EditorState, width: u16, height: u16) -> (Buffer, Option<(u16, u16)>) {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    let cursor = render(&mut buf, area, state, &ThemeConfig::default());
    (buf, cursor)
}

#[test]
fn test_text_rows_have_gutter_and_expanded_tabs() {
    let mut state = editor("hello\n\tworld", 30, 6);
    let (buf, cursor) = draw_once(&mut state, 30, 6);

    assert_eq!(row_text(&buf, 0), "  1 hello");
    assert_eq!(row_text(&buf, 1), "  2     world");
    assert_eq!(cursor, Some((4, 0)));
}

#[test]
fn test_status_line_shows_mode_name_and_position() {
    let mut state = editor("abc", 40, 5);
    state.place_cursor(Pos::new(0, 2));
    let (buf, _) = draw_once(&mut state, 40, 5);

    let status = row_text(&buf, 3);
    assert!(status.starts_with(" NOR [scratch]"), "{status:?}");
    assert!(status.ends_with("text  1:3"), "{status:?}");
}

#[test]
fn test_prompt_line_owns_the_cursor() {
    let mut state = editor("abc", 40, 5);
    state.handle_key(KeyEvent::ch(':'));
    state.handle_key(KeyEvent::ch('w'));
    let (buf, cursor) = draw_once(&mut state, 40, 5);

    assert_eq!(row_text(&buf, 4), ":w");
    assert_eq!(cursor, Some((2, 4)));
    assert!(row_text(&buf, 3).starts_with(" CMD"));
}

#[test]
fn test_error_status_is_drawn_on_message_row() {
    let mut state = editor("abc", 40, 5);
    state.set_error("write failed: boom".to_string());
    let (buf, _) = draw_once(&mut state, 40, 5);

    assert_eq!(row_text(&buf, 4), "write failed: boom");
}

#[test]
fn test_picker_overlay_hides_cursor() {
    let mut state = editor("abc", 40, 10);
    state.open_branch_picker(
        "/p".into(),
        Ok(vec!["dev".to_string(), "main".to_string()]),
        Some("main"),
    );
    let (buf, cursor) = draw_once(&mut state, 40, 10);

    assert_eq!(cursor, None);
    let screen: Vec<String> = (0..10).map(|y| row_text(&buf, y)).collect();
    assert!(screen.iter().any(|row| row.contains("branches")));
    assert!(screen.iter().any(|row| row.contains("> main")));
}

#[test]
fn test_relative_gutter_labels() {
    assert_eq!(gutter_label(4, 4, 4, LineNumberMode::Rel), "  5 ");
    assert_eq!(gutter_label(2, 4, 4, LineNumberMode::Rel), "  2 ");
    assert_eq!(gutter_label(9, 4, 4, LineNumberMode::Abs), " 10 ");
    assert_eq!(gutter_label(9, 4, 0, LineNumberMode::Off), "");
}

#[test]
fn test_tiny_area_does_not_panic() {
    let mut state = editor("abc", 1, 1);
    let _ = draw_once(&mut state, 1, 1);
    let _ = draw_once(&mut state, 0, 0);
}
