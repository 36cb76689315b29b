use super::*;
use crate::kernel::services::ports::FileSession;
use crate::models::{Pos, Selection};
use tempfile::tempdir;

#[test]
fn test_missing_session_is_empty() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    assert_eq!(store.load(), SessionFile::default());
}

#[test]
fn test_save_then_load_keeps_entries() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(&dir.path().join("state"));

    let mut session = SessionFile::default();
    session.record_file(
        "/p/main.go".to_string(),
        FileSession {
            cursor_row: 3,
            cursor_col: 1,
            scroll_y: 2,
            scroll_x: 0,
            mode: "select".to_string(),
            selection: Some(Selection::new(Pos::new(3, 0), Pos::new(3, 1))),
        },
    );
    session.set_main_branch("/p".to_string(), "main".to_string());
    store.save(&mut session).unwrap();
    assert!(session.last_saved > 0);

    let loaded = store.load();
    assert_eq!(loaded, session);
    assert_eq!(loaded.active_file.as_deref(), Some("/p/main.go"));
    assert_eq!(loaded.main_branch("/p"), Some("main"));
}

#[test]
fn test_corrupt_session_is_ignored() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
    assert_eq!(SessionStore::new(dir.path()).load(), SessionFile::default());
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(SESSION_FILE),
        r#"{"files":{"/a":{"cursor_row":1,"extra":true}},"version":2}"#,
    )
    .unwrap();
    let loaded = SessionStore::new(dir.path()).load();
    assert_eq!(loaded.file("/a").map(|f| f.cursor_row), Some(1));
}
