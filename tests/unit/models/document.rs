use super::*;

fn doc(lines: &[&str]) -> Document {
    Document::from_lines(lines.iter().copied())
}

#[test]
fn test_empty_document_has_one_line() {
    let doc = Document::from_text("");
    assert_eq!(doc.line_count(), 1);
    assert_eq!(doc.line(0), Some(""));
    assert_eq!(doc.text(), "");
}

#[test]
fn test_from_text_keeps_line_ending_and_trailing_newline() {
    let doc = Document::from_text("a\r\nb\r\n");
    assert_eq!(doc.lines(), &["a".to_string(), "b".to_string()]);
    assert_eq!(doc.line_ending(), LineEnding::CrLf);
    assert_eq!(doc.text(), "a\r\nb\r\n");

    let doc = Document::from_text("x\ny");
    assert_eq!(doc.text(), "x\ny");
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let doc = Document::from_bytes(b"ok\xff\n");
    assert_eq!(doc.line(0), Some("ok\u{fffd}"));
}

#[test]
fn test_insert_rune_out_of_range() {
    let mut doc = doc(&["ab"]);
    let err = doc.insert_rune(Pos::new(0, 3), 'x').unwrap_err();
    assert_eq!(err, DocError::OutOfRange { row: 0, col: 3 });
    let err = doc.insert_rune(Pos::new(1, 0), 'x').unwrap_err();
    assert_eq!(err, DocError::OutOfRange { row: 1, col: 0 });
    assert_eq!(doc.change_tick(), 0);
    assert!(!doc.is_dirty());
}

#[test]
fn test_insert_rune_past_last_code_point() {
    let mut doc = doc(&["ab"]);
    let entry = doc.insert_rune(Pos::new(0, 2), 'é').unwrap();
    assert_eq!(doc.line(0), Some("abé"));
    assert_eq!(entry.kind, EntryKind::InsertRune);
    assert_eq!(entry.cursor_after, Pos::new(0, 3));
    assert!(doc.is_dirty());
}

#[test]
fn test_change_tick_strictly_increases() {
    let mut doc = doc(&["one", "two"]);
    let mut last = doc.change_tick();
    let mut check = |doc: &Document| {
        assert!(doc.change_tick() > last);
        last = doc.change_tick();
    };

    doc.insert_rune(Pos::new(0, 0), 'x').unwrap();
    check(&doc);
    doc.insert_text(Pos::new(1, 1), "a\nb").unwrap();
    check(&doc);
    doc.delete_range(Pos::new(0, 0), Pos::new(1, 0)).unwrap();
    check(&doc);
    doc.split_line(Pos::new(0, 1)).unwrap();
    check(&doc);
    doc.join_lines(0).unwrap();
    check(&doc);
    doc.replace_char(Pos::new(0, 0), 'z').unwrap();
    check(&doc);
    doc.indent_range(&[0], "\t").unwrap();
    check(&doc);
    doc.unindent_range(&[0], "\t").unwrap();
    check(&doc);
    doc.apply_formatted("done\n");
    check(&doc);
}

#[test]
fn test_apply_formatted_adopts_final_newline_and_line_ending() {
    let mut doc = Document::from_text("a\r\nb");
    doc.apply_formatted("a\nb\n");
    assert_eq!(doc.lines(), &["a".to_string(), "b".to_string()]);
    assert_eq!(doc.line_ending(), LineEnding::Lf);
    assert_eq!(doc.text(), "a\nb\n");
}

#[test]
fn test_insert_text_splits_lines() {
    let mut doc = doc(&["hello world"]);
    let entry = doc.insert_text(Pos::new(0, 5), ",\nbig\r\nnew").unwrap();
    assert_eq!(doc.lines(), &["hello,", "big", "new world"]);
    assert_eq!(entry.cursor_after, Pos::new(2, 3));
}

#[test]
fn test_insert_then_delete_restores_document() {
    let original = doc(&["fn main() {", "}"]);
    let mut doc = original.clone();
    let pos = Pos::new(0, 11);
    let entry = doc.insert_text(pos, "\n    let x = 1;").unwrap();
    doc.delete_range(pos, entry.cursor_after).unwrap();
    assert_eq!(doc.lines(), original.lines());
    assert_eq!(doc.text(), original.text());
}

#[test]
fn test_delete_range_merges_lines() {
    let mut doc = doc(&["abc", "def", "ghi"]);
    doc.delete_range(Pos::new(0, 1), Pos::new(2, 1)).unwrap();
    assert_eq!(doc.lines(), &["ahi"]);
}

#[test]
fn test_delete_range_rejects_reversed_range() {
    let mut doc = doc(&["abc"]);
    assert!(doc.delete_range(Pos::new(0, 2), Pos::new(0, 1)).is_err());
    assert_eq!(doc.lines(), &["abc"]);
}

#[test]
fn test_join_lines_trims_and_spaces() {
    let mut doc = doc(&["let x =", "    1;"]);
    let entry = doc.join_lines(0).unwrap();
    assert_eq!(doc.lines(), &["let x = 1;"]);
    assert_eq!(entry.cursor_after, Pos::new(0, 7));
    assert!(doc.join_lines(0).is_err());
}

#[test]
fn test_swap_lines_twice_is_identity() {
    let mut doc = doc(&["one", "two", "three"]);
    doc.swap_lines(0, 2).unwrap();
    assert_eq!(doc.lines(), &["three", "two", "one"]);
    doc.swap_lines(0, 2).unwrap();
    assert_eq!(doc.lines(), &["one", "two", "three"]);
    assert!(doc.swap_lines(0, 3).is_err());
}

#[test]
fn test_indent_and_unindent_range() {
    let mut doc = doc(&["aa", "\tbb", "cc"]);
    doc.indent_range(&[0, 1], "\t").unwrap();
    assert_eq!(doc.lines(), &["\taa", "\t\tbb", "cc"]);

    let entry = doc.unindent_range(&[0, 1, 2], "\t").unwrap();
    assert_eq!(doc.lines(), &["aa", "\tbb", "cc"]);
    assert_eq!(entry.kind, EntryKind::UnindentRange);
    assert_eq!(entry.before.len(), 3);
}

#[test]
fn test_replace_char_requires_existing_code_point() {
    let mut doc = doc(&["ab"]);
    doc.replace_char(Pos::new(0, 1), 'x').unwrap();
    assert_eq!(doc.line(0), Some("ax"));
    assert!(doc.replace_char(Pos::new(0, 2), 'y').is_err());
}

#[test]
fn test_last_edit_is_consumed_once() {
    let mut doc = doc(&["abc"]);
    doc.insert_rune(Pos::new(0, 1), 'x').unwrap();
    let edit = doc.take_last_edit().unwrap();
    assert_eq!(edit.tick, doc.change_tick());
    assert!(doc.take_last_edit().is_none());
}

#[test]
fn test_last_edit_describes_changed_bytes() {
    let mut doc = doc(&["héllo", "world"]);
    doc.insert_rune(Pos::new(1, 2), 'X').unwrap();
    let edit = doc.take_last_edit().unwrap();
    let row1 = "héllo".len() + 1;
    assert_eq!(edit.start_row, 1);
    assert_eq!(edit.start_col_bytes, 2);
    assert_eq!(edit.start_byte, row1 + 2);
    assert_eq!(edit.old_end_byte, row1 + 2);
    assert_eq!(edit.new_end_byte, row1 + 3);
    assert_eq!((edit.new_end_row, edit.new_end_col_bytes), (1, 3));

    doc.split_line(Pos::new(0, 2)).unwrap();
    let edit = doc.take_last_edit().unwrap();
    assert_eq!(edit.start_byte, "hé".len());
    assert_eq!(edit.old_end_byte, "hé".len());
    assert_eq!(edit.new_end_byte, "hé".len() + 1);
    assert_eq!((edit.new_end_row, edit.new_end_col_bytes), (1, 0));
}

#[test]
fn test_byte_and_char_columns() {
    let doc = doc(&["aé\tb"]);
    assert_eq!(doc.byte_col(0, 2), 3);
    assert_eq!(doc.char_col(0, 3), 2);
    assert_eq!(doc.byte_offset(Pos::new(0, 4)), 5);
    assert_eq!(doc.parse_text(), "aé\tb\n");
}

#[test]
fn test_text_range_spans_lines() {
    let doc = doc(&["abc", "def"]);
    assert_eq!(doc.text_range(Pos::new(0, 1), Pos::new(1, 2)), "bc\nde");
    assert_eq!(doc.text_range(Pos::new(1, 2), Pos::new(0, 1)), "bc\nde");
}

#[test]
fn test_utf16_columns() {
    let doc = doc(&["a😀b"]);
    assert_eq!(doc.utf16_col(0, 1), 1);
    assert_eq!(doc.utf16_col(0, 2), 3);
    assert_eq!(doc.utf16_col(0, 3), 4);
    assert_eq!(doc.col_from_utf16(0, 3), 2);
    assert_eq!(doc.col_from_utf16(0, 2), 1);
    assert_eq!(doc.col_from_utf16(0, 99), 3);
    assert_eq!(doc.col_from_utf16(5, 1), 0);
}
