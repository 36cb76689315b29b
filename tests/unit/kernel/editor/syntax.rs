use super::*;

const RUST_SRC: &str = "fn main() {\n    let x = 42; // hi\n}\n";

fn spans_are_ordered(map: &BTreeMap<usize, Vec<HighlightSpan>>) -> bool {
    map.values().all(|spans| {
        spans.iter().all(|s| s.start_col < s.end_col)
            && spans.windows(2).all(|w| w[0].end_col <= w[1].start_col)
    })
}

fn kind_at(map: &BTreeMap<usize, Vec<HighlightSpan>>, row: usize, col: usize) -> Option<TokenKind> {
    map.get(&row)?
        .iter()
        .find(|s| s.start_col <= col && col < s.end_col)
        .map(|s| s.kind)
}

#[test]
fn test_rust_tokens_are_classified() {
    let mut doc = Document::from_text(RUST_SRC);
    let mut hl = Highlighter::new(Some("rust"));
    let spans = hl.highlight(&mut doc, 0, 2);

    assert_eq!(kind_at(&spans, 0, 0), Some(TokenKind::Keyword));
    assert_eq!(kind_at(&spans, 0, 3), Some(TokenKind::Function));
    assert_eq!(kind_at(&spans, 1, 4), Some(TokenKind::Keyword));
    assert_eq!(kind_at(&spans, 1, 12), Some(TokenKind::Number));
    assert_eq!(kind_at(&spans, 1, 18), Some(TokenKind::Comment));

    let comment = spans[&1]
        .iter()
        .find(|s| s.kind == TokenKind::Comment)
        .copied()
        .unwrap();
    assert_eq!((comment.start_col, comment.end_col), (16, 21));
    assert!(spans_are_ordered(&spans));
}

#[test]
fn test_columns_are_code_points() {
    let mut doc = Document::from_text("let é = \"ü\";\n");
    let mut hl = Highlighter::new(Some("rust"));
    let spans = hl.highlight(&mut doc, 0, 0);

    let string = spans[&0]
        .iter()
        .find(|s| s.kind == TokenKind::String)
        .copied()
        .unwrap();
    assert_eq!((string.start_col, string.end_col), (8, 11));
}

#[test]
fn test_first_parse_is_full_then_incremental() {
    let mut doc = Document::from_text(RUST_SRC);
    let mut hl = Highlighter::new(Some("rust"));
    hl.sync(&mut doc);
    assert_eq!(hl.stats(), ParseStats { full: 1, incremental: 0 });
    assert_eq!(hl.parsed_tick(), Some(0));

    doc.insert_rune(Pos::new(1, 14), '0').unwrap();
    let spans = hl.highlight(&mut doc, 1, 1);
    assert_eq!(hl.stats(), ParseStats { full: 1, incremental: 1 });
    assert_eq!(hl.parsed_tick(), Some(doc.change_tick()));
    assert!(doc.last_edit().is_none());

    let number = spans[&1]
        .iter()
        .find(|s| s.kind == TokenKind::Number)
        .copied()
        .unwrap();
    assert_eq!((number.start_col, number.end_col), (12, 15));
}

#[test]
fn test_skipped_ticks_force_full_parse() {
    let mut doc = Document::from_text(RUST_SRC);
    let mut hl = Highlighter::new(Some("rust"));
    hl.sync(&mut doc);

    doc.insert_rune(Pos::new(0, 0), ' ').unwrap();
    doc.insert_rune(Pos::new(0, 0), ' ').unwrap();
    hl.sync(&mut doc);
    assert_eq!(hl.stats(), ParseStats { full: 2, incremental: 0 });
    assert_eq!(hl.parsed_tick(), Some(doc.change_tick()));
}

#[test]
fn test_current_tree_is_not_reparsed() {
    let mut doc = Document::from_text(RUST_SRC);
    let mut hl = Highlighter::new(Some("rust"));
    hl.highlight(&mut doc, 0, 2);
    hl.highlight(&mut doc, 0, 2);
    assert_eq!(hl.stats().full, 1);
}

#[test]
fn test_unknown_language_has_no_spans() {
    let mut doc = Document::from_text("whatever\n");
    let mut hl = Highlighter::new(Some("cobol"));
    assert!(!hl.has_grammar());
    assert!(hl.highlight(&mut doc, 0, 0).is_empty());

    let mut plain = Highlighter::new(None);
    assert!(plain.highlight(&mut doc, 0, 0).is_empty());
}

#[test]
fn test_oversized_document_is_not_highlighted() {
    let line = "x".repeat(1023);
    let lines = vec![line; 8 * 1024 + 1];
    let mut doc = Document::from_lines(lines);
    assert!(doc.len_bytes() > HIGHLIGHT_SIZE_LIMIT);

    let mut hl = Highlighter::new(Some("rust"));
    assert!(hl.highlight(&mut doc, 0, 10).is_empty());
    assert!(hl.is_oversized());
    assert_eq!(hl.stats().full, 0);
}

#[test]
fn test_spans_sorted_across_languages() {
    let samples = [
        ("go", "package main\n\nfunc main() {\n\tx := \"s\" + 1 // c\n}\n"),
        ("python", "def f(a, b=2):\n    return a + b  # c\n"),
        ("javascript", "const f = (a) => a.b + 1; // c\n"),
        ("json", "{\"a\": [1, true, null]}\n"),
    ];
    for (language, text) in samples {
        let mut doc = Document::from_text(text);
        let mut hl = Highlighter::new(Some(language));
        let last_row = doc.line_count() - 1;
        let spans = hl.highlight(&mut doc, 0, last_row);
        assert!(!spans.is_empty(), "{language}");
        assert!(spans_are_ordered(&spans), "{language}");
    }
}

#[test]
fn test_python_parameters() {
    let mut doc = Document::from_text("def f(a, b):\n    return a\n");
    let mut hl = Highlighter::new(Some("python"));
    let spans = hl.highlight(&mut doc, 0, 1);
    assert_eq!(kind_at(&spans, 0, 4), Some(TokenKind::Function));
    assert_eq!(kind_at(&spans, 0, 6), Some(TokenKind::Parameter));
    assert_eq!(kind_at(&spans, 0, 0), Some(TokenKind::Keyword));
}

#[test]
fn test_node_ranges_grow_outward() {
    let mut doc = Document::from_text(RUST_SRC);
    let mut hl = Highlighter::new(Some("rust"));
    let ranges = hl.node_ranges_at(&mut doc, Pos::new(1, 12));

    assert!(ranges.len() >= 3);
    assert_eq!(ranges[0].start, Pos::new(1, 12));
    assert_eq!(ranges[0].end, Pos::new(1, 14));
    for pair in ranges.windows(2) {
        assert!(pair[1].start <= pair[0].start);
        assert!(pair[1].end >= pair[0].end);
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn test_normalize_spans_clips_overlaps() {
    let mut spans = vec![
        HighlightSpan { start_col: 4, end_col: 8, kind: TokenKind::String },
        HighlightSpan { start_col: 0, end_col: 5, kind: TokenKind::Keyword },
        HighlightSpan { start_col: 8, end_col: 10, kind: TokenKind::String },
        HighlightSpan { start_col: 6, end_col: 7, kind: TokenKind::Number },
    ];
    normalize_spans(&mut spans);
    assert_eq!(
        spans,
        vec![
            HighlightSpan { start_col: 0, end_col: 5, kind: TokenKind::Keyword },
            HighlightSpan { start_col: 5, end_col: 10, kind: TokenKind::String },
        ]
    );
}
