//! Incremental syntax highlighting on top of tree-sitter.
//!
//! The highlighter owns the parser and the last tree. It never reads the
//! document on its own; callers hand it the document whenever spans or node
//! ranges are needed and it catches up to the document's change tick first.

use std::collections::BTreeMap;
use tree_sitter::{InputEdit, Language, Node, Parser, Point, Tree};

use crate::models::{Document, EditDescriptor, Pos};

/// Documents larger than this are not highlighted.
pub const HIGHLIGHT_SIZE_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Type,
    Function,
    Number,
    Constant,
    Operator,
    Punctuation,
    Field,
    Builtin,
    Variable,
    Parameter,
    Unknown,
}

impl TokenKind {
    pub fn theme_role(self) -> &'static str {
        match self {
            TokenKind::Keyword => "syntax-keyword",
            TokenKind::String => "syntax-string",
            TokenKind::Comment => "syntax-comment",
            TokenKind::Type => "syntax-type",
            TokenKind::Function => "syntax-function",
            TokenKind::Number => "syntax-number",
            TokenKind::Constant => "syntax-constant",
            TokenKind::Operator => "syntax-operator",
            TokenKind::Punctuation => "syntax-punctuation",
            TokenKind::Field => "syntax-field",
            TokenKind::Builtin => "syntax-builtin",
            TokenKind::Variable => "syntax-variable",
            TokenKind::Parameter => "syntax-parameter",
            TokenKind::Unknown => "foreground",
        }
    }
}

/// Half-open code point column range on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start_col: usize,
    pub end_col: usize,
    pub kind: TokenKind,
}

/// A syntax node's extent, in code point columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRange {
    pub start: Pos,
    pub end: Pos,
}

pub fn grammar(language: &str) -> Option<Language> {
    let grammar = match language {
        "rust" => tree_sitter_rust::language(),
        "go" => tree_sitter_go::language(),
        "python" => tree_sitter_python::language(),
        "c" => tree_sitter_c::language(),
        "cpp" => tree_sitter_cpp::language(),
        "java" => tree_sitter_java::language(),
        "javascript" => tree_sitter_javascript::language(),
        "typescript" => tree_sitter_typescript::language_typescript(),
        "json" => tree_sitter_json::language(),
        "toml" => tree_sitter_toml::language(),
        "bash" => tree_sitter_bash::language(),
        _ => return None,
    };
    Some(grammar)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseStats {
    pub full: usize,
    pub incremental: usize,
}

pub struct Highlighter {
    language: Option<String>,
    parser: Option<Parser>,
    tree: Option<Tree>,
    parsed_tick: u64,
    oversized: bool,
    stats: ParseStats,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("language", &self.language)
            .field("has_tree", &self.tree.is_some())
            .field("parsed_tick", &self.parsed_tick)
            .field("oversized", &self.oversized)
            .finish()
    }
}

impl Highlighter {
    pub fn new(language: Option<&str>) -> Self {
        let parser = language.and_then(grammar).and_then(|grammar| {
            let mut parser = Parser::new();
            parser.set_language(grammar).ok()?;
            Some(parser)
        });
        if let (Some(name), None) = (language, parser.as_ref()) {
            tracing::debug!(language = name, "no grammar; highlighting disabled");
        }

        Self {
            language: language.map(str::to_string),
            parser,
            tree: None,
            parsed_tick: 0,
            oversized: false,
            stats: ParseStats::default(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn has_grammar(&self) -> bool {
        self.parser.is_some()
    }

    pub fn is_oversized(&self) -> bool {
        self.oversized
    }

    /// Tick of the document state the current tree reflects.
    pub fn parsed_tick(&self) -> Option<u64> {
        self.tree.as_ref().map(|_| self.parsed_tick)
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Brings the tree up to `doc`'s change tick. Consumes the document's last
    /// edit descriptor.
    pub fn sync(&mut self, doc: &mut Document) {
        let edit = doc.take_last_edit();
        let tick = doc.change_tick();

        if doc.len_bytes() > HIGHLIGHT_SIZE_LIMIT {
            if !self.oversized {
                tracing::info!(bytes = doc.len_bytes(), "document too large to highlight");
            }
            self.oversized = true;
            self.tree = None;
            return;
        }
        self.oversized = false;

        let Some(parser) = self.parser.as_mut() else {
            return;
        };

        if self.tree.is_some() && tick == self.parsed_tick {
            return;
        }
        let follows_tree = self.tree.is_some() && tick == self.parsed_tick + 1;
        let edit = edit.filter(|edit| follows_tree && edit.tick == tick);
        let old_tree = match (self.tree.as_mut(), edit) {
            (Some(tree), Some(edit)) => {
                tree.edit(&input_edit(&edit));
                Some(&*tree)
            }
            _ => None,
        };

        let incremental = old_tree.is_some();
        let text = doc.parse_text();
        match parser.parse(&text, old_tree) {
            Some(tree) => {
                if incremental {
                    self.stats.incremental += 1;
                } else {
                    self.stats.full += 1;
                }
                tracing::debug!(tick, incremental, "reparsed");
                self.tree = Some(tree);
                self.parsed_tick = tick;
            }
            None => {
                tracing::warn!(tick, "parse failed");
                self.tree = None;
            }
        }
    }

    /// Spans for rows `start_row..=end_row`, keyed by row. Rows without spans
    /// are absent.
    pub fn highlight(
        &mut self,
        doc: &mut Document,
        start_row: usize,
        end_row: usize,
    ) -> BTreeMap<usize, Vec<HighlightSpan>> {
        self.sync(doc);
        let mut out = BTreeMap::new();
        let (Some(tree), Some(language)) = (self.tree.as_ref(), self.language.as_deref()) else {
            return out;
        };
        if start_row >= doc.line_count() || start_row > end_row {
            return out;
        }
        let end_row = end_row.min(doc.line_count() - 1);

        let line_starts = line_starts(doc, start_row, end_row);
        let range_start = line_starts[0];
        let range_end = line_starts[line_starts.len() - 1];
        let source = doc.parse_text();

        let mut raw = Vec::new();
        collect_tokens(
            language,
            tree.root_node(),
            source.as_bytes(),
            range_start,
            range_end,
            &mut raw,
        );

        for (start, end, kind) in raw {
            let first = start_row + line_index(&line_starts, start.max(range_start));
            let last = start_row + line_index(&line_starts, end.saturating_sub(1).min(range_end - 1));
            for row in first..=last {
                let line_start = line_starts[row - start_row];
                let line_end = line_starts[row - start_row + 1] - 1;
                let s = start.max(line_start);
                let e = end.min(line_end);
                if s >= e {
                    continue;
                }
                out.entry(row).or_insert_with(Vec::new).push(HighlightSpan {
                    start_col: doc.char_col(row, s - line_start),
                    end_col: doc.char_col(row, e - line_start),
                    kind,
                });
            }
        }

        for spans in out.values_mut() {
            normalize_spans(spans);
        }
        out.retain(|_, spans| !spans.is_empty());
        out
    }

    /// Named nodes covering `pos`, innermost first. Nodes with identical
    /// extents are reported once.
    pub fn node_ranges_at(&mut self, doc: &mut Document, pos: Pos) -> Vec<NodeRange> {
        self.sync(doc);
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        let pos = doc.clamp(pos);
        let point = Point {
            row: pos.row,
            column: doc.byte_col(pos.row, pos.col),
        };
        let Some(mut node) = tree
            .root_node()
            .named_descendant_for_point_range(point, point)
        else {
            return Vec::new();
        };

        let mut ranges: Vec<NodeRange> = Vec::new();
        loop {
            let range = node_range(doc, node);
            if ranges.last() != Some(&range) {
                ranges.push(range);
            }
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        ranges
    }
}

fn input_edit(edit: &EditDescriptor) -> InputEdit {
    InputEdit {
        start_byte: edit.start_byte,
        old_end_byte: edit.old_end_byte,
        new_end_byte: edit.new_end_byte,
        start_position: Point {
            row: edit.start_row,
            column: edit.start_col_bytes,
        },
        old_end_position: Point {
            row: edit.old_end_row,
            column: edit.old_end_col_bytes,
        },
        new_end_position: Point {
            row: edit.new_end_row,
            column: edit.new_end_col_bytes,
        },
    }
}

fn node_range(doc: &Document, node: Node<'_>) -> NodeRange {
    let to_pos = |p: Point| {
        if p.row >= doc.line_count() {
            return doc.end_pos();
        }
        Pos::new(p.row, doc.char_col(p.row, p.column))
    };
    NodeRange {
        start: to_pos(node.start_position()),
        end: to_pos(node.end_position()),
    }
}

/// Parse-text offsets of rows `start_row..=end_row + 1`.
fn line_starts(doc: &Document, start_row: usize, end_row: usize) -> Vec<usize> {
    let mut offset = doc.byte_offset(Pos::new(start_row, 0));
    let mut starts = Vec::with_capacity(end_row - start_row + 2);
    starts.push(offset);
    for row in start_row..=end_row {
        offset += doc.line(row).map_or(0, str::len) + 1;
        starts.push(offset);
    }
    starts
}

fn line_index(starts: &[usize], byte: usize) -> usize {
    match starts.binary_search(&byte) {
        Ok(i) => i.min(starts.len() - 2),
        Err(i) => i.saturating_sub(1).min(starts.len() - 2),
    }
}

/// Sorts by start, clips overlaps against the previous span and merges
/// touching spans of the same kind.
fn normalize_spans(spans: &mut Vec<HighlightSpan>) {
    spans.sort_by(|a, b| a.start_col.cmp(&b.start_col).then(b.end_col.cmp(&a.end_col)));
    let mut out: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for mut span in spans.drain(..) {
        if let Some(prev) = out.last_mut() {
            if span.start_col < prev.end_col {
                span.start_col = prev.end_col;
            }
            if span.start_col >= span.end_col {
                continue;
            }
            if prev.kind == span.kind && prev.end_col == span.start_col {
                prev.end_col = span.end_col;
                continue;
            }
        }
        if span.start_col < span.end_col {
            out.push(span);
        }
    }
    *spans = out;
}

fn collect_tokens(
    language: &str,
    root: Node<'_>,
    source: &[u8],
    start_byte: usize,
    end_byte: usize,
    out: &mut Vec<(usize, usize, TokenKind)>,
) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.end_byte() <= start_byte || node.start_byte() >= end_byte {
            continue;
        }

        let kind = node.kind();
        let whole = is_comment_kind(kind) || is_string_kind(kind);
        if whole || node.child_count() == 0 {
            if node.start_byte() < node.end_byte() {
                out.push((
                    node.start_byte(),
                    node.end_byte(),
                    classify(language, node, source),
                ));
            }
            continue;
        }

        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
}

fn classify(language: &str, node: Node<'_>, source: &[u8]) -> TokenKind {
    let kind = node.kind();
    if is_comment_kind(kind) {
        return TokenKind::Comment;
    }
    if is_string_kind(kind) || kind == "escape_sequence" {
        return TokenKind::String;
    }
    if is_number_kind(kind) {
        return TokenKind::Number;
    }
    if is_constant_kind(kind) {
        return TokenKind::Constant;
    }

    if !node.is_named() {
        if is_keyword(language, kind) {
            return TokenKind::Keyword;
        }
        if is_punctuation(kind) {
            return TokenKind::Punctuation;
        }
        if is_operator(kind) {
            return TokenKind::Operator;
        }
        return TokenKind::Unknown;
    }

    match kind {
        "type_identifier" | "type" | "namespace_identifier" | "package_identifier" => {
            TokenKind::Type
        }
        "primitive_type" | "predefined_type" | "builtin_type" | "self" | "super" | "crate"
        | "this" | "metavariable" => TokenKind::Builtin,
        "field_identifier" | "property_identifier" | "shorthand_field_identifier"
        | "shorthand_property_identifier" | "bare_key" | "variable_name" => TokenKind::Field,
        "identifier" => identifier_kind(node, source),
        "command_name" => TokenKind::Function,
        _ => TokenKind::Unknown,
    }
}

fn identifier_kind(node: Node<'_>, source: &[u8]) -> TokenKind {
    let Some(parent) = node.parent() else {
        return TokenKind::Variable;
    };

    let is_field = |name: &str| parent.child_by_field_name(name) == Some(node);
    match parent.kind() {
        "function_item"
        | "function_signature_item"
        | "function_declaration"
        | "function_definition"
        | "method_declaration"
        | "method_definition"
        | "function_declarator"
            if is_field("name") || is_field("declarator") =>
        {
            return TokenKind::Function;
        }
        "call_expression" | "call" | "method_invocation" if is_field("function") || is_field("name") => {
            return TokenKind::Function;
        }
        "macro_invocation" | "macro_definition" => return TokenKind::Function,
        "parameter" | "parameters" | "parameter_declaration" | "formal_parameter"
        | "required_parameter" | "optional_parameter" | "typed_parameter"
        | "default_parameter" | "closure_parameters" | "formal_parameters" => {
            return TokenKind::Parameter;
        }
        _ => {}
    }

    let text = node.utf8_text(source).unwrap_or_default();
    if text.len() > 1
        && text.chars().any(|c| c.is_ascii_uppercase())
        && text
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    {
        TokenKind::Constant
    } else {
        TokenKind::Variable
    }
}

fn is_comment_kind(kind: &str) -> bool {
    kind.contains("comment")
}

fn is_string_kind(kind: &str) -> bool {
    kind.contains("string")
        || matches!(
            kind,
            "char_literal" | "byte_literal" | "rune_literal" | "character_literal" | "raw_string"
        )
}

fn is_number_kind(kind: &str) -> bool {
    kind.contains("integer")
        || kind.contains("float")
        || kind.contains("number")
        || (kind.ends_with("_literal") && (kind.contains("int") || kind.contains("imaginary")))
}

fn is_constant_kind(kind: &str) -> bool {
    matches!(
        kind,
        "true" | "false" | "True" | "False" | "None" | "nil" | "null" | "undefined" | "iota"
            | "boolean"
    )
}

fn is_punctuation(kind: &str) -> bool {
    matches!(
        kind,
        "(" | ")" | "[" | "]" | "{" | "}" | "," | ";" | "." | ":" | "::" | "\"" | "'" | "#"
    )
}

fn is_operator(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .chars()
            .all(|c| matches!(c, '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '^' | '~' | '?' | '@' | ':' | '.'))
}

fn is_keyword(language: &str, kind: &str) -> bool {
    if !kind.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return false;
    }
    match language {
        "rust" => is_rust_keyword(kind),
        "go" => is_go_keyword(kind),
        "python" => is_python_keyword(kind),
        "javascript" | "typescript" => is_js_ts_keyword(kind),
        "c" | "cpp" | "java" => is_c_family_keyword(kind),
        "bash" => is_bash_keyword(kind),
        _ => false,
    }
}

fn is_rust_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
    )
}

fn is_go_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

fn is_python_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "and"
            | "as"
            | "assert"
            | "async"
            | "await"
            | "break"
            | "case"
            | "class"
            | "continue"
            | "def"
            | "del"
            | "elif"
            | "else"
            | "except"
            | "finally"
            | "for"
            | "from"
            | "global"
            | "if"
            | "import"
            | "in"
            | "is"
            | "lambda"
            | "match"
            | "nonlocal"
            | "not"
            | "or"
            | "pass"
            | "raise"
            | "return"
            | "try"
            | "while"
            | "with"
            | "yield"
    )
}

fn is_js_ts_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "async"
            | "await"
            | "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "export"
            | "extends"
            | "finally"
            | "for"
            | "from"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "interface"
            | "let"
            | "new"
            | "of"
            | "private"
            | "protected"
            | "public"
            | "readonly"
            | "return"
            | "static"
            | "switch"
            | "throw"
            | "try"
            | "type"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "yield"
    )
}

fn is_c_family_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "extends"
            | "extern"
            | "final"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "inline"
            | "interface"
            | "namespace"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "sizeof"
            | "static"
            | "struct"
            | "switch"
            | "template"
            | "throw"
            | "throws"
            | "try"
            | "typedef"
            | "typename"
            | "union"
            | "using"
            | "virtual"
            | "void"
            | "volatile"
            | "while"
    )
}

fn is_bash_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "case"
            | "do"
            | "done"
            | "elif"
            | "else"
            | "esac"
            | "export"
            | "fi"
            | "for"
            | "function"
            | "if"
            | "in"
            | "local"
            | "then"
            | "until"
            | "while"
    )
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/syntax.rs"]
mod tests;
