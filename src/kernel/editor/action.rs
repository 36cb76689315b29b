//! Symbolic editor actions, named the way keymaps refer to them.

macro_rules! actions {
    ($($variant:ident => $name:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Action {
            $($variant,)*
        }

        impl Action {
            pub const ALL: &'static [Action] = &[$(Action::$variant,)*];

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Action::$variant),)*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Action::$variant => $name,)*
                }
            }
        }
    };
}

actions! {
    // ==================== motion ====================
    MoveLeft => "move_left",
    MoveRight => "move_right",
    MoveUp => "move_up",
    MoveDown => "move_down",
    MoveWordLeft => "move_word_left",
    MoveWordRight => "move_word_right",
    WordForward => "word_forward",
    WordBackward => "word_backward",
    WordEnd => "word_end",
    LineStart => "line_start",
    LineEnd => "line_end",
    FirstNonBlank => "first_non_blank",
    FileStart => "file_start",
    FileEnd => "file_end",
    PageUp => "page_up",
    PageDown => "page_down",
    HalfPageUp => "half_page_up",
    HalfPageDown => "half_page_down",
    MatchBracket => "match_bracket",

    // ==================== modes ====================
    NormalMode => "normal_mode",
    InsertMode => "insert_mode",
    AppendMode => "append_mode",
    InsertLineStart => "insert_line_start",
    AppendLineEnd => "append_line_end",
    OpenBelow => "open_below",
    OpenAbove => "open_above",
    SelectMode => "select_mode",
    CommandMode => "command_mode",
    SearchForward => "search_forward",
    SearchBackward => "search_backward",
    SearchNext => "search_next",
    SearchPrev => "search_prev",
    BranchPicker => "branch_picker",

    // ==================== selection ====================
    SelectLine => "select_line",
    SelectAll => "select_all",
    CollapseSelection => "collapse_selection",
    ExpandSelection => "expand_selection",
    ShrinkSelection => "shrink_selection",

    // ==================== edits ====================
    DeleteSelection => "delete_selection",
    ChangeSelection => "change_selection",
    DeleteLine => "delete_line",
    DeleteChar => "delete_char",
    DeleteBackward => "delete_backward",
    DeleteForward => "delete_forward",
    InsertNewline => "insert_newline",
    JoinLines => "join_lines",
    MoveLineUp => "move_line_up",
    MoveLineDown => "move_line_down",
    Indent => "indent",
    Unindent => "unindent",
    Undo => "undo",
    Redo => "redo",
    Yank => "yank",
    PasteAfter => "paste_after",
    PasteBefore => "paste_before",
    Format => "format",

    // ==================== chords ====================
    GotoMode => "goto_mode",
    MatchMode => "match_mode",
    ViewMode => "view_mode",
    SpaceMode => "space_mode",
    FindChar => "find_char",
    FindCharBackward => "find_char_backward",
    TillChar => "till_char",
    TillCharBackward => "till_char_backward",
    Replace => "replace",

    // ==================== view ====================
    AlignCenter => "align_view_center",
    AlignTop => "align_view_top",
    AlignBottom => "align_view_bottom",
    ScrollDown => "scroll_down",
    ScrollUp => "scroll_up",

    // ==================== language server ====================
    GotoDefinition => "goto_definition",
    GotoDeclaration => "goto_declaration",
    GotoTypeDefinition => "goto_type_definition",
    GotoImplementation => "goto_implementation",
    GotoReferences => "goto_references",

    // ==================== app ====================
    Save => "save",
    Quit => "quit",
}

impl Action {
    pub fn is_known(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    /// Motions extend the selection in select mode instead of moving the caret.
    pub fn is_motion(self) -> bool {
        matches!(
            self,
            Action::MoveLeft
                | Action::MoveRight
                | Action::MoveUp
                | Action::MoveDown
                | Action::MoveWordLeft
                | Action::MoveWordRight
                | Action::WordForward
                | Action::WordBackward
                | Action::WordEnd
                | Action::LineStart
                | Action::LineEnd
                | Action::FirstNonBlank
                | Action::FileStart
                | Action::FileEnd
                | Action::PageUp
                | Action::PageDown
                | Action::HalfPageUp
                | Action::HalfPageDown
                | Action::MatchBracket
        )
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/action.rs"]
mod tests;
