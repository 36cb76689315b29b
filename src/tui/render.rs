//! Draws an `EditorState` into a ratatui buffer: text area with gutter,
//! status line, and the prompt/message line. The picker is an overlay on
//! the text area.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::kernel::editor::{EditorState, HighlightSpan, Mode, Picker, CHROME_ROWS};
use crate::kernel::services::ports::{LineNumberMode, Rgb, ThemeConfig};
use crate::models::Pos;

/// Resolved styles for one frame.
struct Palette<'a> {
    theme: &'a ThemeConfig,
}

impl Palette<'_> {
    fn color(&self, role: &str) -> Option<Color> {
        self.theme.get(role).map(|Rgb(r, g, b)| Color::Rgb(r, g, b))
    }

    fn base(&self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.color("foreground") {
            style = style.fg(fg);
        }
        if let Some(bg) = self.color("background") {
            style = style.bg(bg);
        }
        style
    }

    fn fg(&self, role: &str) -> Style {
        match self.color(role) {
            Some(fg) => self.base().fg(fg),
            None => self.base(),
        }
    }

    fn status(&self, mode: Mode) -> Style {
        let bg = match mode {
            Mode::Insert => "statusline-insert-bg",
            Mode::Select => "statusline-select-bg",
            _ => "statusline-bg",
        };
        let mut style = Style::default();
        if let Some(fg) = self.color("statusline-fg") {
            style = style.fg(fg);
        }
        if let Some(bg) = self.color(bg).or_else(|| self.color("statusline-bg")) {
            style = style.bg(bg);
        }
        style
    }

    fn error(&self) -> Style {
        self.base()
            .fg(self.color("error-fg").unwrap_or(Color::LightRed))
            .add_modifier(Modifier::BOLD)
    }
}

/// Renders a full frame and places the terminal cursor.
pub fn draw(frame: &mut Frame, state: &mut EditorState, theme: &ThemeConfig) {
    let area = frame.area();
    let cursor = render(frame.buffer_mut(), area, state, theme);
    if let Some((x, y)) = cursor {
        frame.set_cursor_position((x, y));
    }
}

/// Renders into `buf`. Returns the screen cell of the cursor, if visible.
pub fn render(buf: &mut Buffer, area: Rect, state: &mut EditorState, theme: &ThemeConfig) -> Option<(u16, u16)> {
    let palette = Palette { theme };
    buf.set_style(area, palette.base());
    if area.height == 0 || area.width == 0 {
        return None;
    }

    let chrome = (CHROME_ROWS as u16).min(area.height);
    let text_area = Rect {
        height: area.height - chrome,
        ..area
    };
    let mut cursor = render_text(buf, text_area, state, &palette);

    if chrome >= 1 {
        let status_row = Rect::new(area.x, area.y + text_area.height, area.width, 1);
        render_status(buf, status_row, state, &palette);
    }
    if chrome >= 2 {
        let message_row = Rect::new(area.x, area.y + text_area.height + 1, area.width, 1);
        if let Some(pos) = render_message(buf, message_row, state, &palette) {
            cursor = Some(pos);
        }
    }

    if let Some(picker) = state.picker() {
        render_picker(buf, text_area, picker, &palette);
        cursor = None;
    }
    cursor
}

fn gutter_label(row: usize, cursor_row: usize, width: usize, mode: LineNumberMode) -> String {
    let number = match mode {
        LineNumberMode::Off => return String::new(),
        LineNumberMode::Rel if row != cursor_row => row.abs_diff(cursor_row),
        _ => row + 1,
    };
    format!("{:>w$} ", number, w = width.saturating_sub(1))
}

fn span_at(spans: &[HighlightSpan], col: usize) -> Option<&HighlightSpan> {
    spans
        .iter()
        .take_while(|s| s.start_col <= col)
        .find(|s| col < s.end_col)
}

fn render_text(buf: &mut Buffer, area: Rect, state: &mut EditorState, palette: &Palette) -> Option<(u16, u16)> {
    if area.height == 0 {
        return None;
    }
    let viewport = *state.viewport();
    let gutter = state.gutter_width();
    let tab_width = state.config().tab_width.max(1);
    let line_mode = state.config().line_numbers;
    let cursor = state.cursor();
    let line_count = state.document().line_count();

    let first = viewport.top.min(line_count.saturating_sub(1));
    let last = (first + area.height as usize)
        .min(line_count)
        .saturating_sub(1);
    let highlights = state.highlights(first, last);

    let selection = state.selection();
    let search = state.search();
    let doc = state.document();
    let text_x = area.x + gutter as u16;
    let text_width = area.width.saturating_sub(gutter as u16) as usize;

    for (screen_row, row) in (first..=last).enumerate() {
        let y = area.y + screen_row as u16;
        let Some(line) = doc.line(row) else {
            break;
        };

        if gutter > 0 {
            let role = if row == cursor.row { "line-number-active-fg" } else { "line-number-fg" };
            buf.set_stringn(
                area.x,
                y,
                gutter_label(row, cursor.row, gutter, line_mode),
                gutter,
                palette.fg(role),
            );
        }

        let spans = highlights.get(&row).map(Vec::as_slice).unwrap_or_default();
        let selected = selection.and_then(|s| s.range_for_line(row, line.chars().count()));
        let matches: Vec<(usize, usize)> = search
            .matches()
            .iter()
            .filter(|(start, _)| start.row == row)
            .map(|(start, end)| (start.col, end.col))
            .collect();

        let mut vcol = 0usize;
        for (col, ch) in line.chars().enumerate() {
            let cells = if ch == '\t' { tab_width - vcol % tab_width } else { 1 };
            let mut style = match span_at(spans, col) {
                Some(span) => palette.fg(span.kind.theme_role()),
                None => palette.base(),
            };
            if matches.iter().any(|&(s, e)| s <= col && col < e) {
                if let Some(bg) = palette.color("search-match-bg") {
                    style = style.bg(bg);
                }
            }
            if selected.is_some_and(|(s, e)| s <= col && col < e) {
                if let Some(bg) = palette.color("selection-bg") {
                    style = style.bg(bg);
                }
            }
            let glyph = if ch == '\t' || ch.is_control() { ' ' } else { ch };

            for cell in 0..cells {
                let v = vcol + cell;
                if v < viewport.left {
                    continue;
                }
                let x = v - viewport.left;
                if x >= text_width {
                    break;
                }
                if let Some(c) = buf.cell_mut((text_x + x as u16, y)) {
                    c.set_char(glyph).set_style(style);
                }
            }
            vcol += cells;
            if vcol >= viewport.left + text_width {
                break;
            }
        }
    }

    if !viewport.contains_row(cursor.row) {
        return None;
    }
    let line = doc.line(cursor.row).unwrap_or_default();
    let vcol = crate::models::motion::visual_col(line, cursor.col, tab_width);
    let x = vcol.checked_sub(viewport.left).filter(|&x| x < text_width)?;
    let y = (cursor.row - viewport.top).min(area.height as usize - 1);
    Some((text_x + x as u16, area.y + y as u16))
}

fn render_status(buf: &mut Buffer, area: Rect, state: &EditorState, palette: &Palette) {
    let style = palette.status(state.mode());
    buf.set_style(area, style);

    let name = match state.path() {
        Some(path) => path
            .strip_prefix(state.repo_root())
            .unwrap_or(path)
            .display()
            .to_string(),
        None => "[scratch]".to_string(),
    };
    let dirty = if state.is_dirty() { " [+]" } else { "" };
    let left = format!(" {} {}{}", state.mode().label(), name, dirty);

    let Pos { row, col } = state.cursor();
    let branch = state
        .branch()
        .map(|b| format!("{}{}  ", state.config().git_branch_symbol, b))
        .unwrap_or_default();
    let pending = state
        .pending_chord()
        .map(|c| format!("{}  ", c.label()))
        .unwrap_or_default();
    let language = state.language().unwrap_or("text");
    let right = format!("{pending}{branch}{language}  {}:{} ", row + 1, col + 1);

    let width = area.width as usize;
    buf.set_stringn(area.x, area.y, &left, width, style);
    let right_width = UnicodeWidthStr::width(right.as_str());
    let left_width = UnicodeWidthStr::width(left.as_str());
    if left_width + right_width < width {
        let x = area.x + (width - right_width) as u16;
        buf.set_stringn(x, area.y, &right, right_width, style);
    }
}

fn render_message(buf: &mut Buffer, area: Rect, state: &EditorState, palette: &Palette) -> Option<(u16, u16)> {
    let width = area.width as usize;
    if let Some((leader, text, cursor)) = state.prompt_line() {
        let line = format!("{leader}{text}");
        buf.set_stringn(area.x, area.y, &line, width, palette.base());
        let x = (1 + cursor).min(width.saturating_sub(1));
        return Some((area.x + x as u16, area.y));
    }
    if let Some(status) = state.status() {
        let style = if status.is_error { palette.error() } else { palette.base() };
        buf.set_stringn(area.x, area.y, &status.text, width, style);
    }
    None
}

fn render_picker(buf: &mut Buffer, area: Rect, picker: &Picker, palette: &Palette) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let items = picker.items();
    let width = items
        .iter()
        .map(|i| UnicodeWidthStr::width(i.as_str()))
        .chain([picker.title().len()])
        .max()
        .unwrap_or(0) as u16
        + 4;
    let width = width.max(20).min(area.width);
    let height = (items.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    Clear.render(popup, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", picker.title()))
        .style(palette.base());
    let list = List::new(items.iter().map(|i| ListItem::new(i.as_str())))
        .block(block)
        .highlight_style(palette.status(Mode::Normal))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(picker.index()));
    StatefulWidget::render(list, popup, buf, &mut list_state);
}

#[cfg(test)]
#[path = "../../tests/unit/tui/render.rs"]
mod tests;
