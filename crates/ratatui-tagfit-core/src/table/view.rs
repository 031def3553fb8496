use std::collections::BTreeSet;

use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use crate::theme::Theme;
use crate::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;

const HORIZ_STEP: i32 = 4;
const CHECKBOX_COLS: u16 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableAction {
    None,
    Redraw,
    /// Enter was pressed on a row; carries the absolute row index.
    Activated(usize),
    SelectionChanged,
}

/// Column configuration for [`TableView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub title: String,
    pub width: u16,
}

impl TableColumn {
    pub fn new(title: impl Into<String>, width: u16) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

/// Horizontal scroll boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollX {
    /// Content keeps its natural width; the visible window scrolls over it.
    #[default]
    MaxContent,
    /// The visible window is at most this many columns wide.
    Fixed(u16),
}

/// Scroll boundaries of the table body.
///
/// `y` is the body height limit. It is signed and stored as given: a negative limit renders no
/// body rows but is kept unchanged so callers can observe it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollBounds {
    pub y: Option<i32>,
    pub x: ScrollX,
}

/// Options for [`TableView`].
#[derive(Clone, Debug)]
pub struct TableOptions {
    pub columns: Vec<TableColumn>,
    pub show_header: bool,
    pub show_scrollbar_y: bool,
    /// Rows per page; `None` shows every row in one scrollable page.
    pub page_size: Option<usize>,
    /// Checkbox-style selection of any number of rows.
    pub multi_select: bool,
    pub col_gap: u16,
    pub scroll: ScrollBounds,
    pub style: Style,
    pub header_style: Style,
    pub footer_style: Style,
    pub scrollbar_style: Style,
    pub cursor_style: Style,
    pub selected_style: Style,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            show_header: true,
            show_scrollbar_y: true,
            page_size: None,
            multi_select: false,
            col_gap: 1,
            scroll: ScrollBounds::default(),
            style: Style::default(),
            header_style: Style::default().add_modifier(Modifier::BOLD),
            footer_style: Style::default(),
            scrollbar_style: Style::default(),
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            selected_style: Style::default().add_modifier(Modifier::BOLD),
        }
    }
}

/// A table of string cells with a cursor row, row selection and optional pagination.
///
/// Like the other widgets in this crate it is driven by the app loop through `handle_event` and
/// `render`. Scrolling is tracked in [`TableView::state`], relative to the current page.
#[derive(Clone, Debug, Default)]
pub struct TableView {
    pub state: ViewportState,
    options: TableOptions,
    rows: Vec<Vec<String>>,
    cursor: Option<usize>,
    selected: BTreeSet<usize>,
    page: usize,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TableOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Replaces the configuration. Rows, cursor, selection and page are kept (clamped to the new
    /// page size).
    pub fn set_options(&mut self, options: TableOptions) {
        self.options = options;
        self.page = self.page.min(self.page_count().saturating_sub(1));
        self.clamp_cursor();
        self.state.clamp();
    }

    pub fn scroll_bounds(&self) -> ScrollBounds {
        self.options.scroll
    }

    /// Overrides only the scroll boundaries, leaving every other option untouched.
    pub fn set_scroll_bounds(&mut self, scroll: ScrollBounds) {
        self.options.scroll = scroll;
    }

    pub fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.rows = rows;
        let len = self.rows.len();
        self.selected.retain(|&r| r < len);
        self.page = self.page.min(self.page_count().saturating_sub(1));
        self.clamp_cursor();
        self.state.to_top();
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set_cursor(&mut self, row: Option<usize>) {
        self.cursor = row.filter(|&r| r < self.rows.len());
        if let (Some(r), Some(size)) = (self.cursor, self.page_size()) {
            self.page = r / size;
        }
        self.ensure_cursor_visible();
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        match self.page_size() {
            Some(size) => self.rows.len().div_ceil(size).max(1),
            None => 1,
        }
    }

    /// Switches to `page` (clamped) and moves the cursor to its first row.
    pub fn set_page(&mut self, page: usize) -> bool {
        let page = page.min(self.page_count().saturating_sub(1));
        if page == self.page {
            return false;
        }
        self.page = page;
        let range = self.page_range();
        self.cursor = (!range.is_empty()).then_some(range.start);
        self.state.to_top();
        true
    }

    /// Absolute row indices shown on the current page.
    pub fn page_range(&self) -> std::ops::Range<usize> {
        match self.page_size() {
            Some(size) => {
                let start = (self.page * size).min(self.rows.len());
                start..(start + size).min(self.rows.len())
            }
            None => 0..self.rows.len(),
        }
    }

    /// `"{first}-{last} of {total} items"` for the current page.
    pub fn page_summary(&self) -> String {
        let range = self.page_range();
        if range.is_empty() {
            return format!("0 of {} items", self.rows.len());
        }
        format!(
            "{}-{} of {} items",
            range.start + 1,
            range.end,
            self.rows.len()
        )
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TableAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(_)
            | InputEvent::Mouse(_)
            | InputEvent::FocusGained
            | InputEvent::FocusLost
            | InputEvent::Resize { .. } => TableAction::None,
        }
    }

    /// Body rows that fit in `area_height` after header, footer and the vertical bound.
    pub fn body_height(&self, area_height: u16) -> u16 {
        let chrome = self.header_height() + self.footer_height();
        let available = area_height.saturating_sub(chrome);
        match self.options.scroll.y {
            Some(limit) => available.min(limit.clamp(0, u16::MAX as i32) as u16),
            None => available,
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let base_style = if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        let header_style = self.options.header_style.patch(theme.accent);
        let cursor_style = self.options.cursor_style.patch(theme.accent);
        let selected_style = self.options.selected_style.patch(theme.accent);
        let footer_style = self.options.footer_style.patch(theme.text_muted);

        let (content_area, scrollbar_x) = if self.options.show_scrollbar_y && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        };

        let prefix_w = if self.options.multi_select {
            CHECKBOX_COLS.min(content_area.width)
        } else {
            0
        };
        let avail_w = content_area.width - prefix_w;
        let view_w = match self.options.scroll.x {
            ScrollX::MaxContent => avail_w,
            ScrollX::Fixed(w) => avail_w.min(w),
        };

        let header_h = self.header_height().min(content_area.height);
        let body_h = self.body_height(content_area.height);
        let range = self.page_range();
        let content_w = self.content_width();
        self.state.set_viewport(view_w, body_h);
        self.state.set_content(content_w, range.len() as u32);
        self.ensure_cursor_visible();

        buf.set_style(content_area, base_style);

        let text_x = content_area.x + prefix_w;
        if header_h > 0 {
            let y = content_area.y;
            buf.set_style(Rect::new(content_area.x, y, content_area.width, 1), header_style);
            let line = self.format_row(self.options.columns.iter().map(|c| c.title.as_str()));
            render::render_str_clipped(text_x, y, self.state.x, view_w, buf, &line, header_style);
        }

        let body_y = content_area.y + header_h;
        for dy in 0..body_h {
            let idx = range.start + self.state.y as usize + dy as usize;
            if idx >= range.end {
                break;
            }
            let y = body_y + dy;
            let mut style = base_style;
            if self.selected.contains(&idx) {
                style = style.patch(selected_style);
            }
            if self.cursor == Some(idx) {
                style = style.patch(cursor_style);
            }
            buf.set_style(Rect::new(content_area.x, y, content_area.width, 1), style);
            if prefix_w > 0 {
                let mark = if self.selected.contains(&idx) {
                    "[x] "
                } else {
                    "[ ] "
                };
                render::render_str_clipped(content_area.x, y, 0, prefix_w, buf, mark, style);
            }
            let row = &self.rows[idx];
            let line = self.format_row(row.iter().map(String::as_str));
            render::render_str_clipped(text_x, y, self.state.x, view_w, buf, &line, style);
        }

        if self.footer_height() > 0 {
            let shown = (range.len() as u32)
                .saturating_sub(self.state.y)
                .min(body_h as u32) as u16;
            let y = body_y + shown;
            if y < content_area.y + content_area.height {
                let text = format!(
                    "{}  page {}/{}",
                    self.page_summary(),
                    self.page + 1,
                    self.page_count()
                );
                render::render_str_clipped(
                    content_area.x,
                    y,
                    0,
                    content_area.width,
                    buf,
                    &text,
                    footer_style,
                );
            }
        }

        if let Some(sb_x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(sb_x, body_y, 1, body_h),
                buf,
                &self.state,
                self.options.scrollbar_style,
            );
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> TableAction {
        if key.modifiers.ctrl || key.modifiers.alt {
            return TableAction::None;
        }
        let range = self.page_range();
        if range.is_empty() {
            return match key.code {
                KeyCode::Char('n') => self.page_action(self.page + 1),
                KeyCode::Char('p') => self.page_action(self.page.saturating_sub(1)),
                _ => TableAction::None,
            };
        }

        let page_step = self.state.viewport_h.saturating_sub(1).max(1) as isize;
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_by(-1),
            KeyCode::PageDown => self.move_cursor_by(page_step),
            KeyCode::PageUp => self.move_cursor_by(-page_step),
            KeyCode::Home | KeyCode::Char('g') => self.move_cursor_to(range.start),
            KeyCode::End | KeyCode::Char('G') => self.move_cursor_to(range.end - 1),
            KeyCode::Left | KeyCode::Char('h') => {
                self.state.scroll_x_by(-HORIZ_STEP);
                TableAction::Redraw
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.state.scroll_x_by(HORIZ_STEP);
                TableAction::Redraw
            }
            KeyCode::Char('n') => self.page_action(self.page + 1),
            KeyCode::Char('p') => self.page_action(self.page.saturating_sub(1)),
            KeyCode::Char(' ') => self.toggle_selection(),
            KeyCode::Enter => match self.cursor {
                Some(row) => TableAction::Activated(row),
                None => TableAction::None,
            },
            _ => TableAction::None,
        }
    }

    fn page_action(&mut self, page: usize) -> TableAction {
        if self.set_page(page) {
            TableAction::Redraw
        } else {
            TableAction::None
        }
    }

    fn toggle_selection(&mut self) -> TableAction {
        let Some(row) = self.cursor else {
            return TableAction::None;
        };
        if self.options.multi_select {
            if !self.selected.remove(&row) {
                self.selected.insert(row);
            }
        } else if self.selected.contains(&row) {
            self.selected.clear();
        } else {
            self.selected.clear();
            self.selected.insert(row);
        }
        TableAction::SelectionChanged
    }

    fn move_cursor_by(&mut self, delta: isize) -> TableAction {
        let range = self.page_range();
        let current = self.cursor.unwrap_or(range.start) as isize;
        let next = (current + delta).clamp(range.start as isize, range.end as isize - 1) as usize;
        self.move_cursor_to(next)
    }

    fn move_cursor_to(&mut self, row: usize) -> TableAction {
        if self.cursor == Some(row) {
            return TableAction::None;
        }
        self.cursor = Some(row);
        self.ensure_cursor_visible();
        TableAction::Redraw
    }

    fn ensure_cursor_visible(&mut self) {
        let range = self.page_range();
        if let Some(c) = self.cursor
            && range.contains(&c)
        {
            self.state.ensure_row_visible((c - range.start) as u32);
        }
    }

    fn clamp_cursor(&mut self) {
        let range = self.page_range();
        self.cursor = match self.cursor {
            Some(c) if range.contains(&c) => Some(c),
            _ if !range.is_empty() => Some(range.start),
            _ => None,
        };
    }

    fn page_size(&self) -> Option<usize> {
        self.options.page_size.filter(|&s| s > 0)
    }

    fn header_height(&self) -> u16 {
        u16::from(self.options.show_header)
    }

    fn footer_height(&self) -> u16 {
        u16::from(self.page_size().is_some())
    }

    fn content_width(&self) -> u32 {
        let cols = &self.options.columns;
        let widths: u32 = cols.iter().map(|c| c.width as u32).sum();
        widths + (cols.len().saturating_sub(1) as u32) * self.options.col_gap as u32
    }

    fn format_row<'a>(&self, cells: impl Iterator<Item = &'a str>) -> String {
        let mut line = String::new();
        let gap = " ".repeat(self.options.col_gap as usize);
        for (i, (col, text)) in self.options.columns.iter().zip(cells).enumerate() {
            if i > 0 {
                line.push_str(&gap);
            }
            let cell = render::slice_by_cols(text, 0, col.width);
            let pad = (col.width as usize).saturating_sub(unicode_width::UnicodeWidthStr::width(
                cell.as_str(),
            ));
            line.push_str(&cell);
            line.extend(std::iter::repeat_n(' ', pad));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    fn sample(rows: usize, options: TableOptions) -> TableView {
        let mut t = TableView::with_options(TableOptions {
            columns: vec![TableColumn::new("Name", 6), TableColumn::new("Age", 3)],
            ..options
        });
        t.set_rows(
            (1..=rows)
                .map(|i| vec![format!("emp{i}"), format!("{}", 20 + i)])
                .collect(),
        );
        t
    }

    fn row_text(buf: &Buffer, y: u16, w: u16) -> String {
        (0..w)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn paginates_rows() {
        let mut t = sample(
            45,
            TableOptions {
                page_size: Some(20),
                ..Default::default()
            },
        );
        assert_eq!(t.page_count(), 3);
        assert_eq!(t.page_summary(), "1-20 of 45 items");
        assert_eq!(t.handle_event(key(KeyCode::Char('n'))), TableAction::Redraw);
        assert_eq!(t.handle_event(key(KeyCode::Char('n'))), TableAction::Redraw);
        assert_eq!(t.page_summary(), "41-45 of 45 items");
        assert_eq!(t.cursor(), Some(40));
        assert_eq!(t.handle_event(key(KeyCode::Char('n'))), TableAction::None);
    }

    #[test]
    fn cursor_stays_within_page() {
        let mut t = sample(
            10,
            TableOptions {
                page_size: Some(4),
                ..Default::default()
            },
        );
        t.handle_event(key(KeyCode::End));
        assert_eq!(t.cursor(), Some(3));
        assert_eq!(t.handle_event(key(KeyCode::Down)), TableAction::None);
        assert_eq!(t.cursor(), Some(3));
    }

    #[test]
    fn multi_select_toggles_rows() {
        let mut t = sample(
            5,
            TableOptions {
                multi_select: true,
                ..Default::default()
            },
        );
        t.handle_event(key(KeyCode::Down));
        assert_eq!(
            t.handle_event(key(KeyCode::Char(' '))),
            TableAction::SelectionChanged
        );
        t.handle_event(key(KeyCode::Down));
        t.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(t.selected_rows(), vec![1, 2]);
        t.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(t.selected_rows(), vec![1]);
    }

    #[test]
    fn enter_activates_cursor_row() {
        let mut t = sample(3, TableOptions::default());
        t.handle_event(key(KeyCode::Down));
        t.handle_event(key(KeyCode::Down));
        assert_eq!(t.handle_event(key(KeyCode::Enter)), TableAction::Activated(2));
    }

    #[test]
    fn vertical_bound_limits_body_rows() {
        let mut t = sample(
            10,
            TableOptions {
                show_scrollbar_y: false,
                scroll: ScrollBounds {
                    y: Some(3),
                    x: ScrollX::MaxContent,
                },
                ..Default::default()
            },
        );
        let area = Rect::new(0, 0, 12, 8);
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        assert_eq!(row_text(&buf, 0, 10), "Name   Age");
        assert_eq!(row_text(&buf, 3, 10), "emp3   23 ");
        assert_eq!(row_text(&buf, 4, 10), "          ");
        assert_eq!(t.state.viewport_h, 3);
    }

    #[test]
    fn negative_bound_renders_header_only() {
        let mut t = sample(
            4,
            TableOptions {
                scroll: ScrollBounds {
                    y: Some(-100),
                    x: ScrollX::MaxContent,
                },
                ..Default::default()
            },
        );
        assert_eq!(t.body_height(20), 0);
        assert_eq!(t.scroll_bounds().y, Some(-100));
        let area = Rect::new(0, 0, 12, 5);
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        assert_eq!(row_text(&buf, 1, 4), "    ");
    }

    #[test]
    fn horizontal_scroll_shifts_columns() {
        let mut t = sample(
            2,
            TableOptions {
                show_scrollbar_y: false,
                ..Default::default()
            },
        );
        let area = Rect::new(0, 0, 6, 3);
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        t.handle_event(key(KeyCode::Right));
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        assert_eq!(t.state.x, 4);
        assert_eq!(row_text(&buf, 0, 6), "   Age");
    }

    #[test]
    fn scroll_bounds_override_keeps_other_state() {
        let mut t = sample(
            30,
            TableOptions {
                page_size: Some(10),
                multi_select: true,
                ..Default::default()
            },
        );
        t.set_page(1);
        t.handle_event(key(KeyCode::Char(' ')));
        t.set_scroll_bounds(ScrollBounds {
            y: Some(5),
            x: ScrollX::MaxContent,
        });
        assert_eq!(t.page(), 1);
        assert_eq!(t.selected_rows(), vec![10]);
        assert_eq!(t.options().page_size, Some(10));
    }

    #[test]
    fn paginated_footer_is_rendered() {
        let mut t = sample(
            3,
            TableOptions {
                page_size: Some(2),
                show_scrollbar_y: false,
                ..Default::default()
            },
        );
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        assert!(row_text(&buf, 3, 30).starts_with("1-2 of 3 items  page 1/2"));
    }
}
