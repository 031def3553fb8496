use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

const TAB_COLS: usize = 4;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Writes glyphs into one row of `buf`, skipping the first `start_col` display columns and
/// stopping after `max_cols`. Wide chars that straddle either edge are dropped.
struct ClippedRow<'a> {
    buf: &'a mut Buffer,
    x: u16,
    y: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out_cols: usize,
}

impl ClippedRow<'_> {
    /// Returns `false` once the row is full.
    fn push(&mut self, ch: char, style: Style) -> bool {
        if ch == '\t' {
            for _ in 0..TAB_COLS {
                if !self.push(' ', style) {
                    return false;
                }
            }
            return true;
        }

        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            return true;
        }
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out_cols + w > self.max_cols {
            return false;
        }

        let mut tmp = [0u8; 4];
        let dx = self.out_cols as u16;
        if let Some(cell) = self.buf.cell_mut((self.x + dx, self.y)) {
            cell.set_style(style);
            cell.set_symbol(ch.encode_utf8(&mut tmp));
        }
        if w == 2
            && let Some(cell) = self.buf.cell_mut((self.x + dx + 1, self.y))
        {
            cell.set_style(style);
            cell.set_symbol("");
        }
        self.out_cols += w;
        self.col += w;
        true
    }
}

pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    if max_cols == 0 {
        return;
    }
    let mut row = ClippedRow {
        buf,
        x,
        y,
        start_col: start_col as usize,
        max_cols: max_cols as usize,
        col: 0,
        out_cols: 0,
    };
    for ch in input.chars() {
        if !row.push(ch, style) {
            return;
        }
    }
}

pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'static>],
    fallback_style: Style,
) {
    if max_cols == 0 {
        return;
    }
    let mut row = ClippedRow {
        buf,
        x,
        y,
        start_col: start_col as usize,
        max_cols: max_cols as usize,
        col: 0,
        out_cols: 0,
    };
    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        for ch in span.content.chars() {
            if !row.push(ch, style) {
                return;
            }
        }
    }
}

/// Renders `text` horizontally and vertically centered in `area`, clipped to its width.
pub fn render_centered(area: Rect, buf: &mut Buffer, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let w = (text.width() as u16).min(area.width);
    let x = area.x + (area.width - w) / 2;
    let y = area.y + area.height / 2;
    render_str_clipped(x, y, 0, w, buf, text, style);
}

pub fn slice_by_cols(input: &str, start_col: u32, max_cols: u16) -> String {
    if max_cols == 0 {
        return String::new();
    }

    let start_col = start_col as usize;
    let max_cols = max_cols as usize;
    let input = if input.contains('\t') {
        std::borrow::Cow::Owned(input.replace('\t', "    "))
    } else {
        std::borrow::Cow::Borrowed(input)
    };

    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut out = String::new();

    for ch in input.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if col < start_col {
            col += w;
            continue;
        }
        if out_cols + w > max_cols {
            break;
        }
        out.push(ch);
        col += w;
        out_cols += w;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn row_text(buf: &Buffer, y: u16, w: u16) -> String {
        (0..w)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn slice_by_cols_handles_tabs_and_width() {
        assert_eq!(slice_by_cols("\t1", 0, 4), "    ");
        assert_eq!(slice_by_cols("abcdef", 0, 3), "abc");
        assert_eq!(slice_by_cols("abcdef", 2, 3), "cde");
    }

    #[test]
    fn slice_by_cols_skips_partial_wide_char_overlap() {
        assert_eq!(slice_by_cols("你好", 0, 2), "你");
        assert_eq!(slice_by_cols("你好", 2, 2), "好");
        assert_eq!(slice_by_cols("你好", 1, 2), "好");
    }

    #[test]
    fn render_spans_clipped_expands_tabs() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        let spans = vec![Span::raw("\t1")];
        render_spans_clipped(0, 0, 0, 6, &mut buf, &spans, Style::default());
        assert!(row_text(&buf, 0, 6).starts_with("    1"));
    }

    #[test]
    fn render_str_clipped_honors_start_col() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        render_str_clipped(0, 0, 2, 4, &mut buf, "abcdef", Style::default());
        assert_eq!(row_text(&buf, 0, 4), "cdef");
    }

    #[test]
    fn render_centered_places_text_mid_area() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 3));
        render_centered(Rect::new(0, 0, 8, 3), &mut buf, "ab", Style::default());
        assert_eq!(row_text(&buf, 1, 8), "   ab   ");
    }

    #[test]
    fn render_scrollbar_does_not_panic() {
        let mut state = ViewportState::default();
        state.set_viewport(10, 5);
        state.set_content(10, 50);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 5));
        render_scrollbar(Rect::new(0, 0, 1, 5), &mut buf, &state, Style::default());
    }
}
