use crate::keymap::Binding;
use crate::render;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Span;

const SEPARATOR: &str = " • ";

/// One-line `key desc • key desc` hint bar, styled from the [`Theme`].
#[derive(Clone, Debug, Default)]
pub struct HelpBar {
    bindings: Vec<Binding>,
}

impl HelpBar {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, theme.text_muted);
        let mut spans: Vec<Span<'static>> = Vec::with_capacity(self.bindings.len() * 3);
        for (i, b) in self.bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(SEPARATOR, theme.text_muted));
            }
            spans.push(Span::styled(b.help_key.clone(), theme.accent));
            spans.push(Span::styled(format!(" {}", b.help_desc), theme.text_muted));
        }
        render::render_spans_clipped(area.x, area.y, 0, area.width, buf, &spans, theme.text_muted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_input::view::TagInputBindings;

    #[test]
    fn renders_tag_input_hints() {
        let hb = HelpBar::new(TagInputBindings::default().help());
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        hb.render(area, &mut buf, &Theme::default());
        let row: String = (0..13)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(row, "enter add tag");
        assert_eq!(buf.cell((0, 0)).unwrap().fg, ratatui::style::Color::Cyan);
    }

    #[test]
    fn help_bar_renders_narrow_width() {
        let hb = HelpBar::new(TagInputBindings::default().help());
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        hb.render(Rect::new(0, 0, 3, 1), &mut buf, &Theme::default());
    }
}
