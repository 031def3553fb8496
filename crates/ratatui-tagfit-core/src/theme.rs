use ratatui::style::Style;

/// Shared palette that widgets patch their own option styles onto.
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    pub chip: Style,
    pub disabled: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            chip: Style::default().black().on_gray(),
            disabled: Style::default().dark_gray(),
        }
    }
}
