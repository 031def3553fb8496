use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableFocusChange;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableFocusChange;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_tagfit::crossterm_input::input_event_from_crossterm;
use ratatui_tagfit::help::HelpBar;
use ratatui_tagfit::input::InputEvent;
use ratatui_tagfit::input::KeyCode;
use ratatui_tagfit::keymap;
use ratatui_tagfit::keymap::Binding;
use ratatui_tagfit::prelude::*;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

struct Field {
    title: &'static str,
    input: TagInput,
    value: Rc<RefCell<String>>,
}

impl Field {
    fn new(title: &'static str, value: &str, options: TagInputOptions) -> Self {
        let value = Rc::new(RefCell::new(value.to_string()));
        let mut input = TagInput::with_options(options);
        input.set_value(&value.borrow());
        let sink = Rc::clone(&value);
        input.set_on_change(move |v| *sink.borrow_mut() = v.to_string());
        Self {
            title,
            input,
            value,
        }
    }

    /// Feeds the emitted value back, the way a controlling host would.
    fn sync(&mut self) {
        let value = self.value.borrow().clone();
        self.input.set_value(&value);
    }
}

fn main() -> io::Result<()> {
    let _log_guard = init_logging();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut fields = demo_fields();
    let res = run(&mut terminal, &Theme::default(), &mut fields);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

/// Logs go to `tag_input.log` only when `RUST_LOG` is set; stdout belongs to the TUI.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().ok()?;
    let appender = tracing_appender::rolling::never(".", "tag_input.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Some(guard)
}

fn demo_fields() -> Vec<Field> {
    let pipe = Separator::chars("|");
    vec![
        Field::new(
            "Basic usage",
            "react,javascript,typescript",
            TagInputOptions {
                placeholder: "Add programming languages...".to_string(),
                ..Default::default()
            },
        ),
        Field::new(
            "Limited tags (max 3)",
            "html,css",
            TagInputOptions {
                max_tags: Some(3),
                placeholder: "Add up to 3 skills...".to_string(),
                ..Default::default()
            },
        ),
        Field::new(
            "Allow duplicates (ctrl-d toggles)",
            "tag1,tag1,tag2",
            TagInputOptions {
                allow_duplicates: true,
                ..Default::default()
            },
        ),
        Field::new(
            "Custom separator (|)",
            "apple,banana,cherry",
            TagInputOptions {
                separator: pipe,
                placeholder: "Use | to separate tags...".to_string(),
                ..Default::default()
            },
        ),
        Field::new(
            "Disabled",
            "read,only,tags",
            TagInputOptions {
                disabled: true,
                ..Default::default()
            },
        ),
    ]
}

fn help_bar() -> HelpBar {
    let mut bar = HelpBar::new(TagInputOptions::default().bindings.help());
    bar.push(Binding::new(
        "tab",
        "next field",
        vec![keymap::key(KeyCode::Tab)],
    ));
    bar.push(Binding::new("ctrl-a", "add sample", vec![keymap::key_ctrl('a')]));
    bar.push(Binding::new("ctrl-x", "clear", vec![keymap::key_ctrl('x')]));
    bar.push(Binding::new("esc", "quit", vec![keymap::key(KeyCode::Esc)]));
    bar
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    fields: &mut [Field],
) -> io::Result<()> {
    let help = help_bar();
    let mut focused = 0usize;
    fields[focused].input.focus();

    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("TagInput demo")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let mut y = inner.y;
            let bottom = inner.y + inner.height.saturating_sub(1);
            let buf = f.buffer_mut();
            for field in fields.iter_mut() {
                if y >= bottom {
                    break;
                }
                let title = Span::styled(field.title, theme.accent);
                buf.set_span(inner.x, y, &title, inner.width);
                y += 1;

                let h = field
                    .input
                    .required_height(inner.width)
                    .min(bottom.saturating_sub(y));
                field.input.render(Rect::new(inner.x, y, inner.width, h), buf, theme);
                y += h;

                if y < bottom {
                    let full = field
                        .input
                        .options()
                        .max_tags
                        .is_some_and(|max| field.input.tags().len() >= max);
                    let (status, style) = if full {
                        (format!("value: {} (limit reached)", field.value.borrow()), theme.danger)
                    } else {
                        (format!("value: {}", field.value.borrow()), theme.text_muted)
                    };
                    let span = Span::styled(status, style);
                    buf.set_span(inner.x, y, &span, inner.width);
                    y += 1;
                }
            }
            help.render(Rect::new(inner.x, bottom, inner.width, 1), buf, theme);

            if let Some((x, y)) = fields[focused].input.cursor_pos() {
                f.set_cursor_position((x, y));
            }
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Some(ev) = input_event_from_crossterm(crossterm::event::read()?) else {
            continue;
        };

        if let InputEvent::Key(key) = &ev {
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    fields[focused].input.blur();
                    fields[focused].sync();
                    focused = next_enabled(fields, focused);
                    fields[focused].input.focus();
                    continue;
                }
                KeyCode::Char('a') if key.modifiers.ctrl => {
                    fields[focused].input.add_tag("Sample Tag");
                    fields[focused].sync();
                    continue;
                }
                KeyCode::Char('x') if key.modifiers.ctrl => {
                    fields[focused].input.clear_tags();
                    fields[focused].sync();
                    continue;
                }
                KeyCode::Char('d') if key.modifiers.ctrl => {
                    let mut options = fields[2].input.options().clone();
                    options.allow_duplicates = !options.allow_duplicates;
                    fields[2].title = if options.allow_duplicates {
                        "Allow duplicates (ctrl-d toggles)"
                    } else {
                        "Prevent duplicates (ctrl-d toggles)"
                    };
                    fields[2].input.set_options(options);
                    continue;
                }
                _ => {}
            }
        }

        match ev {
            InputEvent::Mouse(_) => {
                // Every field sees clicks so the one clicked gains focus and the rest blur.
                for (i, field) in fields.iter_mut().enumerate() {
                    field.input.handle_event(ev.clone());
                    field.sync();
                    if field.input.is_focused() {
                        focused = i;
                    }
                }
            }
            other => {
                if let TagInputAction::Changed(_) = fields[focused].input.handle_event(other) {
                    fields[focused].sync();
                }
            }
        }
    }
}

fn next_enabled(fields: &[Field], from: usize) -> usize {
    (1..=fields.len())
        .map(|step| (from + step) % fields.len())
        .find(|&i| !fields[i].input.options().disabled)
        .unwrap_or(from)
}
