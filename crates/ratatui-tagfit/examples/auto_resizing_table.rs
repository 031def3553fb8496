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
use ratatui_tagfit::input::InputEvent;
use ratatui_tagfit::input::KeyCode;
use ratatui_tagfit::prelude::*;
use ratatui_tagfit::table::fit::CrosstermViewport;
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Rows above and below the table: outer border (2), title (1), status (1), help (1), padding.
const CHROME_ROWS: i32 = 6;

const DEPARTMENTS: &[&str] = &[
    "Engineering",
    "Marketing",
    "Sales",
    "HR",
    "Finance",
    "Operations",
];
const STATUSES: &[&str] = &["active", "inactive", "pending"];

fn main() -> io::Result<()> {
    let _log_guard = init_logging();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut source = CrosstermViewport::new();
    let mut table = AutoResizingTable::with_options(
        employee_table(),
        FitOptions {
            fixed_offset: CHROME_ROWS,
            fallback_height: 24,
            ..Default::default()
        },
    );
    table.mount(&mut source);

    let res = run(&mut terminal, &Theme::default(), &mut table, &mut source);
    table.unmount(&mut source);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().ok()?;
    let appender = tracing_appender::rolling::never(".", "auto_resizing_table.log");
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

fn employee_table() -> TableView {
    let columns = vec![
        TableColumn::new("Name", 12),
        TableColumn::new("Age", 4),
        TableColumn::new("Address", 32),
        TableColumn::new("Email", 26),
        TableColumn::new("Phone", 18),
        TableColumn::new("Department", 12),
        TableColumn::new("Status", 9),
        TableColumn::new("Join date", 10),
        TableColumn::new("Salary", 9),
    ];
    let rows = (1..=50usize)
        .map(|i| {
            vec![
                format!("Employee {i}"),
                (22 + i % 40).to_string(),
                format!("{} Main Street, City {}, State", 100 + i, i.div_ceil(10)),
                format!("employee{i}@company.com"),
                format!("+1 (555) {:03}-{:04}", i, (i * 11) % 10000),
                DEPARTMENTS[i % DEPARTMENTS.len()].to_string(),
                STATUSES[i % STATUSES.len()].to_string(),
                format!("{}-{:02}-{:02}", 2020 + i % 4, i % 12 + 1, i % 28 + 1),
                format!("${}", 50_000 + i * 1000),
            ]
        })
        .collect();

    let mut table = TableView::with_options(TableOptions {
        columns,
        page_size: Some(20),
        multi_select: true,
        ..Default::default()
    });
    table.set_rows(rows);
    table
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    table: &mut AutoResizingTable,
    source: &mut CrosstermViewport,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("AutoResizingTable (resize the terminal; jk/hl, n/p pages, space select, q)")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let status_y = inner.y + inner.height.saturating_sub(1);
            let table_area = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(1),
            );
            table.render(table_area, buf, theme);

            let status = format!(
                "viewport={} available={} selected={}",
                table.viewport_height(),
                table.available_height(),
                table.table().selected_rows().len(),
            );
            let span = Span::styled(status, theme.text_muted);
            buf.set_span(inner.x, status_y, &span, inner.width);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Some(ev) = input_event_from_crossterm(crossterm::event::read()?) else {
            continue;
        };
        if let InputEvent::Key(key) = &ev
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        {
            return Ok(());
        }

        if matches!(ev, InputEvent::Resize { .. }) && !table.is_mounted() {
            table.mount(source);
        }
        if let TableAction::Activated(row) = table.handle_event(ev) {
            tracing::info!(row, "row activated");
        }
    }
}
