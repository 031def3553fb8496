use std::collections::BTreeSet;

use crate::input::InputEvent;
use crate::render;
use crate::table::view::ScrollBounds;
use crate::table::view::ScrollX;
use crate::table::view::TableAction;
use crate::table::view::TableOptions;
use crate::table::view::TableView;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::trace;

/// Height assumed until a live measurement is available.
pub const DEFAULT_FALLBACK_HEIGHT: i32 = 600;
/// Space reserved for chrome above and below the table.
pub const DEFAULT_FIXED_OFFSET: i32 = 400;
pub const DEFAULT_LOADING_TEXT: &str = "Loading table...";

/// Handle returned by [`ViewportSource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// A place the current viewport height can be measured from.
///
/// Measurement is a capability that may be missing (for example when rendering off-screen or
/// before a terminal is attached): `height` then returns `None` and `subscribe` refuses.
/// Resize notifications themselves are delivered by the host loop, typically as
/// [`InputEvent::Resize`]; the subscription only records that a listener is attached so
/// attach/detach can be checked for balance.
pub trait ViewportSource {
    fn height(&self) -> Option<i32>;
    fn subscribe(&mut self) -> Option<SubscriptionId>;
    fn unsubscribe(&mut self, id: SubscriptionId);
    fn listener_count(&self) -> usize;
}

#[derive(Clone, Debug, Default)]
struct Listeners {
    next: u64,
    active: BTreeSet<SubscriptionId>,
}

impl Listeners {
    fn add(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.active.insert(id);
        trace!(listeners = self.active.len(), "resize listener added");
        id
    }

    fn remove(&mut self, id: SubscriptionId) {
        if self.active.remove(&id) {
            trace!(listeners = self.active.len(), "resize listener removed");
        }
    }

    fn len(&self) -> usize {
        self.active.len()
    }
}

/// A source with no measurement capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessViewport;

impl ViewportSource for HeadlessViewport {
    fn height(&self) -> Option<i32> {
        None
    }

    fn subscribe(&mut self) -> Option<SubscriptionId> {
        None
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {}

    fn listener_count(&self) -> usize {
        0
    }
}

/// A source whose height is set by the host.
#[derive(Clone, Debug, Default)]
pub struct ManualViewport {
    height: Option<i32>,
    listeners: Listeners,
}

impl ManualViewport {
    pub fn new(height: i32) -> Self {
        Self {
            height: Some(height),
            listeners: Listeners::default(),
        }
    }

    pub fn set_height(&mut self, height: Option<i32>) {
        self.height = height;
    }
}

impl ViewportSource for ManualViewport {
    fn height(&self) -> Option<i32> {
        self.height
    }

    fn subscribe(&mut self) -> Option<SubscriptionId> {
        self.height?;
        Some(self.listeners.add())
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.remove(id);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Measures the attached terminal in rows. Pair with `crossterm_input`, which turns terminal
/// resizes into [`InputEvent::Resize`].
#[cfg(feature = "crossterm")]
#[derive(Clone, Debug, Default)]
pub struct CrosstermViewport {
    listeners: Listeners,
}

#[cfg(feature = "crossterm")]
impl CrosstermViewport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "crossterm")]
impl ViewportSource for CrosstermViewport {
    fn height(&self) -> Option<i32> {
        crossterm::terminal::size()
            .ok()
            .map(|(_, rows)| i32::from(rows))
    }

    fn subscribe(&mut self) -> Option<SubscriptionId> {
        self.height()?;
        Some(self.listeners.add())
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.remove(id);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[derive(Clone, Debug)]
pub struct FitOptions {
    pub fixed_offset: i32,
    pub fallback_height: i32,
    /// Render `loading_text` instead of the table until the first live measurement.
    pub loading_placeholder: bool,
    pub loading_text: String,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            fixed_offset: DEFAULT_FIXED_OFFSET,
            fallback_height: DEFAULT_FALLBACK_HEIGHT,
            loading_placeholder: true,
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
        }
    }
}

/// Wraps a [`TableView`] and keeps its vertical scroll bound equal to the viewport height minus
/// a fixed offset.
///
/// Only the scroll bounds of the wrapped table are touched. Its rows, page, cursor and
/// selection survive every resize because the table itself is never rebuilt.
#[derive(Clone, Debug)]
pub struct AutoResizingTable {
    table: TableView,
    options: FitOptions,
    viewport_height: i32,
    has_measured: bool,
    subscription: Option<SubscriptionId>,
}

impl AutoResizingTable {
    pub fn new(table: TableView) -> Self {
        Self::with_options(table, FitOptions::default())
    }

    pub fn with_options(table: TableView, options: FitOptions) -> Self {
        let mut this = Self {
            table,
            viewport_height: options.fallback_height,
            options,
            has_measured: false,
            subscription: None,
        };
        this.apply_bounds();
        this
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    /// Mutable access to the wrapped table. Scroll bounds set through it are replaced on the next
    /// measurement or render.
    pub fn table_mut(&mut self) -> &mut TableView {
        &mut self.table
    }

    /// Forwards `options` to the table, keeping the injected scroll bounds.
    pub fn set_table_options(&mut self, options: TableOptions) {
        self.table.set_options(options);
        self.apply_bounds();
    }

    pub fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    pub fn has_measured(&self) -> bool {
        self.has_measured
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// `viewport_height - fixed_offset`. Negative when the viewport is smaller than the offset.
    pub fn available_height(&self) -> i32 {
        self.viewport_height - self.options.fixed_offset
    }

    pub fn scroll_bounds(&self) -> ScrollBounds {
        ScrollBounds {
            y: Some(self.available_height()),
            x: ScrollX::MaxContent,
        }
    }

    /// Measures `source` once and starts listening for resizes.
    ///
    /// Returns `false` (and keeps the fallback height) when the source cannot measure. Resizes
    /// are ignored until a later `mount` succeeds, so hosts whose source can become available
    /// should call `mount` again while [`is_mounted`](Self::is_mounted) is `false`. Mounting an
    /// already mounted table is a no-op.
    pub fn mount(&mut self, source: &mut dyn ViewportSource) -> bool {
        if self.subscription.is_some() {
            return true;
        }
        let Some(height) = source.height() else {
            trace!(
                fallback = self.options.fallback_height,
                "viewport unavailable; using fallback height"
            );
            return false;
        };
        self.set_height(height);
        self.has_measured = true;
        self.subscription = source.subscribe();
        self.subscription.is_some()
    }

    pub fn unmount(&mut self, source: &mut dyn ViewportSource) {
        if let Some(id) = self.subscription.take() {
            source.unsubscribe(id);
        }
    }

    /// Applies a resize notification. Ignored unless mounted.
    pub fn on_resize(&mut self, height: i32) -> TableAction {
        if self.subscription.is_none() {
            return TableAction::None;
        }
        self.set_height(height);
        TableAction::Redraw
    }

    /// Handles resizes itself and forwards everything else to the table.
    pub fn handle_event(&mut self, event: InputEvent) -> TableAction {
        match event {
            InputEvent::Resize { height, .. } => self.on_resize(i32::from(height)),
            other => self.table.handle_event(other),
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if !self.has_measured && self.options.loading_placeholder {
            buf.set_style(area, theme.text_primary);
            render::render_centered(area, buf, &self.options.loading_text, theme.text_muted);
            return;
        }
        self.apply_bounds();
        self.table.render(area, buf, theme);
    }

    fn set_height(&mut self, height: i32) {
        self.viewport_height = height;
        self.apply_bounds();
        trace!(
            height,
            available = self.available_height(),
            "viewport height updated"
        );
    }

    fn apply_bounds(&mut self) {
        let bounds = self.scroll_bounds();
        self.table.set_scroll_bounds(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::input::KeyEvent;
    use crate::table::view::TableColumn;

    fn table(rows: usize) -> TableView {
        let mut t = TableView::with_options(TableOptions {
            columns: vec![TableColumn::new("Name", 8)],
            page_size: Some(10),
            multi_select: true,
            ..Default::default()
        });
        t.set_rows((0..rows).map(|i| vec![format!("row{i}")]).collect());
        t
    }

    #[test]
    fn uses_fallback_before_measuring() {
        let fit = AutoResizingTable::new(table(3));
        assert!(!fit.has_measured());
        assert_eq!(fit.viewport_height(), 600);
        assert_eq!(fit.available_height(), 200);
        assert_eq!(fit.table().scroll_bounds().y, Some(200));
    }

    #[test]
    fn available_height_is_unclamped() {
        let mut fit = AutoResizingTable::new(table(3));
        let mut source = ManualViewport::new(1000);
        fit.mount(&mut source);
        assert_eq!(fit.available_height(), 600);
        fit.on_resize(300);
        assert_eq!(fit.available_height(), -100);
        assert_eq!(fit.table().scroll_bounds().y, Some(-100));
        assert_eq!(fit.table().scroll_bounds().x, ScrollX::MaxContent);
    }

    #[test]
    fn headless_source_keeps_fallback() {
        let mut fit = AutoResizingTable::new(table(3));
        let mut source = HeadlessViewport;
        assert!(!fit.mount(&mut source));
        assert!(!fit.has_measured());
        assert!(!fit.is_mounted());
        assert_eq!(fit.on_resize(900), TableAction::None);
        assert_eq!(fit.viewport_height(), 600);
    }

    #[test]
    fn failed_mount_can_be_retried() {
        let mut fit = AutoResizingTable::new(table(3));
        let mut source = ManualViewport::new(0);
        source.set_height(None);
        assert!(!fit.mount(&mut source));
        assert_eq!(fit.on_resize(900), TableAction::None);

        source.set_height(Some(900));
        assert!(fit.mount(&mut source));
        assert!(fit.has_measured());
        assert_eq!(fit.available_height(), 500);
        assert_eq!(source.listener_count(), 1);
        assert_eq!(fit.on_resize(700), TableAction::Redraw);
        assert_eq!(fit.available_height(), 300);
    }

    #[test]
    fn listeners_balance_across_mount_cycles() {
        let mut fit = AutoResizingTable::new(table(3));
        let mut source = ManualViewport::new(800);
        for _ in 0..3 {
            fit.mount(&mut source);
            fit.mount(&mut source);
            assert_eq!(source.listener_count(), 1);
            fit.unmount(&mut source);
            assert_eq!(source.listener_count(), 0);
        }
        fit.unmount(&mut source);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn resize_after_unmount_is_ignored() {
        let mut fit = AutoResizingTable::new(table(3));
        let mut source = ManualViewport::new(800);
        fit.mount(&mut source);
        fit.unmount(&mut source);
        assert_eq!(fit.on_resize(1200), TableAction::None);
        assert_eq!(fit.viewport_height(), 800);
    }

    #[test]
    fn resize_keeps_table_state() {
        let mut fit = AutoResizingTable::new(table(25));
        let mut source = ManualViewport::new(1000);
        fit.mount(&mut source);
        fit.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char('n'))));
        fit.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Down)));
        fit.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(' '))));

        let act = fit.handle_event(InputEvent::Resize {
            width: 120,
            height: 700,
        });
        assert_eq!(act, TableAction::Redraw);
        assert_eq!(fit.available_height(), 300);
        assert_eq!(fit.table().page(), 1);
        assert_eq!(fit.table().cursor(), Some(11));
        assert_eq!(fit.table().selected_rows(), vec![11]);
        assert_eq!(fit.table().options().page_size, Some(10));
    }

    #[test]
    fn table_options_keep_injected_bounds() {
        let mut fit = AutoResizingTable::new(table(3));
        let mut source = ManualViewport::new(450);
        fit.mount(&mut source);
        fit.set_table_options(TableOptions {
            columns: vec![TableColumn::new("Other", 5)],
            scroll: ScrollBounds {
                y: Some(999),
                x: ScrollX::Fixed(10),
            },
            ..Default::default()
        });
        assert_eq!(fit.table().options().columns[0].title, "Other");
        assert_eq!(fit.table().scroll_bounds(), fit.scroll_bounds());
        assert_eq!(fit.table().scroll_bounds().y, Some(50));
    }

    #[test]
    fn renders_loading_text_until_measured() {
        let mut fit = AutoResizingTable::new(table(3));
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        fit.render(area, &mut buf, &Theme::default());
        let row: String = (0..20)
            .map(|x| buf.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(row.trim(), DEFAULT_LOADING_TEXT);
    }

    #[test]
    fn renders_table_with_fallback_when_placeholder_disabled() {
        let mut fit = AutoResizingTable::with_options(
            table(3),
            FitOptions {
                fallback_height: 4,
                fixed_offset: 2,
                loading_placeholder: false,
                ..Default::default()
            },
        );
        let area = Rect::new(0, 0, 20, 10);
        let mut buf = Buffer::empty(area);
        fit.render(area, &mut buf, &Theme::default());
        assert_eq!(fit.table().state.viewport_h, 2);
        assert_eq!(buf.cell((4, 0)).unwrap().symbol(), "N");
    }
}
