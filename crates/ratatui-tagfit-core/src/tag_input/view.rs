use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap;
use crate::keymap::Binding;
use crate::render;
use crate::tag_input::Separator;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Widget;
use tracing::debug;
use tracing::trace;
use unicode_width::UnicodeWidthStr;

/// Delimiter used for the serialized value, independent of [`TagInputOptions::separator`].
pub const VALUE_DELIMITER: char = ',';

pub const DEFAULT_PLACEHOLDER: &str = "Type and press Enter, comma, or space to add tags";

const DISMISS_GLYPH: &str = "×";
const CHIP_GAP: u16 = 1;
const MIN_INPUT_COLS: u16 = 10;

/// Imperative control surface of a tag editor.
///
/// Implemented by [`TagInput`]; hosts that hold a `&mut` to the widget can drive it without
/// synthesizing input events.
pub trait TagCollection {
    /// Appends `text` (trimmed) if it passes the admission rules. Returns `true` if it was added.
    fn add_tag(&mut self, text: &str) -> bool;
    /// Removes the tag at `index`. Out-of-range indices are ignored.
    fn remove_tag(&mut self, index: usize) -> bool;
    fn clear_tags(&mut self);
    /// Snapshot of the current tags in insertion order.
    fn tags(&self) -> Vec<String>;
}

#[derive(Clone, Debug)]
pub struct TagInputBindings {
    pub commit: Vec<KeyEvent>,
    pub remove_last: Vec<KeyEvent>,
}

impl Default for TagInputBindings {
    fn default() -> Self {
        Self {
            commit: vec![keymap::key(KeyCode::Enter)],
            remove_last: vec![keymap::key(KeyCode::Backspace)],
        }
    }
}

impl TagInputBindings {
    pub fn is_commit(&self, key: &KeyEvent) -> bool {
        keymap::any_matches(&self.commit, key)
    }

    pub fn is_remove_last(&self, key: &KeyEvent) -> bool {
        keymap::any_matches(&self.remove_last, key)
    }

    /// Bindings in a form suitable for a help bar.
    pub fn help(&self) -> Vec<Binding> {
        vec![
            Binding::new("enter", "add tag", self.commit.clone()),
            Binding::new("backspace", "remove last", self.remove_last.clone()),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct TagInputOptions {
    pub max_tags: Option<usize>,
    pub allow_duplicates: bool,
    pub separator: Separator,
    pub placeholder: String,
    pub disabled: bool,
    pub show_border: bool,
    pub style: Style,
    pub chip_style: Style,
    pub focus_style: Style,
    pub disabled_style: Style,
    pub placeholder_style: Style,
    pub bindings: TagInputBindings,
}

impl Default for TagInputOptions {
    fn default() -> Self {
        Self {
            max_tags: None,
            allow_duplicates: false,
            separator: Separator::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            disabled: false,
            show_border: true,
            style: Style::default(),
            chip_style: Style::default(),
            focus_style: Style::default(),
            disabled_style: Style::default(),
            placeholder_style: Style::default(),
            bindings: TagInputBindings::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagInputAction {
    None,
    Redraw,
    /// The tag set changed; carries the new comma-joined value.
    Changed(String),
}

/// Placement of one chip, relative to the content area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipSlot {
    pub row: u16,
    pub x: u16,
    pub width: u16,
}

/// Result of flowing chips and the text field into a given width.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagLayout {
    pub chips: Vec<ChipSlot>,
    pub input_row: u16,
    pub input_x: u16,
}

impl TagLayout {
    pub fn rows(&self) -> u16 {
        self.input_row + 1
    }
}

type ChangeCallback = Box<dyn FnMut(&str)>;

/// A single-line tag editor rendered as wrapped chips followed by a text field.
///
/// The component owns its tags but treats the comma-joined value supplied through
/// [`TagInput::set_value`] as the source of truth: whenever that value changes, the tags are
/// re-parsed from it. Edits made through events or [`TagCollection`] are reported through
/// [`TagInput::set_on_change`] and [`TagInputAction::Changed`]; a controlling host feeds the
/// emitted value back with `set_value`.
pub struct TagInput {
    tags: Vec<String>,
    pending: String,
    last_value: String,
    focused: bool,
    options: TagInputOptions,
    on_change: Option<ChangeCallback>,
    last_area: Option<Rect>,
    last_content: Rect,
    last_layout: TagLayout,
}

impl Default for TagInput {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TagInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagInput")
            .field("tags", &self.tags)
            .field("pending", &self.pending)
            .field("focused", &self.focused)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TagInput {
    pub fn new() -> Self {
        Self {
            tags: Vec::new(),
            pending: String::new(),
            last_value: String::new(),
            focused: false,
            options: TagInputOptions::default(),
            on_change: None,
            last_area: None,
            last_content: Rect::default(),
            last_layout: TagLayout::default(),
        }
    }

    pub fn with_options(options: TagInputOptions) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    pub fn options(&self) -> &TagInputOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TagInputOptions) {
        self.options = options;
    }

    pub fn set_on_change(&mut self, f: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(f));
    }

    /// Synchronizes with an externally supplied value.
    ///
    /// Only a value that differs from the previously supplied one replaces the tags. The value is
    /// always split on `,`, regardless of the live-typing separator.
    pub fn set_value(&mut self, value: &str) {
        if value == self.last_value {
            return;
        }
        self.last_value = value.to_string();
        self.tags = parse_value(value);
        trace!(value, tags = self.tags.len(), "tag input synced from value");
    }

    /// The tags joined with [`VALUE_DELIMITER`].
    pub fn value(&self) -> String {
        join_tags(&self.tags)
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) -> TagInputAction {
        if self.options.disabled || self.focused {
            return TagInputAction::None;
        }
        self.focused = true;
        TagInputAction::Redraw
    }

    /// Drops focus and commits a non-blank pending buffer as a tag.
    pub fn blur(&mut self) -> TagInputAction {
        let was_focused = std::mem::replace(&mut self.focused, false);
        if self.options.disabled {
            return TagInputAction::None;
        }
        if !self.pending.trim().is_empty() {
            let text = std::mem::take(&mut self.pending);
            if self.admit(&text) {
                return TagInputAction::Changed(self.value());
            }
            return TagInputAction::Redraw;
        }
        if was_focused {
            TagInputAction::Redraw
        } else {
            TagInputAction::None
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TagInputAction {
        if self.options.disabled {
            return TagInputAction::None;
        }
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(s) => {
                let s: String = s
                    .chars()
                    .map(|c| if matches!(c, '\r' | '\n') { ' ' } else { c })
                    .collect();
                self.type_text(&s)
            }
            InputEvent::Mouse(m) => self.handle_mouse(m),
            InputEvent::FocusGained => self.focus(),
            InputEvent::FocusLost => self.blur(),
            InputEvent::Resize { .. } => TagInputAction::None,
        }
    }

    /// Rows needed to show every chip plus the text field at `width` (including the border).
    pub fn required_height(&self, width: u16) -> u16 {
        let border = if self.options.show_border { 2 } else { 0 };
        let inner_w = width.saturating_sub(border);
        layout_tags(&self.tags, inner_w, self.options.disabled)
            .rows()
            .saturating_add(border)
    }

    /// Where the host should place the terminal cursor, based on the last render.
    pub fn cursor_pos(&self) -> Option<(u16, u16)> {
        if !self.focused || self.options.disabled || self.last_area.is_none() {
            return None;
        }
        let content = self.last_content;
        if self.last_layout.input_row >= content.height {
            return None;
        }
        let x = self.last_layout.input_x as u32 + self.pending.width() as u32;
        let x = x.min(content.width.saturating_sub(1) as u32) as u16;
        Some((content.x + x, content.y + self.last_layout.input_row))
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.last_area = Some(area);
        if area.width == 0 || area.height == 0 {
            self.last_content = Rect::default();
            return;
        }

        let disabled = self.options.disabled;
        let base_style = if disabled {
            self.options.disabled_style.patch(theme.disabled)
        } else if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        buf.set_style(area, base_style);

        let content = if self.options.show_border {
            let border_style = if self.focused && !disabled {
                self.options.focus_style.patch(theme.accent)
            } else {
                base_style.patch(theme.text_muted)
            };
            let block = Block::bordered().border_style(border_style);
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        self.last_content = content;
        self.last_layout = layout_tags(&self.tags, content.width, disabled);

        let chip_style = if disabled {
            base_style
        } else {
            self.options.chip_style.patch(theme.chip)
        };
        for (tag, slot) in self.tags.iter().zip(&self.last_layout.chips) {
            if slot.row >= content.height {
                break;
            }
            let x = content.x + slot.x;
            let y = content.y + slot.row;
            buf.set_style(Rect::new(x, y, slot.width, 1), chip_style);
            // A chip cut to the content width loses label text, never its dismiss glyph.
            let glyph_col = if disabled { None } else { dismiss_col(slot) };
            let label_cols = match glyph_col {
                Some(_) => slot.width - 4,
                None => slot.width.saturating_sub(2),
            };
            render::render_str_clipped(x + 1, y, 0, label_cols, buf, tag, chip_style);
            if let Some(col) = glyph_col {
                render::render_str_clipped(
                    content.x + col,
                    y,
                    0,
                    1,
                    buf,
                    DISMISS_GLYPH,
                    chip_style,
                );
            }
        }

        let layout = &self.last_layout;
        if layout.input_row < content.height {
            let x = content.x + layout.input_x;
            let y = content.y + layout.input_row;
            let max_cols = content.width.saturating_sub(layout.input_x);
            if self.tags.is_empty() && self.pending.is_empty() {
                let style = self.options.placeholder_style.patch(theme.text_muted);
                render::render_str_clipped(
                    x,
                    y,
                    0,
                    max_cols,
                    buf,
                    &self.options.placeholder,
                    style,
                );
            } else {
                // Keep the tail of a long buffer visible.
                let w = self.pending.width() as u32;
                let start = w.saturating_sub(max_cols.saturating_sub(1) as u32);
                render::render_str_clipped(x, y, start, max_cols, buf, &self.pending, base_style);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> TagInputAction {
        if self.options.bindings.is_commit(&key) {
            if self.pending.trim().is_empty() {
                return TagInputAction::None;
            }
            let text = std::mem::take(&mut self.pending);
            if self.admit(&text) {
                return TagInputAction::Changed(self.value());
            }
            return TagInputAction::Redraw;
        }

        if self.options.bindings.is_remove_last(&key) {
            if self.pending.is_empty() {
                if self.tags.is_empty() {
                    return TagInputAction::None;
                }
                self.remove_at(self.tags.len() - 1);
                return TagInputAction::Changed(self.value());
            }
            self.pending.pop();
            return TagInputAction::Redraw;
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.ctrl && !key.modifiers.alt => {
                let mut tmp = [0u8; 4];
                self.type_text(c.encode_utf8(&mut tmp))
            }
            _ => TagInputAction::None,
        }
    }

    fn handle_mouse(&mut self, m: MouseEvent) -> TagInputAction {
        if m.kind != MouseEventKind::Down(MouseButton::Left) {
            return TagInputAction::None;
        }
        let Some(area) = self.last_area else {
            return TagInputAction::None;
        };
        if !area.contains(Position::new(m.x, m.y)) {
            return if self.focused {
                self.blur()
            } else {
                TagInputAction::None
            };
        }

        if let Some(index) = self.dismiss_hit(m.x, m.y) {
            self.remove_at(index);
            self.focused = true;
            return TagInputAction::Changed(self.value());
        }
        self.focus()
    }

    fn dismiss_hit(&self, x: u16, y: u16) -> Option<usize> {
        let content = self.last_content;
        if y < content.y || x < content.x {
            return None;
        }
        let (row, col) = (y - content.y, x - content.x);
        self.last_layout
            .chips
            .iter()
            .position(|slot| slot.row == row && dismiss_col(slot) == Some(col))
            .filter(|&i| i < self.tags.len())
    }

    /// Applies typed or pasted text to the pending buffer, committing every complete fragment.
    fn type_text(&mut self, input: &str) -> TagInputAction {
        let mut raw = std::mem::take(&mut self.pending);
        raw.push_str(input);

        if !self.options.separator.is_match(&raw) {
            self.pending = raw;
            return TagInputAction::Redraw;
        }

        let mut fragments = self.options.separator.split(&raw);
        let last = fragments.pop().unwrap_or_default().to_string();
        let mut changed = false;
        for fragment in fragments {
            if !fragment.trim().is_empty() {
                changed |= self.admit(fragment);
            }
        }
        self.pending = last;

        if changed {
            TagInputAction::Changed(self.value())
        } else {
            TagInputAction::Redraw
        }
    }

    /// Admission rule shared by every entry point. Notifies on success.
    fn admit(&mut self, text: &str) -> bool {
        let tag = text.trim();
        if tag.is_empty() {
            debug!("tag rejected: empty");
            return false;
        }
        if !self.options.allow_duplicates && self.tags.iter().any(|t| t == tag) {
            debug!(tag, "tag rejected: duplicate");
            return false;
        }
        if let Some(max) = self.options.max_tags
            && self.tags.len() >= max
        {
            debug!(tag, max, "tag rejected: limit reached");
            return false;
        }
        self.tags.push(tag.to_string());
        trace!(tag, count = self.tags.len(), "tag added");
        self.emit_change();
        true
    }

    fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.tags.len() {
            debug!(index, len = self.tags.len(), "tag removal ignored: out of range");
            return false;
        }
        let removed = self.tags.remove(index);
        trace!(tag = removed.as_str(), index, "tag removed");
        self.emit_change();
        true
    }

    fn emit_change(&mut self) {
        let value = self.value();
        if let Some(cb) = self.on_change.as_mut() {
            cb(&value);
        }
    }
}

impl TagCollection for TagInput {
    fn add_tag(&mut self, text: &str) -> bool {
        if self.options.disabled {
            debug!("tag rejected: disabled");
            return false;
        }
        self.admit(text)
    }

    fn remove_tag(&mut self, index: usize) -> bool {
        if self.options.disabled {
            return false;
        }
        self.remove_at(index)
    }

    fn clear_tags(&mut self) {
        if self.options.disabled {
            return;
        }
        self.tags.clear();
        trace!("tags cleared");
        self.emit_change();
    }

    fn tags(&self) -> Vec<String> {
        self.tags.clone()
    }
}

/// Splits a serialized value on `,`, trimming entries and dropping blank ones.
pub fn parse_value(value: &str) -> Vec<String> {
    value
        .split(VALUE_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_tags(tags: &[String]) -> String {
    let mut out = String::new();
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            out.push(VALUE_DELIMITER);
        }
        out.push_str(tag);
    }
    out
}

fn chip_label(tag: &str, disabled: bool) -> String {
    if disabled {
        tag.to_string()
    } else {
        format!("{tag} {DISMISS_GLYPH}")
    }
}

/// Column of a chip's dismiss glyph, or `None` when the chip is too narrow to show it.
fn dismiss_col(slot: &ChipSlot) -> Option<u16> {
    (slot.width >= 4).then(|| slot.x + slot.width - 2)
}

/// Flows chips left to right, wrapping at `width`, then places the text field after the last
/// chip (or on a new row when less than a minimal field width is left).
pub fn layout_tags(tags: &[String], width: u16, disabled: bool) -> TagLayout {
    let mut layout = TagLayout::default();
    if width == 0 {
        return layout;
    }

    let mut row = 0u16;
    let mut x = 0u16;
    for tag in tags {
        let natural = chip_label(tag, disabled).width().saturating_add(2);
        let w = natural.min(width as usize) as u16;
        if x > 0 && x.saturating_add(w) > width {
            row += 1;
            x = 0;
        }
        layout.chips.push(ChipSlot { row, x, width: w });
        x = x.saturating_add(w).saturating_add(CHIP_GAP);
    }

    let min_input = MIN_INPUT_COLS.min(width);
    if x > 0 && x.saturating_add(min_input) > width {
        row += 1;
        x = 0;
    }
    layout.input_row = row;
    layout.input_x = x;
    layout
}
