//! A tag input and a viewport-fitting table for ratatui apps.
//!
//! This crate re-exports `ratatui-tagfit-core`. See the `tag_input` and `auto_resizing_table`
//! examples for complete event loops.
pub use ratatui_tagfit_core::Error;
pub use ratatui_tagfit_core::Result;
pub use ratatui_tagfit_core::error;
pub use ratatui_tagfit_core::help;
pub use ratatui_tagfit_core::input;
pub use ratatui_tagfit_core::keymap;
pub use ratatui_tagfit_core::render;
pub use ratatui_tagfit_core::table;
pub use ratatui_tagfit_core::tag_input;
pub use ratatui_tagfit_core::theme;
pub use ratatui_tagfit_core::viewport;

#[cfg(feature = "crossterm")]
pub use ratatui_tagfit_core::crossterm_input;

/// The types most apps need.
pub mod prelude {
    pub use crate::input::InputEvent;
    pub use crate::table::fit::AutoResizingTable;
    pub use crate::table::fit::FitOptions;
    pub use crate::table::fit::ViewportSource;
    pub use crate::table::view::TableAction;
    pub use crate::table::view::TableColumn;
    pub use crate::table::view::TableOptions;
    pub use crate::table::view::TableView;
    pub use crate::tag_input::Separator;
    pub use crate::tag_input::view::TagCollection;
    pub use crate::tag_input::view::TagInput;
    pub use crate::tag_input::view::TagInputAction;
    pub use crate::tag_input::view::TagInputOptions;
    pub use crate::theme::Theme;
}
