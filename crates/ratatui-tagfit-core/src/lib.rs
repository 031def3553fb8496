//! `ratatui-tagfit-core` provides two leaf widgets for terminal UIs plus the small primitives
//! they are built on.
//!
//! - [`tag_input::view::TagInput`]: a free-text tag editor. Typed or pasted text is split into
//!   tags by a [`tag_input::Separator`]; the tag set is exposed as one comma-joined value and
//!   through the [`tag_input::view::TagCollection`] handle.
//! - [`table::fit::AutoResizingTable`]: wraps a [`table::view::TableView`] and keeps its
//!   vertical scroll bound at "viewport height minus a fixed offset", tracking resizes.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - No async runtime: all components run on the main thread.
//! - Invalid input is ignored rather than reported; the only fallible API is
//!   [`tag_input::Separator::pattern`].
//!
//! Most users should depend on the facade crate `ratatui-tagfit`. Enable the `crossterm`
//! feature for `crossterm_input` and `table::fit::CrosstermViewport`.
pub mod error;
pub mod theme;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod viewport;

pub mod help;
pub mod input;
pub mod keymap;
pub mod table;
pub mod tag_input;

pub use error::Error;
pub use error::Result;
