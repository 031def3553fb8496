//! Free-text tag editor.
//!
//! [`view::TagInput`] turns typed or pasted text into discrete tags using a [`Separator`] and
//! keeps them in sync with a single comma-joined value.
pub mod separator;
pub mod view;

pub use separator::Separator;
