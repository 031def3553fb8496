//! A paginated, selectable table and a wrapper that sizes it to the viewport.
pub mod fit;
pub mod view;
