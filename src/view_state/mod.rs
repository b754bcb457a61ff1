//! View-state layer: scroll position and scrollbar geometry.
//!
//! Pure data and arithmetic consumed by the renderer. Nothing here reads
//! the terminal.

pub mod scrollbar;
pub mod viewport;
pub mod visible_range;

pub use scrollbar::{thumb, Thumb};
pub use viewport::Viewport;
pub use visible_range::VisibleRange;
