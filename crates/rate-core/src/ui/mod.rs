//! Touch plumbing, colors and the resolved widget style.

pub mod colors;
pub mod core;
pub mod style;

// Re-export commonly used items
pub use core::{TouchEvent, TouchPoint, TouchResult, Touchable};
pub use style::Style;
