//! Hardware-independent core library for the rate widget
//!
//! This crate contains all platform-agnostic logic for the rating selector:
//! point layout, hit-testing, the incremental fill animation, the selection
//! state machine, saved-state encoding and the raster buffer everything is
//! painted into.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod framebuffer;
pub mod rating;
pub mod ui;

pub use config::{BackgroundChain, RateAttributes, RateConfig, Theme};
pub use framebuffer::FrameBuffer;
pub use rating::{RateError, RateWidget};
