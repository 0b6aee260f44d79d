//! Core types and utilities for barcode-driven order scanning.
//!
//! This crate is intentionally small and knows nothing about symbologies or
//! order stores. It owns the frame/pixel model shared by the decoder crates
//! and the logging bootstrap.

mod frame;
mod logger;
mod threshold;

pub use frame::{
    get_luma, sample_mean_3x3, FrameError, FrameView, LumaImage, LumaView, PixelFormat,
};
pub use threshold::otsu_threshold;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
