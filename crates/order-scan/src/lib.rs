//! High-level facade crate for the `order-scan-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying engine crates
//! - (feature-gated) end-to-end helpers that decode an `image::GrayImage`
//!   or raw pixel buffer and run it through the full scan pipeline.
//!
//! ## Quickstart
//!
//! ```no_run
//! use order_scan::engine::{InMemoryOrderStore, ScanSession, SessionConfig};
//! use order_scan::scan;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::ImageReader::open("ticket.png")?.decode()?.to_luma8();
//! let store = InMemoryOrderStore::load_json("orders.json")?;
//!
//! let mut session = ScanSession::new(SessionConfig::default(), store)?;
//! let outcome = scan::scan_gray_image(&mut session, &img)?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `order_scan::core`: frame model, luminance plane, logging bootstrap.
//! - `order_scan::symbology`: the decoder (QR, EAN-13, Code 128) and the
//!   1D symbol generator.
//! - `order_scan::engine`: validator, order matcher, store seam, session
//!   state machine.
//! - `order_scan::scan` (feature `image`): end-to-end helpers from
//!   `image::GrayImage` and raw buffers.

pub use order_scan_core as core;
pub use order_scan_engine as engine;
pub use order_scan_symbology as symbology;

pub use order_scan_core::{FrameView, PixelFormat};
pub use order_scan_engine::{FrameOutcome, MatchReason, MatchResult, ScanSession, SessionConfig};
pub use order_scan_symbology::{DecodeConfig, DecodedSymbol, Decoder, Symbology};

#[cfg(feature = "image")]
pub mod scan;
