//! Symbology decoders for the order-scan engine.
//!
//! This crate turns a raw camera frame into decoded symbol payloads. It
//! focuses on:
//! - QR symbols (versions 1-10, numeric/alphanumeric/byte segments, full
//!   Reed-Solomon block correction),
//! - the mainstream 1D retail symbologies: EAN-13 and Code 128.
//!
//! It does **not** rectify perspective-distorted frames. Symbols are
//! expected roughly fronto-parallel, which is what a hand-held scan of a
//! printed ticket or shelf label produces.

mod config;
mod deadline;
mod decoder;
pub mod encode;
mod error;
mod oned;
mod qr;
mod symbol;

pub use config::DecodeConfig;
pub use decoder::Decoder;
pub use error::DecodeError;
pub use symbol::{DecodedSymbol, Symbology};
