//! Frame decoder: symbology dispatch over a shared luminance plane.

use order_scan_core::{otsu_threshold, FrameView, PixelFormat};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::deadline::Deadline;
use crate::{oned, qr, DecodeConfig, DecodeError, DecodedSymbol, Symbology};

/// Decodes symbols from raw frames.
///
/// A decoder is a pure transform: it holds configuration only, so one
/// instance can be reused across frames and sessions. Each call converts
/// the frame to luminance once and dispatches on the configured symbology
/// priority list.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    /// Build a decoder with the given configuration.
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Decoder configuration.
    #[inline]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode symbols from a frame.
    ///
    /// Returns an empty vec when the frame holds no readable symbol. With
    /// `multi_symbol` unset, the first symbology that yields a symbol ends
    /// the pass.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn decode(&self, frame: &FrameView<'_>) -> Result<Vec<DecodedSymbol>, DecodeError> {
        let deadline = Deadline::new(self.config.time_budget);
        deadline.check()?;

        let plane = frame.luminance();
        let view = plane.view();
        let threshold = otsu_threshold(&view);

        let mut symbols = Vec::new();
        for &symbology in &self.config.symbologies {
            deadline.check()?;
            let decoded = match symbology {
                Symbology::Qr => qr::decode(&view, threshold, &deadline)?,
                Symbology::Ean13 | Symbology::Code128 => {
                    oned::decode_rows(&view, threshold, symbology, &self.config, &deadline)?
                }
            };
            if let Some(symbol) = decoded {
                log::debug!(
                    "decoded {:?} symbol, {} bytes",
                    symbol.symbology,
                    symbol.payload.len()
                );
                symbols.push(symbol);
                if !self.config.multi_symbol {
                    break;
                }
            }
        }
        Ok(symbols)
    }

    /// Decode symbols from a raw pixel buffer, validating it first.
    pub fn decode_raw(
        &self,
        width: usize,
        height: usize,
        format: PixelFormat,
        pixels: &[u8],
    ) -> Result<Vec<DecodedSymbol>, DecodeError> {
        let frame = FrameView::new(width, height, format, pixels)?;
        self.decode(&frame)
    }
}
