//! End-to-end helpers over `image` buffers.

use order_scan_core::{FrameError, FrameView, PixelFormat};
use order_scan_engine::{FrameOutcome, OrderStore, ScanSession, SessionError};
use order_scan_symbology::{DecodeError, DecodedSymbol, Decoder};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Wrap an `image::GrayImage` as a frame view.
pub fn gray_frame(img: &::image::GrayImage) -> Result<FrameView<'_>, FrameError> {
    FrameView::new(
        img.width() as usize,
        img.height() as usize,
        PixelFormat::Luma8,
        img.as_raw(),
    )
}

/// Decode all symbols from a grayscale image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(decoder, img), fields(width = img.width(), height = img.height()))
)]
pub fn decode_gray_image(
    decoder: &Decoder,
    img: &::image::GrayImage,
) -> Result<Vec<DecodedSymbol>, ScanError> {
    let frame = gray_frame(img)?;
    Ok(decoder.decode(&frame)?)
}

/// Run one grayscale image through a scan session.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(session, img), fields(width = img.width(), height = img.height()))
)]
pub fn scan_gray_image<S: OrderStore>(
    session: &mut ScanSession<S>,
    img: &::image::GrayImage,
) -> Result<FrameOutcome, ScanError> {
    let frame = gray_frame(img)?;
    Ok(session.process_frame(&frame)?)
}

/// Run one raw pixel buffer through a scan session.
pub fn scan_raw<S: OrderStore>(
    session: &mut ScanSession<S>,
    width: usize,
    height: usize,
    format: PixelFormat,
    pixels: &[u8],
) -> Result<FrameOutcome, ScanError> {
    let frame = FrameView::new(width, height, format, pixels)?;
    Ok(session.process_frame(&frame)?)
}
