//! Shared fixtures for the decode benchmarks.

use order_scan_symbology::encode::{code128, ean13, modules_to_row};

/// Tile a 1D module sequence into a tall synthetic frame buffer.
pub fn barcode_frame(modules: &[bool], px: usize, height: usize) -> (Vec<u8>, usize, usize) {
    let row = modules_to_row(modules, px);
    let width = row.len();
    let mut pixels = Vec::with_capacity(width * height);
    for _ in 0..height {
        pixels.extend_from_slice(&row);
    }
    (pixels, width, height)
}

/// An EAN-13 retail code frame.
pub fn ean13_frame() -> (Vec<u8>, usize, usize) {
    let modules = ean13("4006381333931").expect("valid code");
    barcode_frame(&modules, 3, 64)
}

/// A Code 128 order-id frame.
pub fn code128_frame() -> (Vec<u8>, usize, usize) {
    let modules = code128("204991").expect("valid code");
    barcode_frame(&modules, 3, 64)
}

/// A featureless frame, the common case at camera frame rate.
pub fn blank_frame() -> (Vec<u8>, usize, usize) {
    (vec![255u8; 640 * 480], 640, 480)
}
