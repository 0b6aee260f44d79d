//! Raw frame model and luminance plane extraction.
//!
//! A [`FrameView`] borrows whatever pixel buffer the camera or image loader
//! hands us. Decoders never work on it directly; they go through
//! [`FrameView::luminance`] and operate on an 8-bit luma plane.

use serde::{Deserialize, Serialize};

/// Pixel layout of a raw frame buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Single 8-bit luminance channel.
    Luma8,
    /// Interleaved 8-bit RGB.
    Rgb8,
    /// Interleaved 8-bit RGBA; alpha is ignored.
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Errors produced when constructing or converting a frame.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("frame buffer length mismatch (expected {expected} bytes, got {got})")]
    BufferSizeMismatch { expected: usize, got: usize },
}

/// A borrowed camera frame: pixel buffer plus dimensions and format.
///
/// Frames are ephemeral. The frame source owns the buffer; a view is valid
/// for one decode attempt and is never stored.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// Wrap a raw buffer, validating dimensions against the pixel format.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or(FrameError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(FrameError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Extract the 8-bit luminance plane.
    ///
    /// `Luma8` frames are copied as-is; RGB/RGBA frames are reduced with the
    /// BT.601 integer weights used throughout the decode path.
    pub fn luminance(&self) -> LumaImage {
        let mut data = Vec::with_capacity(self.width * self.height);
        match self.format {
            PixelFormat::Luma8 => data.extend_from_slice(self.data),
            PixelFormat::Rgb8 => {
                for px in self.data.chunks_exact(3) {
                    data.push(luma_bt601(px[0], px[1], px[2]));
                }
            }
            PixelFormat::Rgba8 => {
                for px in self.data.chunks_exact(4) {
                    data.push(luma_bt601(px[0], px[1], px[2]));
                }
            }
        }
        LumaImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[inline]
fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    // 77/150/29 out of 256 approximates 0.299/0.587/0.114.
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8
}

/// Owned 8-bit luminance plane, row-major.
#[derive(Clone, Debug)]
pub struct LumaImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl LumaImage {
    /// Borrow this plane as a [`LumaView`].
    #[inline]
    pub fn view(&self) -> LumaView<'_> {
        LumaView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Borrowed 8-bit luminance plane, row-major, `len = width * height`.
#[derive(Clone, Copy, Debug)]
pub struct LumaView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

impl<'a> LumaView<'a> {
    /// One full row of the plane.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

/// Luma value at `(x, y)`, zero outside the plane.
#[inline]
pub fn get_luma(src: &LumaView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

/// Mean luma over the 3x3 neighborhood centred on `(x, y)`.
///
/// Out-of-plane taps read as zero, matching [`get_luma`].
#[inline]
pub fn sample_mean_3x3(src: &LumaView<'_>, x: f32, y: f32) -> u8 {
    let ix = x.floor() as i32;
    let iy = y.floor() as i32;
    let mut sum = 0u32;
    for dy in -1..=1 {
        for dx in -1..=1 {
            sum += get_luma(src, ix + dx, iy + dy) as u32;
        }
    }
    (sum / 9) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        let err = FrameView::new(0, 4, PixelFormat::Luma8, &[]).expect_err("should fail");
        assert!(matches!(err, FrameError::InvalidDimensions { .. }));
    }

    #[test]
    fn rejects_short_buffer() {
        let buf = vec![0u8; 11];
        let err = FrameView::new(2, 2, PixelFormat::Rgb8, &buf).expect_err("should fail");
        assert!(matches!(
            err,
            FrameError::BufferSizeMismatch {
                expected: 12,
                got: 11
            }
        ));
    }

    #[test]
    fn luma8_passthrough() {
        let buf = [10u8, 20, 30, 40];
        let frame = FrameView::new(2, 2, PixelFormat::Luma8, &buf).expect("frame");
        assert_eq!(frame.luminance().data, buf);
    }

    #[test]
    fn rgb_reduction_is_monotone_gray() {
        // Pure gray pixels must map (nearly) onto themselves.
        let buf = [0u8, 0, 0, 255, 255, 255];
        let frame = FrameView::new(2, 1, PixelFormat::Rgb8, &buf).expect("frame");
        let luma = frame.luminance();
        assert_eq!(luma.data[0], 0);
        assert!(luma.data[1] >= 254);
    }

    #[test]
    fn out_of_plane_reads_zero() {
        let buf = [200u8; 4];
        let img = LumaImage {
            width: 2,
            height: 2,
            data: buf.to_vec(),
        };
        assert_eq!(get_luma(&img.view(), -1, 0), 0);
        assert_eq!(get_luma(&img.view(), 0, 5), 0);
        assert_eq!(get_luma(&img.view(), 1, 1), 200);
    }
}
