//! QR decoding: locate, sample, correct, parse.

mod bitmatrix;
mod bitstream;
mod codewords;
mod format;
mod function_map;
mod locate;
mod reed_solomon;
mod segments;
mod version;

use nalgebra::Point2;
use order_scan_core::{sample_mean_3x3, LumaView};

use crate::deadline::Deadline;
use crate::{DecodeError, DecodedSymbol, Symbology};

use bitmatrix::BitMatrix;
use locate::LocatedQr;

/// Decode one QR symbol from a luminance plane.
///
/// Returns `Ok(None)` whenever the plane holds no readable symbol; every
/// stage failure is local to the frame.
pub(crate) fn decode(
    plane: &LumaView<'_>,
    threshold: u8,
    deadline: &Deadline,
) -> Result<Option<DecodedSymbol>, DecodeError> {
    let Some(located) = locate::locate(plane, threshold, deadline)? else {
        return Ok(None);
    };
    deadline.check()?;

    let Some(qr_version) = version::version_from_dimension(located.dimension) else {
        log::debug!("unsupported symbol dimension {}", located.dimension);
        return Ok(None);
    };

    let mut matrix = sample_grid(plane, threshold, &located);
    let Some(format) = format::read_format(&matrix) else {
        return Ok(None);
    };

    let functions = function_map::function_mask(qr_version);
    function_map::unmask(&mut matrix, format.mask, &functions);

    let raw_codewords = codewords::read_codewords(&matrix, &functions);
    let ecb = version::ec_blocks(qr_version, format.ec_level);
    let Some(mut blocks) = codewords::deinterleave(&raw_codewords, ecb) else {
        return Ok(None);
    };

    let mut corrected = 0usize;
    let mut data = Vec::with_capacity(ecb.total_data());
    for block in &mut blocks {
        match reed_solomon::correct_block(&mut block.codewords, ecb.ec_per_block) {
            Some(errors) => corrected += errors,
            None => {
                log::debug!("uncorrectable block in v{qr_version} symbol");
                return Ok(None);
            }
        }
        data.extend_from_slice(&block.codewords[..block.data_len]);
    }

    let Some(payload) = segments::parse_payload(&data, qr_version) else {
        return Ok(None);
    };
    if payload.is_empty() {
        return Ok(None);
    }

    let capacity = ecb.block_count() * (ecb.ec_per_block / 2);
    let confidence = 1.0 - corrected as f32 / capacity.max(1) as f32;
    Ok(Some(DecodedSymbol {
        payload,
        symbology: Symbology::Qr,
        confidence: Some(confidence.clamp(0.0, 1.0)),
    }))
}

/// Sample the module grid through the affine frame fitted to the three
/// finder centers.
fn sample_grid(plane: &LumaView<'_>, threshold: u8, located: &LocatedQr) -> BitMatrix {
    let dim = located.dimension;
    let span = (dim - 7) as f32;
    let u = (located.top_right - located.top_left) / span;
    let v = (located.bottom_left - located.top_left) / span;

    let mut matrix = BitMatrix::new(dim);
    for my in 0..dim {
        for mx in 0..dim {
            let p: Point2<f32> =
                located.top_left + u * (mx as f32 - 3.0) + v * (my as f32 - 3.0);
            let value = sample_mean_3x3(plane, p.x, p.y);
            matrix.set(mx, my, value < threshold);
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_scan_core::LumaImage;

    use super::version::{dimension_of, ec_blocks, EcLevel};

    use super::format::{copy_a_positions, copy_b_positions, encode_format};
    use super::function_map::{function_mask, mask_bit};
    use super::reed_solomon::tests::encode as rs_encode;
    use super::segments::tests::BitWriter;

    /// Build a complete single-block symbol matrix for byte-mode `text`.
    fn build_symbol(text: &[u8], qr_version: usize, level: EcLevel, mask: u8) -> BitMatrix {
        let ecb = ec_blocks(qr_version, level);
        assert_eq!(ecb.block_count(), 1, "test encoder is single-block only");

        let mut w = BitWriter::new();
        w.write(0b0100, 4);
        w.write(text.len() as u32, 8);
        for &b in text {
            w.write(b as u32, 8);
        }
        let data = w.finish(ecb.total_data());
        let full = rs_encode(&data, ecb.ec_per_block);

        let dim = dimension_of(qr_version);
        let mut matrix = BitMatrix::new(dim);
        let functions = function_mask(qr_version);

        paint_fixed_patterns(&mut matrix, qr_version);

        // Format information, both copies.
        let level_bits = match level {
            EcLevel::L => 0b01u32,
            EcLevel::M => 0b00,
            EcLevel::Q => 0b11,
            EcLevel::H => 0b10,
        };
        let encoded = encode_format((level_bits << 3) | mask as u32);
        for (k, &(x, y)) in copy_a_positions().iter().enumerate() {
            matrix.set(x, y, encoded & (1 << (14 - k)) != 0);
        }
        for (k, &(x, y)) in copy_b_positions(dim).iter().enumerate() {
            matrix.set(x, y, encoded & (1 << (14 - k)) != 0);
        }

        // Codewords in placement order, with the mask applied.
        let mut bit_index = 0usize;
        codewords::walk_data_modules(&functions, |x, y| {
            let bit = if bit_index < full.len() * 8 {
                let byte = full[bit_index / 8];
                (byte >> (7 - bit_index % 8)) & 1 != 0
            } else {
                false
            };
            matrix.set(x, y, bit ^ mask_bit(mask, x, y));
            bit_index += 1;
        });

        matrix
    }

    fn paint_fixed_patterns(matrix: &mut BitMatrix, qr_version: usize) {
        let dim = matrix.dim();

        let mut finder = |ox: usize, oy: usize| {
            for my in 0..7 {
                for mx in 0..7 {
                    let ring = mx == 0 || my == 0 || mx == 6 || my == 6;
                    let core = (2..=4).contains(&mx) && (2..=4).contains(&my);
                    matrix.set(ox + mx, oy + my, ring || core);
                }
            }
        };
        finder(0, 0);
        finder(dim - 7, 0);
        finder(0, dim - 7);

        // Timing lines.
        for i in 8..(dim - 8) {
            matrix.set(i, 6, i % 2 == 0);
            matrix.set(6, i, i % 2 == 0);
        }

        // Dark module.
        matrix.set(8, dim - 8, true);

        // Alignment patterns.
        let centers = version::alignment_centers(qr_version);
        if let Some(&last) = centers.last() {
            for &cy in centers {
                for &cx in centers {
                    let clashes = (cx == 6 && cy == 6)
                        || (cx == 6 && cy == last)
                        || (cx == last && cy == 6);
                    if clashes {
                        continue;
                    }
                    for dy in 0..5usize {
                        for dx in 0..5usize {
                            let ring = dx == 0 || dy == 0 || dx == 4 || dy == 4;
                            let core = dx == 2 && dy == 2;
                            matrix.set(cx - 2 + dx, cy - 2 + dy, ring || core);
                        }
                    }
                }
            }
        }
    }

    /// Render a matrix to pixels with a quiet zone.
    fn render(matrix: &BitMatrix, px: usize, quiet_modules: usize) -> LumaImage {
        let dim = matrix.dim();
        let total = (dim + 2 * quiet_modules) * px;
        let mut img = LumaImage {
            width: total,
            height: total,
            data: vec![255u8; total * total],
        };
        for my in 0..dim {
            for mx in 0..dim {
                if !matrix.get(mx, my) {
                    continue;
                }
                for dy in 0..px {
                    for dx in 0..px {
                        let x = (quiet_modules + mx) * px + dx;
                        let y = (quiet_modules + my) * px + dy;
                        img.data[y * img.width + x] = 0;
                    }
                }
            }
        }
        img
    }

    #[test]
    fn decodes_clean_version1_symbol() {
        let matrix = build_symbol(b"123456", 1, EcLevel::L, 0);
        let img = render(&matrix, 6, 4);
        let deadline = Deadline::new(None);

        let symbol = decode(&img.view(), 128, &deadline)
            .expect("no timeout")
            .expect("symbol should decode");
        assert_eq!(symbol.payload, b"123456");
        assert_eq!(symbol.symbology, Symbology::Qr);
        assert_eq!(symbol.confidence, Some(1.0));
    }

    #[test]
    fn decodes_version2_with_nonzero_mask() {
        let matrix = build_symbol(b"ORD-204, table 7", 2, EcLevel::M, 5);
        let img = render(&matrix, 6, 4);
        let deadline = Deadline::new(None);

        let symbol = decode(&img.view(), 128, &deadline)
            .expect("no timeout")
            .expect("symbol should decode");
        assert_eq!(symbol.payload, b"ORD-204, table 7");
    }

    #[test]
    fn corrects_damaged_modules() {
        let mut matrix = build_symbol(b"123456", 1, EcLevel::L, 0);
        // Damage three data modules in separate codeword neighbourhoods.
        matrix.flip(12, 20);
        matrix.flip(14, 12);
        matrix.flip(19, 10);

        let img = render(&matrix, 6, 4);
        let deadline = Deadline::new(None);
        let symbol = decode(&img.view(), 128, &deadline)
            .expect("no timeout")
            .expect("damage is within correction capacity");
        assert_eq!(symbol.payload, b"123456");
        let confidence = symbol.confidence.expect("confidence present");
        assert!(confidence < 1.0);
    }

    #[test]
    fn blank_plane_decodes_to_nothing() {
        let img = LumaImage {
            width: 100,
            height: 100,
            data: vec![255; 100 * 100],
        };
        let deadline = Deadline::new(None);
        assert!(decode(&img.view(), 128, &deadline)
            .expect("no timeout")
            .is_none());
    }
}
