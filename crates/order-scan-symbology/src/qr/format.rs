//! Format information: EC level and mask id, BCH(15,5) protected.

use super::bitmatrix::BitMatrix;
use super::version::EcLevel;

/// Decoded format information.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FormatInfo {
    pub ec_level: EcLevel,
    pub mask: u8,
}

/// BCH generator polynomial for the 10 check bits.
const FORMAT_GENERATOR: u32 = 0x537;
/// Fixed mask applied to every encoded format word.
const FORMAT_XOR_MASK: u32 = 0x5412;
/// Worst Hamming distance we still accept as a read of a valid word.
const MAX_FORMAT_DISTANCE: u32 = 3;

/// Encode a 5-bit data word (EC bits << 3 | mask) into the masked 15-bit
/// format sequence.
pub(crate) fn encode_format(data5: u32) -> u32 {
    let value = data5 << 10;
    let mut rem = value;
    for i in (10..=14).rev() {
        if rem & (1 << i) != 0 {
            rem ^= FORMAT_GENERATOR << (i - 10);
        }
    }
    (value | rem) ^ FORMAT_XOR_MASK
}

/// Module positions of the first format copy, in read order (x, y).
pub(crate) fn copy_a_positions() -> [(usize, usize); 15] {
    let mut pos = [(0usize, 0usize); 15];
    let mut k = 0;
    for x in 0..6 {
        pos[k] = (x, 8);
        k += 1;
    }
    pos[k] = (7, 8);
    pos[k + 1] = (8, 8);
    pos[k + 2] = (8, 7);
    k += 3;
    for y in (0..6).rev() {
        pos[k] = (8, y);
        k += 1;
    }
    pos
}

/// Module positions of the second format copy for `dim`, in read order.
pub(crate) fn copy_b_positions(dim: usize) -> [(usize, usize); 15] {
    let mut pos = [(0usize, 0usize); 15];
    let mut k = 0;
    for y in ((dim - 7)..dim).rev() {
        pos[k] = (8, y);
        k += 1;
    }
    for x in (dim - 8)..dim {
        pos[k] = (x, 8);
        k += 1;
    }
    pos
}

fn read_word(matrix: &BitMatrix, positions: &[(usize, usize)]) -> u32 {
    positions.iter().fold(0u32, |acc, &(x, y)| {
        (acc << 1) | u32::from(matrix.get(x, y))
    })
}

/// Read and BCH-correct the format information from both copies.
pub(crate) fn read_format(matrix: &BitMatrix) -> Option<FormatInfo> {
    let word_a = read_word(matrix, &copy_a_positions());
    let word_b = read_word(matrix, &copy_b_positions(matrix.dim()));

    let mut best: Option<(u32, u32)> = None;
    for data5 in 0..32u32 {
        let encoded = encode_format(data5);
        for word in [word_a, word_b] {
            let dist = (encoded ^ word).count_ones();
            if best.map(|(bd, _)| dist < bd).unwrap_or(true) {
                best = Some((dist, data5));
            }
        }
    }

    let (dist, data5) = best?;
    if dist > MAX_FORMAT_DISTANCE {
        log::debug!("format info unreadable (best distance {dist})");
        return None;
    }
    Some(FormatInfo {
        ec_level: EcLevel::from_bits((data5 >> 3) as u8),
        mask: (data5 & 0b111) as u8,
    })
}
