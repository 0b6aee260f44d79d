//! Function-module map and data masking.

use super::bitmatrix::BitMatrix;
use super::version::{alignment_centers, dimension_of};

/// Build the function-module map for a version: `true` marks modules that
/// carry no data (finders, separators, format/version areas, timing,
/// alignment patterns, dark module).
pub(crate) fn function_mask(version: usize) -> BitMatrix {
    let dim = dimension_of(version);
    let mut mask = BitMatrix::new(dim);

    // Finder + separator + format corners. The bottom-left block also
    // covers the dark module at (8, dim-8).
    for y in 0..9 {
        for x in 0..9 {
            mask.set(x, y, true);
        }
    }
    for y in 0..9 {
        for x in (dim - 8)..dim {
            mask.set(x, y, true);
        }
    }
    for y in (dim - 8)..dim {
        for x in 0..9 {
            mask.set(x, y, true);
        }
    }

    // Timing lines.
    for i in 0..dim {
        mask.set(i, 6, true);
        mask.set(6, i, true);
    }

    // Alignment patterns, skipping the three finder corners.
    let centers = alignment_centers(version);
    if let Some(&last) = centers.last() {
        for &cy in centers {
            for &cx in centers {
                let clashes = (cx == 6 && cy == 6)
                    || (cx == 6 && cy == last)
                    || (cx == last && cy == 6);
                if clashes {
                    continue;
                }
                for y in (cy - 2)..=(cy + 2) {
                    for x in (cx - 2)..=(cx + 2) {
                        mask.set(x, y, true);
                    }
                }
            }
        }
    }

    // Version information blocks, versions 7 and up.
    if version >= 7 {
        for y in 0..6 {
            for x in (dim - 11)..(dim - 8) {
                mask.set(x, y, true);
                mask.set(y, x, true);
            }
        }
    }

    mask
}

/// Whether the data mask with the given id inverts module `(x, y)`.
#[inline]
pub(crate) fn mask_bit(mask: u8, x: usize, y: usize) -> bool {
    match mask {
        0 => (y + x) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (y + x) % 3 == 0,
        4 => (y / 2 + x / 3) % 2 == 0,
        5 => (y * x) % 2 + (y * x) % 3 == 0,
        6 => ((y * x) % 2 + (y * x) % 3) % 2 == 0,
        _ => ((y + x) % 2 + (y * x) % 3) % 2 == 0,
    }
}

/// Remove the data mask in place, leaving function modules untouched.
pub(crate) fn unmask(matrix: &mut BitMatrix, mask: u8, functions: &BitMatrix) {
    let dim = matrix.dim();
    for y in 0..dim {
        for x in 0..dim {
            if !functions.get(x, y) && mask_bit(mask, x, y) {
                matrix.flip(x, y);
            }
        }
    }
}
