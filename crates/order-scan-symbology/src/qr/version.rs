//! Version metadata: dimensions, alignment grids, error-correction blocks.
//!
//! Versions 1-10 are supported. Order and table codes are short; bounding
//! the tables here keeps them auditable.

pub(crate) const MIN_DIMENSION: usize = 21;
pub(crate) const MAX_DIMENSION: usize = 57;

/// QR error-correction level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    /// Decode the 2-bit format-information indicator.
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => EcLevel::L,
            0b00 => EcLevel::M,
            0b11 => EcLevel::Q,
            _ => EcLevel::H,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            EcLevel::L => 0,
            EcLevel::M => 1,
            EcLevel::Q => 2,
            EcLevel::H => 3,
        }
    }
}

/// Error-correction block layout for one (version, level) pair.
///
/// `groups` lists `(block_count, data_codewords_per_block)`; every block
/// carries `ec_per_block` correction codewords.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EcBlocks {
    pub ec_per_block: usize,
    pub groups: &'static [(usize, usize)],
}

impl EcBlocks {
    pub(crate) fn block_count(&self) -> usize {
        self.groups.iter().map(|&(n, _)| n).sum()
    }

    pub(crate) fn total_data(&self) -> usize {
        self.groups.iter().map(|&(n, d)| n * d).sum()
    }

    pub(crate) fn total_codewords(&self) -> usize {
        self.total_data() + self.block_count() * self.ec_per_block
    }
}

/// Version for a sampled dimension, when it is one we handle.
pub(crate) fn version_from_dimension(dim: usize) -> Option<usize> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&dim) || dim % 4 != 1 {
        return None;
    }
    Some((dim - 17) / 4)
}

#[inline]
pub(crate) fn dimension_of(version: usize) -> usize {
    17 + 4 * version
}

/// Alignment pattern center coordinates per version.
const ALIGNMENT_CENTERS: [&[usize]; 10] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
];

pub(crate) fn alignment_centers(version: usize) -> &'static [usize] {
    ALIGNMENT_CENTERS[version - 1]
}

/// Block tables per version, in L/M/Q/H order.
const EC_BLOCKS: [[EcBlocks; 4]; 10] = [
    // v1
    [
        EcBlocks { ec_per_block: 7, groups: &[(1, 19)] },
        EcBlocks { ec_per_block: 10, groups: &[(1, 16)] },
        EcBlocks { ec_per_block: 13, groups: &[(1, 13)] },
        EcBlocks { ec_per_block: 17, groups: &[(1, 9)] },
    ],
    // v2
    [
        EcBlocks { ec_per_block: 10, groups: &[(1, 34)] },
        EcBlocks { ec_per_block: 16, groups: &[(1, 28)] },
        EcBlocks { ec_per_block: 22, groups: &[(1, 22)] },
        EcBlocks { ec_per_block: 28, groups: &[(1, 16)] },
    ],
    // v3
    [
        EcBlocks { ec_per_block: 15, groups: &[(1, 55)] },
        EcBlocks { ec_per_block: 26, groups: &[(1, 44)] },
        EcBlocks { ec_per_block: 18, groups: &[(2, 17)] },
        EcBlocks { ec_per_block: 22, groups: &[(2, 13)] },
    ],
    // v4
    [
        EcBlocks { ec_per_block: 20, groups: &[(1, 80)] },
        EcBlocks { ec_per_block: 18, groups: &[(2, 32)] },
        EcBlocks { ec_per_block: 26, groups: &[(2, 24)] },
        EcBlocks { ec_per_block: 16, groups: &[(4, 9)] },
    ],
    // v5
    [
        EcBlocks { ec_per_block: 26, groups: &[(1, 108)] },
        EcBlocks { ec_per_block: 24, groups: &[(2, 43)] },
        EcBlocks { ec_per_block: 18, groups: &[(2, 15), (2, 16)] },
        EcBlocks { ec_per_block: 22, groups: &[(2, 11), (2, 12)] },
    ],
    // v6
    [
        EcBlocks { ec_per_block: 18, groups: &[(2, 68)] },
        EcBlocks { ec_per_block: 16, groups: &[(4, 27)] },
        EcBlocks { ec_per_block: 24, groups: &[(4, 19)] },
        EcBlocks { ec_per_block: 28, groups: &[(4, 15)] },
    ],
    // v7
    [
        EcBlocks { ec_per_block: 20, groups: &[(2, 78)] },
        EcBlocks { ec_per_block: 18, groups: &[(4, 31)] },
        EcBlocks { ec_per_block: 18, groups: &[(2, 14), (4, 15)] },
        EcBlocks { ec_per_block: 26, groups: &[(4, 13), (1, 14)] },
    ],
    // v8
    [
        EcBlocks { ec_per_block: 24, groups: &[(2, 97)] },
        EcBlocks { ec_per_block: 22, groups: &[(2, 38), (2, 39)] },
        EcBlocks { ec_per_block: 22, groups: &[(4, 18), (2, 19)] },
        EcBlocks { ec_per_block: 26, groups: &[(4, 14), (2, 15)] },
    ],
    // v9
    [
        EcBlocks { ec_per_block: 30, groups: &[(2, 116)] },
        EcBlocks { ec_per_block: 22, groups: &[(3, 36), (2, 37)] },
        EcBlocks { ec_per_block: 20, groups: &[(4, 16), (4, 17)] },
        EcBlocks { ec_per_block: 24, groups: &[(4, 12), (4, 13)] },
    ],
    // v10
    [
        EcBlocks { ec_per_block: 18, groups: &[(2, 68), (2, 69)] },
        EcBlocks { ec_per_block: 26, groups: &[(4, 43), (1, 44)] },
        EcBlocks { ec_per_block: 24, groups: &[(6, 19), (2, 20)] },
        EcBlocks { ec_per_block: 28, groups: &[(6, 15), (2, 16)] },
    ],
];

pub(crate) fn ec_blocks(version: usize, level: EcLevel) -> &'static EcBlocks {
    &EC_BLOCKS[version - 1][level.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Total codewords per version, from the symbol geometry.
    const TOTAL_CODEWORDS: [usize; 10] = [26, 44, 70, 100, 134, 172, 196, 242, 292, 346];

    #[test]
    fn block_tables_are_consistent() {
        for version in 1..=10 {
            for level in [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H] {
                let ecb = ec_blocks(version, level);
                assert_eq!(
                    ecb.total_codewords(),
                    TOTAL_CODEWORDS[version - 1],
                    "v{version} {level:?}"
                );
            }
        }
    }

    #[test]
    fn dimension_round_trip() {
        for version in 1..=10 {
            let dim = dimension_of(version);
            assert_eq!(version_from_dimension(dim), Some(version));
        }
        assert_eq!(version_from_dimension(20), None);
        assert_eq!(version_from_dimension(61), None);
    }

    #[test]
    fn ec_level_bits() {
        assert_eq!(EcLevel::from_bits(0b01), EcLevel::L);
        assert_eq!(EcLevel::from_bits(0b00), EcLevel::M);
        assert_eq!(EcLevel::from_bits(0b11), EcLevel::Q);
        assert_eq!(EcLevel::from_bits(0b10), EcLevel::H);
    }
}
