//! Codeword extraction: zigzag module order and block de-interleaving.

use super::bitmatrix::BitMatrix;
use super::version::EcBlocks;

/// Walk the data modules in standard placement order.
///
/// Column pairs right to left, alternating upward/downward, skipping the
/// vertical timing column. `visit` receives `(x, y)` for every non-function
/// module.
pub(crate) fn walk_data_modules(functions: &BitMatrix, mut visit: impl FnMut(usize, usize)) {
    let dim = functions.dim() as i32;
    let mut x = dim - 1;
    let mut upward = true;

    while x > 0 {
        if x == 6 {
            x -= 1;
        }
        for step in 0..dim {
            let y = if upward { dim - 1 - step } else { step };
            for dx in 0..2 {
                let xx = (x - dx) as usize;
                let yy = y as usize;
                if !functions.get(xx, yy) {
                    visit(xx, yy);
                }
            }
        }
        x -= 2;
        upward = !upward;
    }
}

/// Read codewords from an unmasked matrix. Remainder bits are dropped.
pub(crate) fn read_codewords(matrix: &BitMatrix, functions: &BitMatrix) -> Vec<u8> {
    let mut out = Vec::new();
    let mut current = 0u8;
    let mut filled = 0u8;

    walk_data_modules(functions, |x, y| {
        current = (current << 1) | u8::from(matrix.get(x, y));
        filled += 1;
        if filled == 8 {
            out.push(current);
            current = 0;
            filled = 0;
        }
    });

    out
}

/// One de-interleaved error-correction block: data codewords followed by
/// `ec` codewords, ready for Reed-Solomon correction.
#[derive(Clone, Debug)]
pub(crate) struct Block {
    pub codewords: Vec<u8>,
    pub data_len: usize,
}

/// Undo codeword interleaving per the version's block table.
pub(crate) fn deinterleave(codewords: &[u8], ecb: &EcBlocks) -> Option<Vec<Block>> {
    let total = ecb.total_codewords();
    if codewords.len() < total {
        return None;
    }

    let mut blocks: Vec<Block> = ecb
        .groups
        .iter()
        .flat_map(|&(count, data_len)| {
            std::iter::repeat_n(data_len, count).map(|data_len| Block {
                codewords: Vec::with_capacity(data_len + ecb.ec_per_block),
                data_len,
            })
        })
        .collect();

    let mut next = codewords.iter().copied();
    let max_data = blocks.iter().map(|b| b.data_len).max()?;
    for i in 0..max_data {
        for block in &mut blocks {
            if i < block.data_len {
                block.codewords.push(next.next()?);
            }
        }
    }
    for _ in 0..ecb.ec_per_block {
        for block in &mut blocks {
            block.codewords.push(next.next()?);
        }
    }

    Some(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::function_map::function_mask;
    use super::super::version::{ec_blocks, EcLevel};

    #[test]
    fn zigzag_covers_every_data_module_once() {
        for version in [1usize, 2, 7] {
            let functions = function_mask(version);
            let dim = functions.dim();
            let mut seen = vec![false; dim * dim];
            walk_data_modules(&functions, |x, y| {
                assert!(!seen[y * dim + x], "module ({x},{y}) visited twice");
                seen[y * dim + x] = true;
            });
            let visited = seen.iter().filter(|&&s| s).count();
            let expected_bits = ec_blocks(version, EcLevel::L).total_codewords() * 8;
            assert!(visited >= expected_bits, "v{version}: {visited} modules");
            // Remainder bits only.
            assert!(visited - expected_bits < 8, "v{version}: {visited} modules");
        }
    }

    #[test]
    fn deinterleave_single_block_is_identity() {
        let ecb = ec_blocks(1, EcLevel::L);
        let codewords: Vec<u8> = (0..26).collect();
        let blocks = deinterleave(&codewords, ecb).expect("deinterleave");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].codewords, codewords);
        assert_eq!(blocks[0].data_len, 19);
    }

    #[test]
    fn deinterleave_uneven_blocks() {
        // v10-M: 4 blocks of 43 data + 1 block of 44 data, 26 ec each.
        let ecb = ec_blocks(10, EcLevel::M);
        let total = ecb.total_codewords();
        let codewords: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        let blocks = deinterleave(&codewords, ecb).expect("deinterleave");
        assert_eq!(blocks.len(), 5);

        // First data round: one codeword per block in order.
        for (b, block) in blocks.iter().enumerate() {
            assert_eq!(block.codewords[0], codewords[b]);
        }
        // The long block's extra data codeword comes after all even rounds.
        let last = &blocks[4];
        assert_eq!(last.data_len, 44);
        assert_eq!(last.codewords[43], codewords[43 * 5]);
    }
}
