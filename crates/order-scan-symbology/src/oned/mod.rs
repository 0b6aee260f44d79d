//! 1D symbology decoding over horizontal scanlines.
//!
//! Each pass run-length encodes rows of the luminance plane around a global
//! threshold and hands the runs to a per-symbology row decoder. A payload is
//! only reported once enough distinct rows agree on it.

pub(crate) mod code128;
pub(crate) mod ean13;
mod runs;

use std::collections::HashMap;

use order_scan_core::LumaView;

use crate::deadline::Deadline;
use crate::{DecodeConfig, DecodeError, DecodedSymbol, Symbology};

pub(crate) use runs::{colors_alternate_from, pattern_distance, row_runs, Run};

/// Decode a 1D symbology by voting across scanlines.
pub(crate) fn decode_rows(
    plane: &LumaView<'_>,
    threshold: u8,
    symbology: Symbology,
    cfg: &DecodeConfig,
    deadline: &Deadline,
) -> Result<Option<DecodedSymbol>, DecodeError> {
    let decode_row: fn(&[Run]) -> Option<String> = match symbology {
        Symbology::Ean13 => ean13::decode_row,
        Symbology::Code128 => code128::decode_row,
        Symbology::Qr => unreachable!("QR is not a scanline symbology"),
    };

    let stride = cfg.row_stride.max(1);
    let mut votes: HashMap<String, usize> = HashMap::new();
    let mut rows_scanned = 0usize;

    for y in (0..plane.height).step_by(stride) {
        deadline.check()?;
        rows_scanned += 1;

        let runs = row_runs(plane.row(y), threshold);
        if let Some(payload) = decode_row(&runs) {
            *votes.entry(payload).or_default() += 1;
        }
    }

    let Some((payload, count)) = votes.into_iter().max_by_key(|(_, c)| *c) else {
        return Ok(None);
    };
    if count < cfg.min_row_votes.max(1) {
        log::debug!(
            "{symbology:?} payload seen on {count} rows, below vote floor {}",
            cfg.min_row_votes
        );
        return Ok(None);
    }

    let confidence = (count as f32 / rows_scanned.max(1) as f32).clamp(0.0, 1.0);
    Ok(Some(DecodedSymbol {
        payload: payload.into_bytes(),
        symbology,
        confidence: Some(confidence),
    }))
}
