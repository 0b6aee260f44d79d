//! Decoder configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Symbology;

/// Configuration for a [`crate::Decoder`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Symbologies to try, in priority order. QR first by default.
    pub symbologies: Vec<Symbology>,
    /// When set, every configured symbology runs and all detections are
    /// reported. Otherwise the first symbology that yields a symbol wins.
    pub multi_symbol: bool,
    /// Wall-clock budget for one `decode` call. Checked between decode
    /// stages; exceeding it aborts the call with a retryable timeout.
    pub time_budget: Option<Duration>,
    /// Row step for 1D scanline passes. The plane height is always covered;
    /// larger strides trade robustness for speed.
    pub row_stride: usize,
    /// Distinct scanlines that must agree on a 1D payload before it is
    /// reported. Filters single-row noise hits.
    pub min_row_votes: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            symbologies: vec![Symbology::Qr, Symbology::Ean13, Symbology::Code128],
            multi_symbol: false,
            time_budget: None,
            row_stride: 4,
            min_row_votes: 2,
        }
    }
}

impl DecodeConfig {
    /// Restrict decoding to a single symbology.
    pub fn only(symbology: Symbology) -> Self {
        Self {
            symbologies: vec![symbology],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_is_qr_first() {
        let cfg = DecodeConfig::default();
        assert_eq!(cfg.symbologies.first(), Some(&Symbology::Qr));
    }
}
