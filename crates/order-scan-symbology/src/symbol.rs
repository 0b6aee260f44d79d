//! Decoded symbol model.

use serde::{Deserialize, Serialize};

/// A barcode/QR encoding standard recognized by the decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Qr,
    Ean13,
    Code128,
}

/// One successfully decoded symbol.
///
/// Immutable; ownership moves to the pipeline step that consumes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedSymbol {
    /// Raw decoded payload bytes.
    pub payload: Vec<u8>,
    /// Symbology the payload was decoded from.
    pub symbology: Symbology,
    /// Decoder confidence in `0.0..=1.0`, when the path can estimate one.
    pub confidence: Option<f32>,
}

impl DecodedSymbol {
    /// Payload as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_lossy() {
        let sym = DecodedSymbol {
            payload: vec![b'1', 0xFF, b'2'],
            symbology: Symbology::Code128,
            confidence: None,
        };
        assert_eq!(sym.text(), "1\u{FFFD}2");
    }
}
