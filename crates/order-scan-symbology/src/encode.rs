//! 1D symbol generation.
//!
//! The counterpart of the scanline decoders: renders payloads into module
//! sequences for printed tickets, labels and synthetic test frames. Shares
//! the width tables with the decode paths.

use crate::oned::code128::{CODE_PATTERNS, START_B, START_C, STOP_PATTERN};
use crate::oned::ean13::{ean13_checksum_ok, FIRST_DIGIT_PARITIES, L_PATTERNS};

/// Errors from symbol generation.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("payload is empty")]
    EmptyText,

    #[error("EAN-13 payload must be exactly 13 ASCII digits")]
    MalformedEan,

    #[error("EAN-13 checksum mismatch")]
    InvalidChecksum,

    #[error("character {0:?} is not encodable in Code 128 set B")]
    UnencodableCharacter(char),
}

/// Encode a 13-digit code (checksum included) into an EAN-13 module
/// sequence with quiet zones. `true` is a dark module.
pub fn ean13(text: &str) -> Result<Vec<bool>, EncodeError> {
    let bytes = text.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(EncodeError::MalformedEan);
    }
    let mut digits = [0u8; 13];
    for (d, &b) in digits.iter_mut().zip(bytes) {
        *d = b - b'0';
    }
    if !ean13_checksum_ok(&digits) {
        return Err(EncodeError::InvalidChecksum);
    }
    Ok(ean13_modules_unchecked(&digits))
}

/// EAN-13 module sequence without checksum validation.
pub(crate) fn ean13_modules_unchecked(digits: &[u8; 13]) -> Vec<bool> {
    let mut modules = vec![false; 11];

    modules.extend([true, false, true]);

    let parity = FIRST_DIGIT_PARITIES[digits[0] as usize];
    for (k, &d) in digits[1..7].iter().enumerate() {
        let mut widths = L_PATTERNS[d as usize];
        if parity & (1 << (5 - k)) != 0 {
            widths.reverse();
        }
        push_widths(&mut modules, &widths, false);
    }

    modules.extend([false, true, false, true, false]);

    for &d in &digits[7..13] {
        push_widths(&mut modules, &L_PATTERNS[d as usize], true);
    }

    modules.extend([true, false, true]);
    modules.extend(std::iter::repeat_n(false, 11));
    modules
}

/// Encode text as Code 128 with quiet zones.
///
/// Even-length all-digit payloads use code set C; everything else uses set
/// B, which covers printable ASCII.
pub fn code128(text: &str) -> Result<Vec<bool>, EncodeError> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(EncodeError::EmptyText);
    }

    let mut values = Vec::with_capacity(bytes.len() + 2);
    if bytes.len() % 2 == 0 && bytes.iter().all(u8::is_ascii_digit) {
        values.push(START_C);
        for pair in bytes.chunks_exact(2) {
            values.push((pair[0] - b'0') * 10 + (pair[1] - b'0'));
        }
    } else {
        values.push(START_B);
        for &b in bytes {
            if !(32..=127).contains(&b) {
                return Err(EncodeError::UnencodableCharacter(char::from(b)));
            }
            values.push(b - 32);
        }
    }
    values.push(symbol_checksum(&values));
    Ok(code128_modules_raw(&values))
}

/// Mod-103 check symbol for a start code plus data values.
pub fn symbol_checksum(values: &[u8]) -> u8 {
    let mut sum = values[0] as u32;
    for (k, &v) in values[1..].iter().enumerate() {
        sum += v as u32 * (k as u32 + 1);
    }
    (sum % 103) as u8
}

/// Code 128 modules from a raw symbol-value sequence (start code through
/// check symbol); appends the stop pattern and quiet zones.
pub fn code128_modules_raw(values: &[u8]) -> Vec<bool> {
    let mut modules = vec![false; 10];
    for &v in values {
        push_widths_alternating(&mut modules, &CODE_PATTERNS[v as usize]);
    }
    push_widths_alternating(&mut modules, &STOP_PATTERN);
    modules.extend(std::iter::repeat_n(false, 10));
    modules
}

/// Render a module sequence into one pixel row, `px` pixels per module.
pub fn modules_to_row(modules: &[bool], px: usize) -> Vec<u8> {
    modules
        .iter()
        .flat_map(|&black| std::iter::repeat_n(if black { 0u8 } else { 255u8 }, px))
        .collect()
}

fn push_widths(modules: &mut Vec<bool>, widths: &[u32], mut black: bool) {
    for &w in widths {
        for _ in 0..w {
            modules.push(black);
        }
        black = !black;
    }
}

fn push_widths_alternating(modules: &mut Vec<bool>, widths: &[u32]) {
    push_widths(modules, widths, true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ean13_rejects_short_input() {
        assert!(matches!(ean13("123"), Err(EncodeError::MalformedEan)));
    }

    #[test]
    fn ean13_rejects_bad_checksum() {
        assert!(matches!(
            ean13("4006381333932"),
            Err(EncodeError::InvalidChecksum)
        ));
    }

    #[test]
    fn ean13_symbol_spans_expected_modules() {
        let modules = ean13("4006381333931").expect("encode");
        // 95 symbol modules plus 11 quiet on each side.
        assert_eq!(modules.len(), 95 + 22);
    }

    #[test]
    fn code128_prefers_set_c_for_digit_pairs() {
        let modules = code128("123456").expect("encode");
        // start + 3 values + checksum = 5 symbols of 11, stop 13, quiet 20.
        assert_eq!(modules.len(), 5 * 11 + 13 + 20);
    }

    #[test]
    fn code128_rejects_control_characters() {
        assert!(matches!(
            code128("a\tb"),
            Err(EncodeError::UnencodableCharacter('\t'))
        ));
    }
}
