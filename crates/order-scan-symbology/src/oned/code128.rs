//! Code 128 row decoding.
//!
//! Symbols are 11 modules over six runs, bar-first. A message is
//! `start (A|B|C), data…, checksum, stop`, where the stop adds a 2-module
//! termination bar (13 modules over seven runs).

use super::{pattern_distance, Run};

/// Module-width table for symbol values 0..=105 (103..=105 are the start
/// codes). Index = symbol value.
pub(crate) const CODE_PATTERNS: [[u32; 6]; 106] = [
    [2, 1, 2, 2, 2, 2],
    [2, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 1],
    [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3],
    [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2],
    [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2],
    [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2],
    [1, 2, 2, 1, 3, 2],
    [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2],
    [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1],
    [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1],
    [2, 1, 3, 2, 1, 2],
    [2, 2, 3, 1, 1, 2],
    [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2],
    [3, 2, 1, 2, 2, 1],
    [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2],
    [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3],
    [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1],
    [1, 1, 1, 3, 2, 3],
    [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3],
    [1, 3, 2, 1, 1, 3],
    [1, 3, 2, 3, 1, 1],
    [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3],
    [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3],
    [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3],
    [1, 1, 3, 3, 2, 1],
    [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1],
    [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1],
    [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1],
    [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1],
    [3, 1, 2, 1, 1, 3],
    [3, 1, 2, 3, 1, 1],
    [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1],
    [2, 2, 1, 4, 1, 1],
    [4, 3, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1],
    [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1],
    [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2],
    [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1],
    [1, 4, 2, 1, 1, 2],
    [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4],
    [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2],
    [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2],
    [1, 2, 1, 1, 4, 2],
    [1, 2, 1, 2, 4, 1],
    [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1],
    [4, 1, 1, 2, 1, 2],
    [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1],
    [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1],
    [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3],
    [1, 1, 1, 3, 4, 1],
    [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1],
    [4, 1, 1, 1, 1, 3],
    [4, 1, 1, 3, 1, 1],
    [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1],
    [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1],
    [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
];

pub(crate) const STOP_PATTERN: [u32; 7] = [2, 3, 3, 1, 1, 1, 2];

pub(crate) const START_A: u8 = 103;
pub(crate) const START_B: u8 = 104;
pub(crate) const START_C: u8 = 105;
const CODE_SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const FNC1: u8 = 102;

const MIN_QUIET_MODULES: f32 = 5.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CodeSet {
    A,
    B,
    C,
}

/// Try to decode one Code 128 message from a run-length encoded row.
pub(crate) fn decode_row(runs: &[Run]) -> Option<String> {
    for i in 0..runs.len() {
        if !runs[i].black {
            continue;
        }
        if i + 6 > runs.len() {
            break;
        }
        let Some(start_code) = match_start(&runs[i..i + 6]) else {
            continue;
        };

        let module = runs[i..i + 6].iter().map(|r| r.len).sum::<usize>() as f32 / 11.0;
        if i > 0 && (runs[i - 1].len as f32) < MIN_QUIET_MODULES * module {
            continue;
        }

        if let Some(text) = try_decode_from(runs, i + 6, start_code) {
            return Some(text);
        }
    }
    None
}

fn try_decode_from(runs: &[Run], mut pos: usize, start_code: u8) -> Option<String> {
    let mut values: Vec<u8> = Vec::new();

    loop {
        if pos + 7 <= runs.len() && pattern_distance(&runs[pos..pos + 7], &STOP_PATTERN).is_some() {
            break;
        }
        if pos + 6 > runs.len() {
            return None;
        }
        values.push(match_symbol(&runs[pos..pos + 6])?);
        pos += 6;
    }

    // At least one data symbol plus the checksum symbol.
    if values.len() < 2 {
        return None;
    }
    let checksum = values.pop().expect("length checked above");
    let mut sum = start_code as u32;
    for (k, &v) in values.iter().enumerate() {
        sum += v as u32 * (k as u32 + 1);
    }
    if sum % 103 != checksum as u32 {
        return None;
    }

    decode_values(start_code, &values)
}

fn decode_values(start_code: u8, values: &[u8]) -> Option<String> {
    let mut set = match start_code {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        START_C => CodeSet::C,
        _ => return None,
    };
    let mut shift: Option<CodeSet> = None;
    let mut out = String::new();

    for &v in values {
        let active = shift.take().unwrap_or(set);
        match active {
            CodeSet::C => match v {
                0..=99 => {
                    out.push(char::from(b'0' + v / 10));
                    out.push(char::from(b'0' + v % 10));
                }
                100 => set = CodeSet::B,
                101 => set = CodeSet::A,
                FNC1 => {}
                _ => return None,
            },
            CodeSet::B => match v {
                0..=95 => out.push(char::from(32 + v)),
                96 | 97 | 100 | FNC1 => {}
                CODE_SHIFT => shift = Some(CodeSet::A),
                CODE_C => set = CodeSet::C,
                101 => set = CodeSet::A,
                _ => return None,
            },
            CodeSet::A => match v {
                0..=63 => out.push(char::from(32 + v)),
                64..=95 => out.push(char::from(v - 64)),
                96 | 97 | 101 | FNC1 => {}
                CODE_SHIFT => shift = Some(CodeSet::B),
                CODE_C => set = CodeSet::C,
                100 => set = CodeSet::B,
                _ => return None,
            },
        }
    }

    if out.is_empty() {
        return None;
    }
    Some(out)
}

fn match_start(runs: &[Run]) -> Option<u8> {
    let mut best: Option<(f32, u8)> = None;
    for value in [START_A, START_B, START_C] {
        if let Some(d) = pattern_distance(runs, &CODE_PATTERNS[value as usize]) {
            if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, value));
            }
        }
    }
    best.map(|(_, v)| v)
}

fn match_symbol(runs: &[Run]) -> Option<u8> {
    let mut best: Option<(f32, u8)> = None;
    for (value, widths) in CODE_PATTERNS.iter().enumerate() {
        if let Some(d) = pattern_distance(runs, widths) {
            if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, value as u8));
            }
        }
    }
    best.map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{code128, code128_modules_raw, modules_to_row, symbol_checksum};
    use crate::oned::row_runs;

    fn render_raw(seq: &[u8], px: usize) -> Vec<u8> {
        modules_to_row(&code128_modules_raw(seq), px)
    }

    #[test]
    fn decodes_code_c_digits() {
        let row = modules_to_row(&code128("123456").expect("encode"), 2);
        let runs = row_runs(&row, 128);
        assert_eq!(decode_row(&runs).as_deref(), Some("123456"));
    }

    #[test]
    fn decodes_code_b_sku() {
        let text = "BST-1009";
        let row = modules_to_row(&code128(text).expect("encode"), 2);
        let runs = row_runs(&row, 128);
        assert_eq!(decode_row(&runs).as_deref(), Some(text));
    }

    #[test]
    fn rejects_bad_checksum() {
        let data = [START_C, 12, 34, 56];
        let mut seq = data.to_vec();
        seq.push((symbol_checksum(&data) + 1) % 103);
        let runs = row_runs(&render_raw(&seq, 2), 128);
        assert_eq!(decode_row(&runs), None);
    }

    #[test]
    fn code_c_switches_to_b() {
        // 12, switch to B, then "X".
        let data = [START_C, 12, 100, b'X' - 32];
        let mut seq = data.to_vec();
        seq.push(symbol_checksum(&data));
        let runs = row_runs(&render_raw(&seq, 2), 128);
        assert_eq!(decode_row(&runs).as_deref(), Some("12X"));
    }

    #[test]
    fn shift_covers_exactly_one_symbol() {
        // Set B, shift to A for one control char, then back in B.
        let data = [START_B, b'o' - 32, CODE_SHIFT, 64 + 9, b'k' - 32];
        let mut seq = data.to_vec();
        seq.push(symbol_checksum(&data));
        let runs = row_runs(&render_raw(&seq, 2), 128);
        assert_eq!(decode_row(&runs).as_deref(), Some("o\tk"));
    }

    #[test]
    fn all_patterns_span_eleven_modules() {
        for (v, p) in CODE_PATTERNS.iter().enumerate() {
            assert_eq!(p.iter().sum::<u32>(), 11, "pattern {v}");
        }
        assert_eq!(STOP_PATTERN.iter().sum::<u32>(), 13);
    }
}
