//! Data segment parsing: numeric, alphanumeric and byte modes.

use super::bitstream::BitReader;

const MODE_TERMINATOR: u32 = 0b0000;
const MODE_NUMERIC: u32 = 0b0001;
const MODE_ALPHANUMERIC: u32 = 0b0010;
const MODE_BYTE: u32 = 0b0100;

const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Character-count field width for a mode at a version.
fn count_bits(mode: u32, version: usize) -> usize {
    let small = version <= 9;
    match mode {
        MODE_NUMERIC => {
            if small {
                10
            } else {
                12
            }
        }
        MODE_ALPHANUMERIC => {
            if small {
                9
            } else {
                11
            }
        }
        _ => {
            if small {
                8
            } else {
                16
            }
        }
    }
}

/// Parse the concatenated data codewords of a symbol into payload bytes.
///
/// ECI, Kanji and structured-append segments are not supported and fail the
/// parse; the scan session simply moves on to the next frame.
pub(crate) fn parse_payload(data: &[u8], version: usize) -> Option<Vec<u8>> {
    let mut reader = BitReader::new(data);
    let mut out = Vec::new();

    loop {
        if reader.available() < 4 {
            break;
        }
        let mode = reader.read(4)?;
        match mode {
            MODE_TERMINATOR => break,
            MODE_NUMERIC => parse_numeric(&mut reader, version, &mut out)?,
            MODE_ALPHANUMERIC => parse_alphanumeric(&mut reader, version, &mut out)?,
            MODE_BYTE => parse_bytes(&mut reader, version, &mut out)?,
            other => {
                log::debug!("unsupported QR segment mode {other:#06b}");
                return None;
            }
        }
    }

    Some(out)
}

fn parse_numeric(reader: &mut BitReader<'_>, version: usize, out: &mut Vec<u8>) -> Option<()> {
    let mut count = reader.read(count_bits(MODE_NUMERIC, version))? as usize;

    while count >= 3 {
        let v = reader.read(10)?;
        if v >= 1000 {
            return None;
        }
        out.push(b'0' + (v / 100) as u8);
        out.push(b'0' + (v / 10 % 10) as u8);
        out.push(b'0' + (v % 10) as u8);
        count -= 3;
    }
    if count == 2 {
        let v = reader.read(7)?;
        if v >= 100 {
            return None;
        }
        out.push(b'0' + (v / 10) as u8);
        out.push(b'0' + (v % 10) as u8);
    } else if count == 1 {
        let v = reader.read(4)?;
        if v >= 10 {
            return None;
        }
        out.push(b'0' + v as u8);
    }
    Some(())
}

fn parse_alphanumeric(
    reader: &mut BitReader<'_>,
    version: usize,
    out: &mut Vec<u8>,
) -> Option<()> {
    let mut count = reader.read(count_bits(MODE_ALPHANUMERIC, version))? as usize;

    while count >= 2 {
        let v = reader.read(11)?;
        let (a, b) = (v / 45, v % 45);
        if a >= 45 {
            return None;
        }
        out.push(ALPHANUMERIC_CHARS[a as usize]);
        out.push(ALPHANUMERIC_CHARS[b as usize]);
        count -= 2;
    }
    if count == 1 {
        let v = reader.read(6)?;
        if v >= 45 {
            return None;
        }
        out.push(ALPHANUMERIC_CHARS[v as usize]);
    }
    Some(())
}

fn parse_bytes(reader: &mut BitReader<'_>, version: usize, out: &mut Vec<u8>) -> Option<()> {
    let count = reader.read(count_bits(MODE_BYTE, version))? as usize;
    for _ in 0..count {
        out.push(reader.read(8)? as u8);
    }
    Some(())
}
