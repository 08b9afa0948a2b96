//! LZSS decoding for `Cprs` packed entries
//!
//! Each flag byte governs the next eight tokens, least significant bit first.
//! A set bit is a literal byte. A clear bit is a two byte back reference:
//! 12-bit distance (low byte, then the high nibble of the second byte) and a
//! 4-bit length biased by 3. Distances reaching before the start of the
//! output produce spaces.

use crate::{Error, Result};

const MIN_MATCH: usize = 3;

/// Decode `data` until `expected_size` bytes have been produced.
///
/// The trailing checksum that follows the stream is not verified.
pub(crate) fn decompress(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_size);
    let mut input = data.iter().copied();

    while out.len() < expected_size {
        let flags = input
            .next()
            .ok_or_else(|| underrun(out.len(), expected_size))?;

        for bit in 0..8 {
            if out.len() >= expected_size {
                break;
            }

            if flags & (1 << bit) != 0 {
                let byte = input
                    .next()
                    .ok_or_else(|| underrun(out.len(), expected_size))?;
                out.push(byte);
                continue;
            }

            let (lo, hi) = match (input.next(), input.next()) {
                (Some(lo), Some(hi)) => (lo, hi),
                _ => return Err(underrun(out.len(), expected_size)),
            };
            let distance = usize::from(lo) | (usize::from(hi & 0xf0) << 4);
            let length = usize::from(hi & 0x0f) + MIN_MATCH;
            if distance == 0 {
                return Err(Error::Decompression(format!(
                    "zero-distance back reference at output byte {}",
                    out.len()
                )));
            }
            let start = out.len() as isize - distance as isize;

            for i in 0..length {
                let src = start + i as isize;
                let byte = match usize::try_from(src) {
                    Err(_) => b' ',
                    Ok(src) => *out.get(src).ok_or_else(|| {
                        Error::Decompression(format!("back reference to unwritten byte {}", src))
                    })?,
                };
                out.push(byte);
            }
        }
    }

    out.truncate(expected_size);
    Ok(out)
}

fn underrun(produced: usize, expected: usize) -> Error {
    Error::Decompression(format!(
        "input ended after {} of {} bytes",
        produced, expected
    ))
}
