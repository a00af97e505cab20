//! Base-128 varint and zigzag codecs.
//!
//! These are the leaf primitives: tag decoding, VARINT-wire-type values, and
//! packed-repeated expansion are all built on [`read_varint`].

use crate::error::{Error, Result};
use std::io::Read;

/// Maximum byte length of a value-position varint (10 bytes covers a full
/// 64-bit value; an 11th byte could only contribute a bit beyond position
/// 63, which would overflow u64).
const MAX_VARINT_BYTES: usize = 10;

/// Reads a base-128 little-endian varint, up to 10 bytes, as an unsigned
/// 64-bit value. Fails with [`Error::Malformed`] on overflow or an
/// over-long encoding (more than 10 bytes with the continuation bit set).
pub fn read_varint<R: Read>(reader: &mut R) -> Result<u64> {
    read_varint_impl(reader, MAX_VARINT_BYTES, false).map(|v| v.unwrap())
}

/// Reads a varint capped at `max_bytes` (used by tag decoding, which caps at
/// 5 bytes since a tag fits in 32 bits).
pub fn read_varint_limited<R: Read>(reader: &mut R, max_bytes: usize) -> Result<u64> {
    read_varint_impl(reader, max_bytes, false).map(|v| v.unwrap())
}

/// Like [`read_varint_limited`], but reports a clean end-of-input distinctly
/// from a mid-varint failure: returns `Ok(None)` only when the very first
/// byte is immediately unavailable (zero bytes consumed).
pub fn read_varint_optional_limited<R: Read>(
    reader: &mut R,
    max_bytes: usize,
) -> Result<Option<u64>> {
    read_varint_impl(reader, max_bytes, true)
}

/// Like [`read_varint`], but reports clean end-of-input as `Ok(None)`.
pub fn read_varint_optional<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    read_varint_impl(reader, MAX_VARINT_BYTES, true)
}

/// Shared implementation. `allow_clean_eof` controls whether a
/// zero-bytes-consumed start is reported as `Ok(None)` (for callers
/// distinguishing "no more fields" from corruption) or as `Err(Io(..))`.
fn read_varint_impl<R: Read>(
    reader: &mut R,
    max_bytes: usize,
    allow_clean_eof: bool,
) -> Result<Option<u64>> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    let mut byte = [0u8; 1];
    for i in 0..max_bytes {
        let n = reader.read(&mut byte)?;
        if n == 0 {
            if i == 0 && allow_clean_eof {
                return Ok(None);
            }
            return Err(if i == 0 {
                Error::malformed("unexpected end of input reading varint")
            } else {
                Error::malformed("truncated varint")
            });
        }
        let b = byte[0];
        if i == MAX_VARINT_BYTES - 1 && (b & 0x80) != 0 {
            return Err(Error::malformed("varint exceeds 10 bytes"));
        }
        let low7 = (b & 0x7f) as u64;
        if shift >= 64 || (shift == 63 && low7 > 1) {
            return Err(Error::malformed("varint overflows u64"));
        }
        value |= low7 << shift;
        if b & 0x80 == 0 {
            return Ok(Some(value));
        }
        shift += 7;
    }
    Err(Error::malformed("varint exceeds maximum encoded length"))
}

/// Encodes `value` as a canonical (minimal-length) base-128 varint.
/// Used only by tests, to build fixtures and to check re-encoding
/// canonicality (spec §8 property 2); the library never writes PBF.
#[cfg(test)]
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Maps a signed 64-bit integer to an unsigned one so small magnitudes,
/// positive or negative, encode compactly: `n << 1 ^ n >> 63`.
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn zero_decodes_to_zero() {
        let mut c = Cursor::new(vec![0u8]);
        assert_eq!(read_varint(&mut c).unwrap(), 0);
    }

    #[test]
    fn overlong_encoding_of_zero_is_accepted() {
        let mut c = Cursor::new(vec![0x80, 0x80, 0x80, 0x00]);
        assert_eq!(read_varint(&mut c).unwrap(), 0);
    }

    #[test]
    fn max_value_round_trips() {
        let mut buf = Vec::new();
        write_varint(u64::MAX, &mut buf);
        let mut c = Cursor::new(buf);
        assert_eq!(read_varint(&mut c).unwrap(), u64::MAX);
    }

    #[test]
    fn eleventh_continuation_byte_is_malformed() {
        let buf = vec![0xff; 11];
        let mut c = Cursor::new(buf);
        assert!(read_varint(&mut c).is_err());
    }

    #[test]
    fn truncated_stream_mid_varint_is_malformed() {
        let mut c = Cursor::new(vec![0x80, 0x80]);
        assert!(read_varint(&mut c).is_err());
    }

    #[test]
    fn optional_read_reports_clean_eof() {
        let mut c = Cursor::new(Vec::<u8>::new());
        assert_eq!(read_varint_optional(&mut c).unwrap(), None);
    }

    #[test]
    fn tag_varint_longer_than_five_bytes_is_malformed() {
        let buf = vec![0xff; 6];
        let mut c = Cursor::new(buf);
        assert!(read_varint_optional_limited(&mut c, 5).is_err());
    }

    #[test]
    fn zigzag_known_values() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(2147483647), 4294967294);
        assert_eq!(zigzag_encode(-2147483648), 4294967295);
    }

    proptest! {
        #[test]
        fn zigzag_round_trips(n: i64) {
            prop_assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }

        #[test]
        fn zigzag_round_trips_extremes(n in prop::sample::select(vec![i64::MIN, i64::MAX, 0, -1, 1])) {
            prop_assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }

        #[test]
        fn varint_round_trips(n: u64) {
            let mut buf = Vec::new();
            write_varint(n, &mut buf);
            let mut c = Cursor::new(buf);
            prop_assert_eq!(read_varint(&mut c).unwrap(), n);
        }

        #[test]
        fn delta_zigzag_sequence_round_trips(xs in prop::collection::vec(any::<i64>(), 0..32)) {
            // encode: zigzag(x0), zigzag(x1-x0), ...
            let mut encoded = Vec::with_capacity(xs.len());
            let mut prev: i64 = 0;
            for &x in &xs {
                encoded.push(zigzag_encode(x.wrapping_sub(prev)));
                prev = x;
            }

            // decode
            let mut decoded = Vec::with_capacity(xs.len());
            let mut running: i64 = 0;
            for &d in &encoded {
                running = running.wrapping_add(zigzag_decode(d));
                decoded.push(running);
            }

            prop_assert_eq!(decoded, xs);
        }
    }
}
