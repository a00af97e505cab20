//! Compression adapter: inflates a zlib-deflated LEN buffer and re-parses it
//! through the wire codec.

use crate::error::{Error, Result};
use crate::wire::Message;
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Inflates `compressed` into a freshly allocated buffer sized to
/// `size_hint` (grown as needed if the hint undershoots), then reads the
/// result as an embedded message. Fails with [`Error::Decompress`] if zlib
/// reports anything other than a successful stream end.
pub fn inflate_and_read(compressed: &[u8], size_hint: usize) -> Result<Message> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::with_capacity(size_hint);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::decompress(e.to_string()))?;
    Message::read_embedded(&out)
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_and_parses_embedded_message() {
        let mut raw = Vec::new();
        crate::varint::write_varint((1u64 << 3) | 0, &mut raw); // tag for field 1, varint
        crate::varint::write_varint(42, &mut raw);
        let compressed = zlib_compress(&raw);

        let msg = inflate_and_read(&compressed, raw.len()).unwrap();
        assert_eq!(msg.fields().len(), 1);
        assert_eq!(msg.fields()[0].number, 1);
    }

    #[test]
    fn undershot_size_hint_still_succeeds() {
        let raw = vec![0u8; 4096];
        let compressed = zlib_compress(&raw);
        // size_hint of 1 is far too small; read_to_end must still grow the buffer.
        let result = inflate_and_read(&compressed, 1);
        // the payload isn't a valid message, but it must fail during message
        // parsing, not during inflation.
        assert!(result.is_err());
    }

    #[test]
    fn corrupted_stream_reports_decompress_error() {
        let garbage = vec![0xde, 0xad, 0xbe, 0xef];
        match inflate_and_read(&garbage, 16) {
            Err(Error::Decompress(_)) => {}
            other => panic!("expected Decompress error, got {:?}", other),
        }
    }
}
