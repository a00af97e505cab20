//! Blob framer: the OSM-specific loop over `(blob_header_len, BlobHeader,
//! Blob)` triples that drives the wire codec and hands decoded messages to
//! the domain decoder (spec §4.3). This is [`read_map`], the library's
//! single entry point.

use crate::decode::{decode_header_block, decode_primitive_block};
use crate::error::{Error, Result};
use crate::model::Map;
use crate::schema::*;
use crate::wire::{ExpectedType, Message, WireType};
use crate::zlib::inflate_and_read;
use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, warn};
use std::io::Read;

/// Reads a complete OSM PBF byte stream and materializes a [`Map`].
///
/// Loops reading `(blob_header_len, BlobHeader, Blob)` triples until a
/// clean end-of-input is seen before a header length; a short read there
/// (1-3 bytes) is [`Error::Malformed`]. Any other error aborts the call:
/// everything decoded so far is dropped along with the error return.
pub fn read_map<R: Read>(reader: &mut R) -> Result<Map> {
    let mut map = Map::new();

    loop {
        let hlen = match read_header_len(reader)? {
            None => break,
            Some(n) => n,
        };

        let mut header_buf = vec![0u8; hlen];
        reader.read_exact(&mut header_buf)?;
        let header_msg = Message::read_embedded(&header_buf)?;
        let blob_type = blob_header_type(&header_msg)?;
        let datasize = blob_header_datasize(&header_msg)?;

        let mut blob_buf = vec![0u8; datasize];
        reader.read_exact(&mut blob_buf)?;
        let blob_msg = Message::read_embedded(&blob_buf)?;

        match blob_type.as_str() {
            "OSMHeader" => {
                let inner = materialize_blob(&blob_msg)?;
                if let Some(bbox) = decode_header_block(&inner)? {
                    debug!("decoded HeaderBlock bbox: {:?}", bbox);
                    map.bbox = Some(bbox);
                }
            }
            "OSMData" => {
                let inner = materialize_blob(&blob_msg)?;
                decode_primitive_block(&inner, &mut map)?;
            }
            other => {
                warn!("skipping blob of unknown type `{}`", other);
            }
        }
    }

    Ok(map)
}

/// Reads the 4-byte big-endian blob-header length. A clean end-of-input
/// here (zero bytes read) terminates the framer loop; 1-3 bytes is
/// malformed (a truncated frame header).
fn read_header_len<R: Read>(reader: &mut R) -> Result<Option<usize>> {
    let mut buf = [0u8; 4];
    let mut read = 0;
    while read < 4 {
        let n = reader.read(&mut buf[read..])?;
        if n == 0 {
            if read == 0 {
                return Ok(None);
            }
            return Err(Error::malformed("truncated blob header length"));
        }
        read += n;
    }
    let mut cursor = std::io::Cursor::new(&buf[..]);
    Ok(Some(cursor.read_u32::<BigEndian>()? as usize))
}

fn blob_header_type(header_msg: &Message) -> Result<String> {
    let cursor = header_msg
        .get_field(BLOB_HEADER_TYPE, ExpectedType::Type(WireType::Len))
        .ok_or_else(|| Error::malformed("BlobHeader missing required field `type`"))?;
    let buf = header_msg.field_at(cursor).value.as_len().unwrap();
    String::from_utf8(buf.to_vec()).map_err(|_| Error::malformed("BlobHeader `type` is not valid UTF-8"))
}

fn blob_header_datasize(header_msg: &Message) -> Result<usize> {
    header_msg
        .get_field(BLOB_HEADER_DATASIZE, ExpectedType::Type(WireType::Varint))
        .map(|c| header_msg.field_at(c).value.as_varint().unwrap() as usize)
        .ok_or_else(|| Error::malformed("BlobHeader missing required field `datasize`"))
}

/// Materializes a Blob's inner message: inflates `zlib_data` if present,
/// else parses `raw` directly, else fails. Compression variants other than
/// zlib/raw (fields 4..) are rejected as unsupported.
fn materialize_blob(blob_msg: &Message) -> Result<Message> {
    for field in blob_msg.fields() {
        if field.number >= BLOB_UNSUPPORTED_COMPRESSION_MIN {
            return Err(Error::malformed(format!(
                "unsupported blob compression variant (field {})",
                field.number
            )));
        }
    }

    if let Some(cursor) = blob_msg.get_field(BLOB_ZLIB_DATA, ExpectedType::Type(WireType::Len)) {
        let compressed = blob_msg.field_at(cursor).value.as_len().unwrap();
        let size_hint = blob_msg
            .get_field(BLOB_RAW_SIZE, ExpectedType::Type(WireType::Varint))
            .map(|c| blob_msg.field_at(c).value.as_varint().unwrap() as usize)
            .unwrap_or(compressed.len());
        return inflate_and_read(compressed, size_hint);
    }

    if let Some(cursor) = blob_msg.get_field(BLOB_RAW, ExpectedType::Type(WireType::Len)) {
        let raw = blob_msg.field_at(cursor).value.as_len().unwrap();
        return Message::read_embedded(raw);
    }

    Err(Error::malformed(
        "Blob has neither `raw` nor `zlib_data`",
    ))
}
