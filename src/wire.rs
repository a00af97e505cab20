//! Generic Protocol Buffers wire-format reader.
//!
//! A [`Message`] is an ordered, owned sequence of [`Field`]s — an arena plus
//! a length, rather than the teacher's circular doubly-linked list with a
//! sentinel head (see `DESIGN.md`). Cursors are plain indices into that
//! arena; "one past the end" (`fields.len()`) plays the role the sentinel
//! head played in the source, without a raw pointer in sight.

use crate::error::{Error, Result};
use crate::varint::{read_varint, read_varint_optional_limited};
use std::io::Read;

/// A tag varint fits in 32 bits, so it can never take more than 5 bytes.
const MAX_TAG_BYTES: usize = 5;

/// Wire type of a field, as encoded in the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    I64 = 1,
    Len = 2,
    SGroup = 3,
    EGroup = 4,
    I32 = 5,
}

impl WireType {
    fn from_u64(v: u64) -> Result<WireType> {
        match v {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            _ => Err(Error::malformed(format!("wire type {} out of range", v))),
        }
    }
}

/// What a field navigation call expects a matching field's wire type to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Any,
    Type(WireType),
}

impl ExpectedType {
    fn matches(self, actual: WireType) -> bool {
        match self {
            ExpectedType::Any => true,
            ExpectedType::Type(t) => t == actual,
        }
    }
}

/// Direction to advance a cursor in [`Message::next_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Tagged-union field value. LEN values own their buffer; the buffer's
/// lifetime is exactly the enclosing [`Message`]'s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Varint(u64),
    I64(u64),
    I32(u32),
    Len(Vec<u8>),
    /// SGROUP/EGROUP: deprecated, no payload.
    Group,
}

impl FieldValue {
    pub fn as_varint(&self) -> Option<u64> {
        match self {
            FieldValue::Varint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_len(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Len(b) => Some(b),
            _ => None,
        }
    }
}

/// A (field-number, wire-type, value) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub number: u32,
    pub wire_type: WireType,
    pub value: FieldValue,
}

/// A fully-decoded message: an ordered, traversable collection of fields
/// preserving source order and permitting duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fields: Vec<Field>,
}

/// A stable reference to a field within a [`Message`]: its arena index.
pub type Cursor = usize;

impl Message {
    /// Reads fields from `reader` until exactly `len` bytes have been
    /// consumed. Consuming fewer or more than `len` fails with
    /// [`Error::Malformed`]. `len == 0` yields the empty field list.
    pub fn read<R: Read>(reader: &mut R, len: usize) -> Result<Message> {
        let mut counted = CountingReader { inner: reader, consumed: 0 };
        let mut fields = Vec::new();
        while counted.consumed < len {
            match read_tag(&mut counted)? {
                None => {
                    return Err(Error::malformed(
                        "message ended before declared length was consumed",
                    ))
                }
                Some((number, wire_type)) => {
                    let value = read_value(&mut counted, wire_type)?;
                    fields.push(Field { number, wire_type, value });
                }
            }
        }
        if counted.consumed != len {
            return Err(Error::malformed(format!(
                "message consumed {} bytes, expected {}",
                counted.consumed, len
            )));
        }
        Ok(Message { fields })
    }

    /// Wraps an in-memory buffer as a byte source and reads it as a message
    /// of exactly `buf.len()` bytes.
    pub fn read_embedded(buf: &[u8]) -> Result<Message> {
        let mut cursor = std::io::Cursor::new(buf);
        Message::read(&mut cursor, buf.len())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_at(&self, cursor: Cursor) -> &Field {
        &self.fields[cursor]
    }

    /// Returns the *last* field matching `number` (protobuf "last value
    /// wins"), or `None` if none exists. If `expected` is `Any` the type
    /// check is skipped; otherwise a matching number with a mismatched type
    /// is treated as absent.
    pub fn get_field(&self, number: u32, expected: ExpectedType) -> Option<Cursor> {
        self.fields
            .iter()
            .enumerate()
            .rev()
            .find(|(_, f)| f.number == number && expected.matches(f.wire_type))
            .map(|(idx, _)| idx)
    }

    /// Advances from `cursor` (or the head, if `None`) in `direction` to the
    /// next field matching `number`/`expected`. Does not wrap past either
    /// end of the sequence.
    pub fn next_field(
        &self,
        cursor: Option<Cursor>,
        number: u32,
        expected: ExpectedType,
        direction: Direction,
    ) -> Option<Cursor> {
        let len = self.fields.len();
        let mut idx = match (cursor, direction) {
            (None, Direction::Forward) => 0,
            (None, Direction::Backward) => return None, // head has no predecessor
            (Some(c), Direction::Forward) => c + 1,
            (Some(c), Direction::Backward) => {
                if c == 0 {
                    return None;
                }
                c - 1
            }
        };
        loop {
            if idx >= len {
                return None;
            }
            let f = &self.fields[idx];
            if f.number == number && expected.matches(f.wire_type) {
                return Some(idx);
            }
            match direction {
                Direction::Forward => idx += 1,
                Direction::Backward => {
                    if idx == 0 {
                        return None;
                    }
                    idx -= 1;
                }
            }
        }
    }

    /// Expands every packed LEN field numbered `number` in place: each such
    /// field's buffer is reinterpreted as a concatenation of
    /// `primitive`-encoded values, and the resulting primitive fields are
    /// spliced in where the LEN field was, preserving surrounding order.
    ///
    /// All-or-nothing per `number`: on failure the message is left exactly
    /// as it was (no partial expansion). Silently succeeds (no-op) if no
    /// field with `number` exists.
    pub fn expand_packed(&mut self, number: u32, primitive: WireType) -> Result<()> {
        let mut new_fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.number != number || field.wire_type != WireType::Len {
                new_fields.push(field.clone());
                continue;
            }
            let buf = match &field.value {
                FieldValue::Len(b) => b,
                _ => unreachable!(),
            };
            let expanded = expand_packed_buffer(buf, number, primitive)?;
            new_fields.extend(expanded);
        }
        self.fields = new_fields;
        Ok(())
    }
}

fn expand_packed_buffer(buf: &[u8], number: u32, primitive: WireType) -> Result<Vec<Field>> {
    let mut cursor = std::io::Cursor::new(buf);
    let mut out = Vec::new();
    let total = buf.len() as u64;
    loop {
        if cursor.position() >= total {
            break;
        }
        let value = read_value(&mut cursor, primitive)?;
        out.push(Field { number, wire_type: primitive, value });
    }
    Ok(out)
}

/// A `Read` wrapper that counts bytes consumed, so [`Message::read`] can
/// enforce the exact-length invariant without pre-slicing the source.
struct CountingReader<'a, R: Read> {
    inner: &'a mut R,
    consumed: usize,
}

impl<'a, R: Read> Read for CountingReader<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n;
        Ok(n)
    }
}

/// Decodes a tag: a base-128 varint whose low three bits are the wire type
/// and whose remaining bits are the field number. Fails with
/// [`Error::Malformed`] if the varint exceeds five bytes, the stream ends
/// mid-varint, or the wire type is out of range. Reports clean end-of-input
/// (zero bytes consumed) as `Ok(None)`.
pub fn read_tag<R: Read>(reader: &mut R) -> Result<Option<(u32, WireType)>> {
    let raw = match read_varint_optional_limited(reader, MAX_TAG_BYTES)? {
        None => return Ok(None),
        Some(v) => v,
    };
    let wire_type = WireType::from_u64(raw & 0x7)?;
    let number = (raw >> 3) as u32;
    Ok(Some((number, wire_type)))
}

fn read_value<R: Read>(reader: &mut R, wire_type: WireType) -> Result<FieldValue> {
    match wire_type {
        WireType::Varint => Ok(FieldValue::Varint(read_varint(reader)?)),
        WireType::I64 => {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            Ok(FieldValue::I64(u64::from_le_bytes(buf)))
        }
        WireType::I32 => {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            Ok(FieldValue::I32(u32::from_le_bytes(buf)))
        }
        WireType::Len => {
            let len = read_varint(reader)?;
            let len = usize::try_from(len).map_err(|_| Error::malformed("LEN too large"))?;
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;
            Ok(FieldValue::Len(buf))
        }
        WireType::SGroup | WireType::EGroup => Ok(FieldValue::Group),
    }
}
