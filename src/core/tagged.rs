//! # Tagged Wire Codec
//!
//! Protobuf-compatible tag/length/value encoding.
//!
//! ## Wire Format
//! ```text
//! tag   = varint((field_number << 3) | wire_type)
//! VARINT(0)  varint value
//! I64(1)     8 raw bytes, little-endian
//! LEN(2)     varint length, then that many bytes
//! I32(5)     4 raw bytes, little-endian
//! ```
//!
//! Nested messages are encoded into a fresh buffer first and spliced in behind
//! their length, so no backpatching is needed.
//!
//! Decoding walks fields with [`FieldReader`]. Every wire type carries its own
//! width, so fields a schema does not know about are skipped rather than rejected.

use crate::core::varint;
use crate::error::{ProtocolError, Result};
use bytes::BufMut;
use tracing::trace;

/// Protobuf wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    I64 = 1,
    Len = 2,
    I32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            5 => Ok(WireType::I32),
            other => Err(ProtocolError::UnsupportedWireType(other)),
        }
    }
}

/// Largest field number that fits in a 32-bit tag beside the wire type.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Build a tag. `field_number` must be in `1..=MAX_FIELD_NUMBER`, checked in
/// debug builds only.
#[inline]
pub fn make_tag(field_number: u32, wire_type: WireType) -> u32 {
    debug_assert!(
        field_number <= MAX_FIELD_NUMBER,
        "field number {field_number} does not fit in a tag"
    );
    (field_number << 3) | wire_type as u32
}

/// Split a tag into field number and wire type. Field 0 is never valid.
#[inline]
pub fn parse_tag(tag: u32) -> Result<(u32, WireType)> {
    let field_number = tag >> 3;
    if field_number == 0 {
        return Err(ProtocolError::InvalidFieldNumber(field_number));
    }
    Ok((field_number, WireType::try_from((tag & 0x07) as u8)?))
}

pub fn put_tag<B: BufMut>(buf: &mut B, field_number: u32, wire_type: WireType) {
    varint::encode(make_tag(field_number, wire_type), buf);
}

pub fn put_varint_field<B: BufMut>(buf: &mut B, field_number: u32, value: u64) {
    put_tag(buf, field_number, WireType::Varint);
    varint::encode(value, buf);
}

pub fn put_sint_field<B: BufMut>(buf: &mut B, field_number: u32, value: i64) {
    put_tag(buf, field_number, WireType::Varint);
    varint::encode_signed(value, buf);
}

pub fn put_fixed32_field<B: BufMut>(buf: &mut B, field_number: u32, value: u32) {
    put_tag(buf, field_number, WireType::I32);
    buf.put_u32_le(value);
}

pub fn put_float_field<B: BufMut>(buf: &mut B, field_number: u32, value: f32) {
    put_fixed32_field(buf, field_number, value.to_bits());
}

pub fn put_fixed64_field<B: BufMut>(buf: &mut B, field_number: u32, value: u64) {
    put_tag(buf, field_number, WireType::I64);
    buf.put_u64_le(value);
}

pub fn put_len_field<B: BufMut>(buf: &mut B, field_number: u32, bytes: &[u8]) {
    put_tag(buf, field_number, WireType::Len);
    varint::encode(bytes.len() as u64, buf);
    buf.put_slice(bytes);
}

/// Encode `message` into a fresh buffer and splice it in as a LEN field.
pub fn put_message_field<B: BufMut, M: TaggedMessage>(buf: &mut B, field_number: u32, message: &M) {
    let mut nested = Vec::new();
    message.encode_tagged(&mut nested);
    put_len_field(buf, field_number, &nested);
}

/// A decoded field payload, borrowing length-delimited bytes from the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(&'a [u8]),
    Fixed32(u32),
}

impl<'a> FieldValue<'a> {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Varint(_) => WireType::Varint,
            FieldValue::Fixed64(_) => WireType::I64,
            FieldValue::LengthDelimited(_) => WireType::Len,
            FieldValue::Fixed32(_) => WireType::I32,
        }
    }

    fn mismatch(&self, field: u32, expected: WireType) -> ProtocolError {
        ProtocolError::WireTypeMismatch {
            field,
            expected: expected as u8,
            actual: self.wire_type() as u8,
        }
    }

    pub fn as_u32(&self, field: u32) -> Result<u32> {
        match *self {
            FieldValue::Varint(v) => {
                u32::try_from(v).map_err(|_| ProtocolError::VarintOverflow(varint::MAX_VARINT32_BYTES))
            }
            _ => Err(self.mismatch(field, WireType::Varint)),
        }
    }

    pub fn as_u64(&self, field: u32) -> Result<u64> {
        match *self {
            FieldValue::Varint(v) => Ok(v),
            _ => Err(self.mismatch(field, WireType::Varint)),
        }
    }

    pub fn as_sint(&self, field: u32) -> Result<i64> {
        self.as_u64(field).map(varint::zigzag_decode::<i64>)
    }

    pub fn as_bool(&self, field: u32) -> Result<bool> {
        self.as_u64(field).map(|v| v != 0)
    }

    pub fn as_f32(&self, field: u32) -> Result<f32> {
        match *self {
            FieldValue::Fixed32(v) => Ok(f32::from_bits(v)),
            _ => Err(self.mismatch(field, WireType::I32)),
        }
    }

    pub fn as_f64(&self, field: u32) -> Result<f64> {
        match *self {
            FieldValue::Fixed64(v) => Ok(f64::from_bits(v)),
            _ => Err(self.mismatch(field, WireType::I64)),
        }
    }

    pub fn as_bytes(&self, field: u32) -> Result<&'a [u8]> {
        match *self {
            FieldValue::LengthDelimited(bytes) => Ok(bytes),
            _ => Err(self.mismatch(field, WireType::Len)),
        }
    }

    pub fn as_message<M: TaggedMessage>(&self, field: u32) -> Result<M> {
        M::decode_tagged(self.as_bytes(field)?)
    }
}

/// Iterates `(field_number, value)` pairs until the buffer is exhausted.
///
/// Yields at most one error, after which iteration stops.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.buf.len() - self.pos;
        if len > available {
            return Err(ProtocolError::UnexpectedEof {
                needed: len,
                available,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn varint<T: varint::Varint>(&mut self) -> Result<T> {
        let (value, consumed) = varint::decode::<T>(&self.buf[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    fn read_field(&mut self) -> Result<(u32, FieldValue<'a>)> {
        let (field_number, wire_type) = parse_tag(self.varint::<u32>()?)?;

        let value = match wire_type {
            WireType::Varint => FieldValue::Varint(self.varint::<u64>()?),
            WireType::I64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(self.take(8)?);
                FieldValue::Fixed64(u64::from_le_bytes(raw))
            }
            WireType::Len => {
                let len = self.varint::<u32>()? as usize;
                FieldValue::LengthDelimited(self.take(len)?)
            }
            WireType::I32 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(self.take(4)?);
                FieldValue::Fixed32(u32::from_le_bytes(raw))
            }
        };

        Ok((field_number, value))
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = Result<(u32, FieldValue<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buf.len() {
            return None;
        }
        let field = self.read_field();
        self.failed = field.is_err();
        Some(field)
    }
}

/// Log a field the schema does not know. Its bytes are already consumed.
pub fn skip_unknown(schema: &'static str, field_number: u32, value: &FieldValue<'_>) {
    trace!(
        schema,
        field_number,
        wire_type = value.wire_type() as u8,
        "skipping unknown field"
    );
}

/// Types with a protobuf-style tagged encoding.
pub trait TaggedMessage: Sized {
    fn encode_tagged(&self, buf: &mut Vec<u8>);

    fn decode_tagged(buf: &[u8]) -> Result<Self>;

    fn to_tagged_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_tagged(&mut buf);
        buf
    }
}
