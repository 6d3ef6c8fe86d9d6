//! # Unified Serialization
//!
//! One procedure per schema, run in either direction.
//!
//! A schema implements [`Serializable::serialize`] once, generic over a [`Stream`].
//! `BitWriter` implements the writing role and `BitReader` the reading role, so
//! field order and field widths cannot drift apart between encode and decode.
//!
//! ## Usage
//! ```rust
//! use bitpack_protocol::core::serialization::{serialize_ranged, Serializable, Stream};
//! use bitpack_protocol::error::Result;
//!
//! #[derive(Clone, Default, Debug, PartialEq)]
//! struct Cell {
//!     row: u8,
//!     col: u8,
//! }
//!
//! impl Serializable for Cell {
//!     fn serialize<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
//!         serialize_ranged(stream, &mut self.row, 0, 7)?;
//!         serialize_ranged(stream, &mut self.col, 0, 7)?;
//!         stream.flush();
//!         Ok(())
//!     }
//! }
//!
//! let bytes = Cell { row: 3, col: 5 }.encode().unwrap();
//! assert_eq!(bytes.len(), 1);
//! assert_eq!(Cell::decode(&bytes).unwrap(), Cell { row: 3, col: 5 });
//! ```

use crate::config::MAX_STRING_LEN;
use crate::core::bitstream::{BitReader, BitWriter};
use crate::core::varint::bits_required;
use crate::error::{ProtocolError, Result};

/// A bit stream playing either the writing or the reading role.
///
/// Every method takes the value by `&mut`: the writer reads from it, the reader stores into it.
pub trait Stream {
    const IS_WRITING: bool;

    fn serialize_bits(&mut self, value: &mut u32, bits: u32) -> Result<()>;

    fn serialize_bool(&mut self, value: &mut bool) -> Result<()>;

    /// Byte-aligned varint.
    fn serialize_varint(&mut self, value: &mut u32) -> Result<()>;

    /// Byte-aligned raw region of exactly `len` bytes. The writer ignores `len` and writes `bytes`.
    fn serialize_raw(&mut self, bytes: &mut Vec<u8>, len: usize) -> Result<()>;

    /// Byte-aligned text of exactly `len` bytes. The writer borrows `value` as is;
    /// the reader requires UTF-8.
    fn serialize_str(&mut self, value: &mut String, len: usize) -> Result<()>;

    /// Pad out the final byte. The reading role has nothing to do.
    fn flush(&mut self);
}

impl Stream for BitWriter {
    const IS_WRITING: bool = true;

    #[inline]
    fn serialize_bits(&mut self, value: &mut u32, bits: u32) -> Result<()> {
        self.write_bits(*value, bits)
    }

    #[inline]
    fn serialize_bool(&mut self, value: &mut bool) -> Result<()> {
        self.write_bool(*value)
    }

    fn serialize_varint(&mut self, value: &mut u32) -> Result<()> {
        self.write_varint(*value);
        Ok(())
    }

    fn serialize_raw(&mut self, bytes: &mut Vec<u8>, _len: usize) -> Result<()> {
        self.write_bytes(bytes);
        Ok(())
    }

    fn serialize_str(&mut self, value: &mut String, _len: usize) -> Result<()> {
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    fn flush(&mut self) {
        BitWriter::flush(self);
    }
}

impl Stream for BitReader<'_> {
    const IS_WRITING: bool = false;

    #[inline]
    fn serialize_bits(&mut self, value: &mut u32, bits: u32) -> Result<()> {
        *value = self.read_bits(bits)?;
        Ok(())
    }

    #[inline]
    fn serialize_bool(&mut self, value: &mut bool) -> Result<()> {
        *value = self.read_bool()?;
        Ok(())
    }

    fn serialize_varint(&mut self, value: &mut u32) -> Result<()> {
        *value = self.read_varint()?;
        Ok(())
    }

    fn serialize_raw(&mut self, bytes: &mut Vec<u8>, len: usize) -> Result<()> {
        bytes.clear();
        bytes.resize(len, 0);
        self.read_bytes(bytes)?;
        Ok(())
    }

    fn serialize_str(&mut self, value: &mut String, len: usize) -> Result<()> {
        let mut bytes = Vec::new();
        self.serialize_raw(&mut bytes, len)?;
        *value = String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)?;
        Ok(())
    }

    fn flush(&mut self) {}
}

/// Serialize an integer field declared to hold values in `[min, max]`.
///
/// The field takes `bits_required(min, max)` bits and stores `value - min`.
pub fn serialize_ranged<S, T>(stream: &mut S, value: &mut T, min: u32, max: u32) -> Result<()>
where
    S: Stream,
    T: Copy + Into<u32> + TryFrom<u32>,
{
    let bits = bits_required(min, max);

    if S::IS_WRITING {
        let raw: u32 = (*value).into();
        if raw < min || raw > max {
            return Err(ProtocolError::ValueOutOfRange {
                value: raw,
                min,
                max,
            });
        }
        let mut offset = raw - min;
        stream.serialize_bits(&mut offset, bits)
    } else {
        let mut offset = 0u32;
        stream.serialize_bits(&mut offset, bits)?;
        let raw = offset
            .checked_add(min)
            .filter(|raw| *raw <= max)
            .ok_or(ProtocolError::ValueOutOfRange {
                value: offset.saturating_add(min),
                min,
                max,
            })?;
        *value = T::try_from(raw).map_err(|_| ProtocolError::ValueOutOfRange {
            value: raw,
            min,
            max,
        })?;
        Ok(())
    }
}

/// Serialize a varint-length-prefixed UTF-8 string of at most 255 bytes.
///
/// The writer checks the length before touching the stream, so a rejected
/// string leaves nothing behind.
pub fn serialize_string<S: Stream>(stream: &mut S, value: &mut String) -> Result<()> {
    if S::IS_WRITING {
        if value.len() > MAX_STRING_LEN {
            return Err(ProtocolError::StringTooLong(value.len()));
        }
        let mut len = value.len() as u32;
        stream.serialize_varint(&mut len)?;
        stream.serialize_str(value, len as usize)
    } else {
        let mut len = 0u32;
        stream.serialize_varint(&mut len)?;
        if len as usize > MAX_STRING_LEN {
            return Err(ProtocolError::StringTooLong(len as usize));
        }
        stream.serialize_str(value, len as usize)
    }
}

/// Serialize an `f32` as its raw 32-bit IEEE-754 pattern.
pub fn serialize_f32<S: Stream>(stream: &mut S, value: &mut f32) -> Result<()> {
    let mut bits = value.to_bits();
    stream.serialize_bits(&mut bits, 32)?;
    *value = f32::from_bits(bits);
    Ok(())
}

/// Types with a bit-packed layout described by a single bidirectional procedure.
pub trait Serializable {
    fn serialize<S: Stream>(&mut self, stream: &mut S) -> Result<()>;

    /// Run the writing role on a copy and return the flushed bytes.
    fn encode(&self) -> Result<Vec<u8>>
    where
        Self: Clone,
    {
        let mut writer = BitWriter::new();
        self.clone().serialize(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Run the reading role into a default value.
    fn decode(buf: &[u8]) -> Result<Self>
    where
        Self: Default,
    {
        Self::decode_from(&mut BitReader::new(buf))
    }

    fn decode_from(reader: &mut BitReader<'_>) -> Result<Self>
    where
        Self: Default,
    {
        let mut value = Self::default();
        value.serialize(reader)?;
        Ok(value)
    }
}
