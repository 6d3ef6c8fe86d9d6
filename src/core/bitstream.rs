//! # Bit Stream
//!
//! Scratch-register bit packing over a byte buffer.
//!
//! Bits are appended least-significant first into a 64-bit scratch register.
//! Whenever the register holds a whole byte it is drained to the output, so at most
//! 7 bits are ever pending between calls. A 32-bit write on top of 7 pending bits
//! needs 39 bits, which the register always has room for.
//!
//! Raw byte regions (`write_bytes` / `read_bytes`) force byte alignment on both
//! sides: the writer pads the pending byte with zeros, the reader drops the
//! unread bits of the partially consumed byte.
//!
//! ```rust
//! use bitpack_protocol::core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(5, 3).unwrap();
//! writer.write_bool(true).unwrap();
//! writer.flush();
//! assert_eq!(writer.as_bytes(), &[0b1101]);
//!
//! let mut reader = BitReader::new(writer.as_bytes());
//! assert_eq!(reader.read_bits(3).unwrap(), 5);
//! assert!(reader.read_bool().unwrap());
//! ```

use crate::core::varint;
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};

/// Largest bit width accepted by a single read or write.
pub const MAX_BIT_WIDTH: u32 = 32;

#[inline]
fn check_width(bits: u32) -> Result<()> {
    if bits == 0 || bits > MAX_BIT_WIDTH {
        return Err(ProtocolError::InvalidBitWidth(bits));
    }
    Ok(())
}

#[inline]
fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// What `BitReader::read_bytes` does when the buffer runs out mid-copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Fail with `UnexpectedEof` and consume nothing.
    #[default]
    Strict,
    /// Copy what is left, leave the remainder of the output untouched.
    Lenient,
}

/// Packs bit fields into a growable byte buffer.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    buffer: Vec<u8>,
    scratch: u64,
    scratch_bits: u32,
    bits_written: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append the low `bits` bits of `value`.
    #[inline]
    pub fn write_bits(&mut self, value: u32, bits: u32) -> Result<()> {
        check_width(bits)?;

        self.scratch |= (value as u64 & mask(bits)) << self.scratch_bits;
        self.scratch_bits += bits;
        self.bits_written += bits as usize;

        while self.scratch_bits >= 8 {
            self.buffer.push(self.scratch as u8);
            self.scratch >>= 8;
            self.scratch_bits -= 8;
        }
        Ok(())
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_bits(value as u32, 1)
    }

    /// Drain pending bits, zero-padding the last byte. No-op when aligned.
    pub fn flush(&mut self) {
        if self.scratch_bits > 0 {
            self.buffer.push(self.scratch as u8);
        }
        self.scratch = 0;
        self.scratch_bits = 0;
    }

    /// Align to a byte boundary, then append `data` verbatim.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.flush();
        self.buffer.extend_from_slice(data);
        self.bits_written += data.len() * 8;
    }

    /// Byte-aligned varint, as used for string length prefixes.
    pub fn write_varint(&mut self, value: u32) -> usize {
        let mut encoded = [0u8; varint::MAX_VARINT32_BYTES];
        let len = varint::encode_to_slice(value, &mut encoded);
        self.write_bytes(&encoded[..len]);
        len
    }

    /// Total bits written, including raw byte regions but not padding.
    #[inline]
    pub fn bits_written(&self) -> usize {
        self.bits_written
    }

    /// Bits waiting in the scratch register.
    #[inline]
    pub fn pending_bits(&self) -> u32 {
        self.scratch_bits
    }

    /// Bytes in the output buffer. Pending bits are not counted until `flush`.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.scratch_bits == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Flush and hand over the output buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }
}

/// Unpacks bit fields from a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
    scratch: u64,
    scratch_bits: u32,
    bits_read: usize,
    policy: ReadPolicy,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_policy(buf, ReadPolicy::default())
    }

    pub fn with_policy(buf: &'a [u8], policy: ReadPolicy) -> Self {
        Self {
            buf,
            pos: 0,
            scratch: 0,
            scratch_bits: 0,
            bits_read: 0,
            policy,
        }
    }

    /// Bits still available, counting the ones already staged in scratch.
    #[inline]
    pub fn bits_remaining(&self) -> usize {
        (self.buf.len() - self.pos) * 8 + self.scratch_bits as usize
    }

    /// Whole bytes left after the current byte boundary.
    #[inline]
    pub fn bytes_remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn bits_read(&self) -> usize {
        self.bits_read
    }

    #[inline]
    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    #[inline]
    pub fn read_bits(&mut self, bits: u32) -> Result<u32> {
        check_width(bits)?;
        if self.bits_remaining() < bits as usize {
            return Err(ProtocolError::UnexpectedEof {
                needed: bits as usize,
                available: self.bits_remaining(),
            });
        }

        while self.scratch_bits < bits {
            self.scratch |= (self.buf[self.pos] as u64) << self.scratch_bits;
            self.pos += 1;
            self.scratch_bits += 8;
        }

        let value = self.scratch & mask(bits);
        self.scratch >>= bits;
        self.scratch_bits -= bits;
        self.bits_read += bits as usize;

        Ok(value as u32)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Drop any partially consumed byte, then copy raw bytes into `out`.
    ///
    /// Returns the number of bytes copied. Under `ReadPolicy::Lenient` this can be
    /// less than `out.len()`; the consumed-bit count still advances by the full length.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        let available = self.bytes_remaining();
        if self.policy == ReadPolicy::Strict && out.len() > available {
            return Err(ProtocolError::UnexpectedEof {
                needed: out.len(),
                available,
            });
        }

        self.scratch = 0;
        self.scratch_bits = 0;

        let n = out.len().min(available);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        self.bits_read += out.len() * 8;

        Ok(n)
    }

    /// Byte-aligned varint, the counterpart of `BitWriter::write_varint`.
    pub fn read_varint(&mut self) -> Result<u32> {
        self.scratch = 0;
        self.scratch_bits = 0;

        let (value, consumed) = varint::decode::<u32>(&self.buf[self.pos..])?;
        self.pos += consumed;
        self.bits_read += consumed * 8;
        Ok(value)
    }
}
