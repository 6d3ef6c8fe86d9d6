//! # Varint Codec
//!
//! LEB128-style unsigned varints, ZigZag signed mapping and range sizing.
//!
//! ## Wire Format
//! ```text
//! bit 7      bits 0-6
//! [more?]    [7 data bits, least-significant group first]
//! ```
//! A `u32` takes 1 to 5 bytes, a `u64` 1 to 10.
//!
//! Small negative numbers go through ZigZag first so `-1` costs one byte
//! instead of the full two's-complement width.

use crate::error::{ProtocolError, Result};
use bytes::BufMut;

/// Longest encoding of a `u32`.
pub const MAX_VARINT32_BYTES: usize = 5;

/// Longest encoding of a `u64`.
pub const MAX_VARINT64_BYTES: usize = 10;

const CONTINUATION: u8 = 0x80;
const DATA_MASK: u8 = 0x7F;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Unsigned integer types with a varint encoding.
pub trait Varint: Copy + sealed::Sealed {
    const MAX_BYTES: usize;
    const BITS: u32;

    fn to_u64(self) -> u64;
    fn from_u64(value: u64) -> Self;
}

impl Varint for u32 {
    const MAX_BYTES: usize = MAX_VARINT32_BYTES;
    const BITS: u32 = u32::BITS;

    #[inline]
    fn to_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value as u32
    }
}

impl Varint for u64 {
    const MAX_BYTES: usize = MAX_VARINT64_BYTES;
    const BITS: u32 = u64::BITS;

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value
    }
}

/// Encode `value` into `buf`, returning the number of bytes written.
pub fn encode<T: Varint, B: BufMut>(value: T, buf: &mut B) -> usize {
    let mut value = value.to_u64();
    let mut written = 0;
    loop {
        let byte = value as u8 & DATA_MASK;
        value >>= 7;
        written += 1;
        if value == 0 {
            buf.put_u8(byte);
            return written;
        }
        buf.put_u8(byte | CONTINUATION);
    }
}

pub fn encode_to_vec<T: Varint>(value: T) -> Vec<u8> {
    let mut out = Vec::with_capacity(T::MAX_BYTES);
    encode(value, &mut out);
    out
}

/// Encode into a caller-provided slice. Panics if `out` is shorter than the encoding.
pub fn encode_to_slice<T: Varint>(value: T, out: &mut [u8]) -> usize {
    let mut cursor = out;
    encode(value, &mut cursor)
}

/// Number of bytes `encode` would produce for `value`.
pub fn encoded_len<T: Varint>(value: T) -> usize {
    let significant = 64 - value.to_u64().leading_zeros() as usize;
    significant.div_ceil(7).max(1)
}

/// Decode a varint from the front of `buf`, returning `(value, bytes_consumed)`.
///
/// Fails with `VarintOverflow` when the encoding runs past `T::MAX_BYTES` or its last
/// byte carries bits the target type cannot hold, and with `UnexpectedEof` when the
/// buffer ends while a continuation flag is still set.
pub fn decode<T: Varint>(buf: &[u8]) -> Result<(T, usize)> {
    let mut result = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in buf.iter().enumerate() {
        let data = (byte & DATA_MASK) as u64;

        if i == T::MAX_BYTES - 1 {
            let room = T::BITS - shift;
            if byte & CONTINUATION != 0 || data >> room != 0 {
                return Err(ProtocolError::VarintOverflow(T::MAX_BYTES));
            }
        }

        result |= data << shift;
        if byte & CONTINUATION == 0 {
            return Ok((T::from_u64(result), i + 1));
        }
        shift += 7;
    }

    Err(ProtocolError::UnexpectedEof {
        needed: 1,
        available: 0,
    })
}

/// Signed integers with a ZigZag mapping onto their unsigned counterpart.
pub trait ZigZag: Copy {
    type Unsigned: Varint;

    fn zigzag_encode(self) -> Self::Unsigned;
    fn zigzag_decode(value: Self::Unsigned) -> Self;
}

macro_rules! impl_zigzag {
    ($signed:ty, $unsigned:ty) => {
        impl ZigZag for $signed {
            type Unsigned = $unsigned;

            #[inline]
            fn zigzag_encode(self) -> $unsigned {
                ((self << 1) ^ (self >> (<$signed>::BITS - 1))) as $unsigned
            }

            #[inline]
            fn zigzag_decode(value: $unsigned) -> $signed {
                ((value >> 1) as $signed) ^ -((value & 1) as $signed)
            }
        }
    };
}

impl_zigzag!(i32, u32);
impl_zigzag!(i64, u64);

#[inline]
pub fn zigzag_encode<T: ZigZag>(value: T) -> T::Unsigned {
    value.zigzag_encode()
}

#[inline]
pub fn zigzag_decode<T: ZigZag>(value: T::Unsigned) -> T {
    T::zigzag_decode(value)
}

pub fn encode_signed<T: ZigZag, B: BufMut>(value: T, buf: &mut B) -> usize {
    encode(value.zigzag_encode(), buf)
}

pub fn decode_signed<T: ZigZag>(buf: &[u8]) -> Result<(T, usize)> {
    let (raw, consumed) = decode::<T::Unsigned>(buf)?;
    Ok((T::zigzag_decode(raw), consumed))
}

/// Minimum number of bits that can represent every integer in `[min, max]`.
///
/// A single-value range still takes one bit. `max < min` is treated as a single value.
pub const fn bits_required(min: u32, max: u32) -> u32 {
    let span = max.saturating_sub(min);
    if span == 0 {
        1
    } else {
        u32::BITS - span.leading_zeros()
    }
}
