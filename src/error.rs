//! # Error Types
//!
//! Error handling for every layer of the serialization stack.
//!
//! This module defines all error variants that can occur while packing bits,
//! decoding varints, walking tagged fields or framing packets.
//!
//! ## Error Categories
//! - **Contract violations**: bit widths outside `1..=32`, oversized strings or payloads,
//!   values outside a field's declared range. Rejected at the call that would violate them.
//! - **Malformed input**: truncated buffers, runaway varints, wire-type mismatches,
//!   unknown message types. Surfaced as decode failures, never panics.
//! - **Configuration**: invalid or unreadable configuration files.
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Example Usage
//! ```rust
//! use bitpack_protocol::core::varint;
//! use bitpack_protocol::error::ProtocolError;
//!
//! // A lone continuation byte never terminates
//! let err = varint::decode::<u32>(&[0x80]).unwrap_err();
//! assert!(matches!(err, ProtocolError::UnexpectedEof { .. }));
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Framing errors
    pub const ERR_OVERSIZED_PACKET: &str = "Payload exceeds the 16-bit length field or configured limit";

    /// Dispatch errors
    pub const ERR_NO_HANDLER: &str = "No handler registered for message type";
}

// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Invalid bit width: {0} (must be between 1 and 32)")]
    InvalidBitWidth(u32),

    #[error("Unexpected end of buffer: needed {needed} more, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("Varint overflow: more than {0} bytes or value wider than target type")]
    VarintOverflow(usize),

    #[error("String too long: {0} bytes (maximum 255)")]
    StringTooLong(usize),

    #[error("Text field is not valid UTF-8")]
    InvalidUtf8,

    #[error("Value {value} outside declared range [{min}, {max}]")]
    ValueOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Unsupported wire type: {0}")]
    UnsupportedWireType(u8),

    #[error("Invalid field number: {0}")]
    InvalidFieldNumber(u32),

    #[error("Field {field} has wire type {actual}, expected {expected}")]
    WireTypeMismatch {
        field: u32,
        expected: u8,
        actual: u8,
    },

    #[error("Invalid packet header")]
    InvalidHeader,

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Truncated payload: header declares {declared} bytes, {available} available")]
    TruncatedPayload { declared: usize, available: usize },

    #[error("Unexpected message type")]
    UnexpectedMessage,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Whether this error describes malformed input rather than a caller mistake.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnexpectedEof { .. }
                | ProtocolError::VarintOverflow(_)
                | ProtocolError::InvalidUtf8
                | ProtocolError::UnsupportedWireType(_)
                | ProtocolError::InvalidFieldNumber(_)
                | ProtocolError::WireTypeMismatch { .. }
                | ProtocolError::InvalidHeader
                | ProtocolError::UnknownMessageType(_)
                | ProtocolError::TruncatedPayload { .. }
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
