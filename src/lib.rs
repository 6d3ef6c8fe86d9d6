//! # bitpack-protocol
//!
//! Compact binary serialization for network-sized payloads.
//!
//! ## Layers
//! 1. **Bit stream**: scratch-register packing of 1–32 bit fields
//! 2. **Varint**: LEB128 varints, ZigZag, `bits_required`
//! 3. **Record codec**: one bidirectional procedure per schema over a `Stream`
//! 4. **Tagged codec**: protobuf-style tag/length/value fields
//! 5. **Framing and dispatch**: `[type][len_be16][payload]` packets routed by type
//!
//! The crate works on complete in-memory buffers. Reading bytes off a socket or
//! a capture file is the caller's business; `core::codec::PacketCodec` is there
//! for callers that want `tokio_util` framing on top of their own stream.
//!
//! ## Example
//! ```rust
//! use bitpack_protocol::protocol::dispatcher::decode_message;
//! use bitpack_protocol::protocol::message::{Message, PlayerState};
//!
//! let player = PlayerState {
//!     x: 500,
//!     y: 300,
//!     z: 100,
//!     health: 85,
//!     heading: 270,
//!     team: 2,
//!     alive: true,
//!     name: "Alice".into(),
//! };
//!
//! let bytes = Message::PlayerUpdate(player.clone()).encode()?;
//! let (decoded, _) = decode_message(&bytes)?;
//! assert_eq!(decoded, Message::PlayerUpdate(player));
//! # Ok::<(), bitpack_protocol::error::ProtocolError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::core::bitstream::{BitReader, BitWriter, ReadPolicy};
pub use crate::core::packet::{MessageType, Packet, PacketHeader};
pub use crate::core::serialization::{Serializable, Stream};
pub use crate::core::tagged::TaggedMessage;
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::dispatcher::Dispatcher;
pub use crate::protocol::message::Message;
