//! # Core Codec Layers
//!
//! Bit packing, varints, tagged fields and packet framing.
//!
//! Each layer only depends on the ones listed before it:
//! - **varint**: varint, ZigZag and `bits_required`
//! - **bitstream**: scratch-register bit writer/reader
//! - **serialization**: the `Stream` trait shared by writer and reader
//! - **tagged**: protobuf-style tag/length/value fields
//! - **packet**: the 3-byte RPC header
//! - **codec**: tokio-util framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Type(1)] [Length(2, big-endian)] [Payload(N)]
//! ```

pub mod bitstream;
pub mod codec;
pub mod packet;
pub mod serialization;
pub mod tagged;
pub mod varint;
