//! # Packet Codec
//!
//! `tokio_util::codec` framing for the 3-byte packet header, so a byte stream
//! can be cut into packets by `FramedRead` / `FramedWrite` without this crate
//! knowing where the bytes come from.
//!
//! Incomplete frames leave the buffer untouched and return `Ok(None)`.

use crate::config::{HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::core::packet::{read_packet_header, write_packet, Packet};
use crate::error::{constants, ProtocolError, Result};
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct PacketCodec {
    max_payload_size: usize,
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl PacketCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject frames whose payload exceeds `max_payload_size` (capped at 65535).
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self {
            max_payload_size: max_payload_size.min(MAX_PAYLOAD_SIZE),
        }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let (header, _) = read_packet_header(&src[..HEADER_SIZE])?;
        let payload_len = header.payload_len as usize;
        if payload_len > self.max_payload_size {
            warn!(payload_len, limit = self.max_payload_size, "{}", constants::ERR_OVERSIZED_PACKET);
            return Err(ProtocolError::OversizedPacket(payload_len));
        }

        let frame_len = HEADER_SIZE + payload_len;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(frame_len);
        let payload = frame.split_off(HEADER_SIZE);
        Ok(Some(Packet::new(header.message_type, payload.to_vec())))
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > self.max_payload_size {
            return Err(ProtocolError::OversizedPacket(item.payload.len()));
        }
        dst.reserve(item.encoded_len());
        write_packet(dst, item.message_type, &item.payload)
    }
}
