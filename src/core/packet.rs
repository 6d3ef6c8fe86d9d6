//! # RPC Packet Framing
//!
//! ## Wire Format
//! ```text
//! [Type(1)] [Length(2, big-endian)] [Payload(Length)]
//! ```
//!
//! The type byte selects how the payload was produced: bit-packed record,
//! two length-prefixed strings, tagged fields, or nothing at all.

use crate::config::HEADER_SIZE;
use crate::error::{constants, ProtocolError, Result};
use bytes::BufMut;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// RPC message kinds, one per payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    /// Bit-packed `PlayerState`
    PlayerUpdate = 1,
    /// Sender and text strings
    ChatMessage = 2,
    /// Tagged-field `GameObject`
    ObjectUpdate = 3,
    /// Liveness check, no payload
    Ping = 4,
}

impl MessageType {
    pub const ALL: [MessageType; 4] = [
        MessageType::PlayerUpdate,
        MessageType::ChatMessage,
        MessageType::ObjectUpdate,
        MessageType::Ping,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MessageType::PlayerUpdate => "PLAYER_UPDATE",
            MessageType::ChatMessage => "CHAT_MESSAGE",
            MessageType::ObjectUpdate => "OBJECT_UPDATE",
            MessageType::Ping => "PING",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(MessageType::PlayerUpdate),
            2 => Ok(MessageType::ChatMessage),
            3 => Ok(MessageType::ObjectUpdate),
            4 => Ok(MessageType::Ping),
            other => Err(ProtocolError::UnknownMessageType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub message_type: MessageType,
    pub payload_len: u16,
}

/// Append a complete packet to `buf`. Nothing is written if the payload is too large.
pub fn write_packet<B: BufMut>(buf: &mut B, message_type: MessageType, payload: &[u8]) -> Result<()> {
    let len = u16::try_from(payload.len()).map_err(|_| {
        warn!(size = payload.len(), "{}", constants::ERR_OVERSIZED_PACKET);
        ProtocolError::OversizedPacket(payload.len())
    })?;

    buf.put_u8(message_type as u8);
    buf.put_u16(len);
    buf.put_slice(payload);

    debug!(kind = message_type.name(), payload_len = len, "packet written");
    Ok(())
}

/// Parse the 3-byte header. Returns the header and the number of bytes consumed.
pub fn read_packet_header(buf: &[u8]) -> Result<(PacketHeader, usize)> {
    if buf.len() < HEADER_SIZE {
        return Err(ProtocolError::InvalidHeader);
    }

    let message_type = MessageType::try_from(buf[0])?;
    let payload_len = u16::from_be_bytes([buf[1], buf[2]]);

    Ok((
        PacketHeader {
            message_type,
            payload_len,
        },
        HEADER_SIZE,
    ))
}

/// An owned packet: a type and its raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(message_type: MessageType, payload: Vec<u8>) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Total encoded size: header plus payload
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        write_packet(&mut out, self.message_type, &self.payload)?;
        Ok(out)
    }

    /// Parse one packet from the front of `buf`. Bytes past the payload are ignored.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (header, offset) = read_packet_header(buf)?;
        let payload = payload_slice(buf, &header, offset)?;
        Ok(Self::new(header.message_type, payload.to_vec()))
    }
}

/// Borrow exactly the payload the header announces.
pub(crate) fn payload_slice<'a>(buf: &'a [u8], header: &PacketHeader, offset: usize) -> Result<&'a [u8]> {
    let declared = header.payload_len as usize;
    let available = buf.len().saturating_sub(offset);
    if declared > available {
        return Err(ProtocolError::TruncatedPayload {
            declared,
            available,
        });
    }
    Ok(&buf[offset..offset + declared])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::MAX_PAYLOAD_SIZE;

    #[test]
    fn test_write_packet_layout() {
        let mut buf = Vec::new();
        write_packet(&mut buf, MessageType::ChatMessage, &[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(buf, vec![0x02, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_length_is_big_endian() {
        let mut buf = Vec::new();
        write_packet(&mut buf, MessageType::PlayerUpdate, &[0u8; 300]).unwrap();
        assert_eq!(&buf[..3], &[0x01, 0x01, 0x2C]);
        assert_eq!(buf.len(), 303);
    }

    #[test]
    fn test_ping_has_empty_payload() {
        let mut buf = Vec::new();
        write_packet(&mut buf, MessageType::Ping, &[]).unwrap();
        assert_eq!(buf, vec![0x04, 0x00, 0x00]);
    }

    #[test]
    fn test_max_payload_accepted_oversize_rejected() {
        let mut buf = Vec::new();
        write_packet(&mut buf, MessageType::ChatMessage, &vec![0u8; MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(&buf[1..3], &[0xFF, 0xFF]);

        let mut buf = Vec::new();
        let err = write_packet(&mut buf, MessageType::ChatMessage, &vec![0u8; MAX_PAYLOAD_SIZE + 1])
            .unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedPacket(65536)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_header() {
        let (header, consumed) = read_packet_header(&[0x03, 0x01, 0x2C, 0xFF]).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(header.message_type, MessageType::ObjectUpdate);
        assert_eq!(header.payload_len, 300);
    }

    #[test]
    fn test_read_header_errors() {
        assert!(matches!(
            read_packet_header(&[0x01, 0x00]),
            Err(ProtocolError::InvalidHeader)
        ));
        assert!(matches!(
            read_packet_header(&[0x09, 0x00, 0x00]),
            Err(ProtocolError::UnknownMessageType(9))
        ));
    }

    #[test]
    fn test_packet_from_bytes_truncated() {
        let err = Packet::from_bytes(&[0x02, 0x00, 0x05, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::TruncatedPayload {
                declared: 5,
                available: 1
            }
        ));
    }

    #[test]
    fn test_packet_ignores_trailing_bytes() {
        let packet = Packet::from_bytes(&[0x02, 0x00, 0x01, 0x7A, 0x04, 0x00, 0x00]).unwrap();
        assert_eq!(packet, Packet::new(MessageType::ChatMessage, vec![0x7A]));
        assert_eq!(packet.encoded_len(), 4);
    }
}
