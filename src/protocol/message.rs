//! # Message Schemas
//!
//! The records carried by the four RPC message types, and the [`Message`]
//! enum tying each record to its payload encoding.
//!
//! | Type | Record | Payload encoding |
//! |------|--------|------------------|
//! | 1 | [`PlayerState`] | bit-packed |
//! | 2 | [`ChatMessage`] | two length-prefixed strings |
//! | 3 | [`GameObject`] | tagged fields |
//! | 4 | none | empty |

use crate::core::bitstream::{BitReader, ReadPolicy};
use crate::core::packet::{write_packet, MessageType, Packet};
use crate::core::serialization::{serialize_f32, serialize_ranged, serialize_string, Serializable, Stream};
use crate::core::tagged::{self, put_float_field, put_message_field, put_varint_field, FieldReader, TaggedMessage};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Player snapshot, bit-packed to the declared range of each field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub health: u8,
    pub heading: u16,
    pub team: u8,
    pub alive: bool,
    pub name: String,
}

impl PlayerState {
    pub const COORD_RANGE: (u32, u32) = (0, 1023);
    pub const HEALTH_RANGE: (u32, u32) = (0, 100);
    pub const HEADING_RANGE: (u32, u32) = (0, 359);
    pub const TEAM_RANGE: (u32, u32) = (0, 3);
}

impl Serializable for PlayerState {
    fn serialize<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        let (lo, hi) = Self::COORD_RANGE;
        serialize_ranged(stream, &mut self.x, lo, hi)?;
        serialize_ranged(stream, &mut self.y, lo, hi)?;
        serialize_ranged(stream, &mut self.z, lo, hi)?;

        let (lo, hi) = Self::HEALTH_RANGE;
        serialize_ranged(stream, &mut self.health, lo, hi)?;
        let (lo, hi) = Self::HEADING_RANGE;
        serialize_ranged(stream, &mut self.heading, lo, hi)?;
        let (lo, hi) = Self::TEAM_RANGE;
        serialize_ranged(stream, &mut self.team, lo, hi)?;

        stream.serialize_bool(&mut self.alive)?;

        // text last: it byte-aligns the stream
        serialize_string(stream, &mut self.name)?;
        stream.flush();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
}

impl Serializable for ChatMessage {
    fn serialize<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        serialize_string(stream, &mut self.sender)?;
        serialize_string(stream, &mut self.text)?;
        stream.flush();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Field-wise comparison of the raw bit patterns, so `NaN` and `-0.0` compare exactly.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

impl Serializable for Position {
    fn serialize<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        serialize_f32(stream, &mut self.x)?;
        serialize_f32(stream, &mut self.y)?;
        serialize_f32(stream, &mut self.z)
    }
}

impl TaggedMessage for Position {
    fn encode_tagged(&self, buf: &mut Vec<u8>) {
        put_float_field(buf, 1, self.x);
        put_float_field(buf, 2, self.y);
        put_float_field(buf, 3, self.z);
    }

    fn decode_tagged(buf: &[u8]) -> Result<Self> {
        let mut position = Self::default();
        for field in FieldReader::new(buf) {
            let (number, value) = field?;
            match number {
                1 => position.x = value.as_f32(number)?,
                2 => position.y = value.as_f32(number)?,
                3 => position.z = value.as_f32(number)?,
                _ => tagged::skip_unknown("Position", number, &value),
            }
        }
        Ok(position)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: u32,
    pub position: Position,
}

impl GameObject {
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.id == other.id && self.position.bit_eq(&other.position)
    }
}

impl Serializable for GameObject {
    fn serialize<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        stream.serialize_bits(&mut self.id, 32)?;
        // Position also derives serde::Serialize, which wins method lookup
        Serializable::serialize(&mut self.position, stream)?;
        stream.flush();
        Ok(())
    }
}

impl TaggedMessage for GameObject {
    fn encode_tagged(&self, buf: &mut Vec<u8>) {
        put_varint_field(buf, 1, self.id as u64);
        put_message_field(buf, 2, &self.position);
    }

    fn decode_tagged(buf: &[u8]) -> Result<Self> {
        let mut object = Self::default();
        for field in FieldReader::new(buf) {
            let (number, value) = field?;
            match number {
                1 => object.id = value.as_u32(number)?,
                2 => object.position = value.as_message(number)?,
                _ => tagged::skip_unknown("GameObject", number, &value),
            }
        }
        Ok(object)
    }
}

/// A decoded RPC message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    PlayerUpdate(PlayerState),
    Chat(ChatMessage),
    ObjectUpdate(GameObject),
    Ping,
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::PlayerUpdate(_) => MessageType::PlayerUpdate,
            Message::Chat(_) => MessageType::ChatMessage,
            Message::ObjectUpdate(_) => MessageType::ObjectUpdate,
            Message::Ping => MessageType::Ping,
        }
    }

    /// Encode the payload alone, without the packet header.
    pub fn payload(&self) -> Result<Vec<u8>> {
        match self {
            Message::PlayerUpdate(player) => player.encode(),
            Message::Chat(chat) => chat.encode(),
            Message::ObjectUpdate(object) => Ok(object.to_tagged_bytes()),
            Message::Ping => Ok(Vec::new()),
        }
    }

    pub fn to_packet(&self) -> Result<Packet> {
        Ok(Packet::new(self.message_type(), self.payload()?))
    }

    /// Encode a complete packet: header plus payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = self.payload()?;
        let mut out = Vec::with_capacity(crate::config::HEADER_SIZE + payload.len());
        write_packet(&mut out, self.message_type(), &payload)?;
        Ok(out)
    }

    /// Decode a payload whose type came from a packet header.
    pub fn decode_payload(message_type: MessageType, payload: &[u8], policy: ReadPolicy) -> Result<Self> {
        match message_type {
            MessageType::PlayerUpdate => {
                let mut reader = BitReader::with_policy(payload, policy);
                Ok(Message::PlayerUpdate(PlayerState::decode_from(&mut reader)?))
            }
            MessageType::ChatMessage => {
                let mut reader = BitReader::with_policy(payload, policy);
                Ok(Message::Chat(ChatMessage::decode_from(&mut reader)?))
            }
            MessageType::ObjectUpdate => Ok(Message::ObjectUpdate(GameObject::decode_tagged(payload)?)),
            MessageType::Ping => Ok(Message::Ping),
        }
    }

    pub fn from_packet(packet: &Packet, policy: ReadPolicy) -> Result<Self> {
        Self::decode_payload(packet.message_type, &packet.payload, policy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_player(name: &str) -> PlayerState {
        PlayerState {
            x: 500,
            y: 300,
            z: 100,
            health: 85,
            heading: 270,
            team: 2,
            alive: true,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_player_state_is_eight_bytes_with_empty_name() {
        let bytes = sample_player("").encode().unwrap();
        // 49 packed bits -> 7 bytes, plus the zero length prefix
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[7], 0x00);
    }

    #[test]
    fn test_player_state_roundtrip() {
        let player = sample_player("Alice");
        let bytes = player.encode().unwrap();
        assert_eq!(bytes.len(), 8 + 5);
        assert_eq!(PlayerState::decode(&bytes).unwrap(), player);
    }

    #[test]
    fn test_player_state_extremes() {
        let max = PlayerState {
            x: 1023,
            y: 1023,
            z: 1023,
            health: 100,
            heading: 359,
            team: 3,
            alive: true,
            name: "z".repeat(255),
        };
        assert_eq!(PlayerState::decode(&max.encode().unwrap()).unwrap(), max);

        let zero = PlayerState::default();
        assert_eq!(PlayerState::decode(&zero.encode().unwrap()).unwrap(), zero);
    }

    #[test]
    fn test_player_state_rejects_out_of_range_heading() {
        let mut player = sample_player("");
        player.heading = 360;
        assert!(player.encode().is_err());
    }

    #[test]
    fn test_game_object_tagged_prefix() {
        let object = GameObject {
            id: 1,
            position: Position::default(),
        };
        let bytes = object.to_tagged_bytes();
        assert_eq!(&bytes[..4], &[0x08, 0x01, 0x12, 15]);
        assert_eq!(bytes.len(), 4 + 15);
    }

    #[test]
    fn test_game_object_tagged_roundtrip() {
        let object = GameObject {
            id: 42,
            position: Position::new(1.5, -2.5, f32::NAN),
        };
        let decoded = GameObject::decode_tagged(&object.to_tagged_bytes()).unwrap();
        assert!(decoded.bit_eq(&object));
    }

    #[test]
    fn test_game_object_bitpacked_roundtrip() {
        let object = GameObject {
            id: u32::MAX,
            position: Position::new(-0.0, f32::MAX, -1e-30),
        };
        let bytes = object.encode().unwrap();
        assert_eq!(bytes.len(), 16);
        assert!(GameObject::decode(&bytes).unwrap().bit_eq(&object));
    }

    #[test]
    fn test_message_types() {
        assert_eq!(Message::Ping.message_type(), MessageType::Ping);
        assert_eq!(
            Message::Chat(ChatMessage::default()).message_type(),
            MessageType::ChatMessage
        );
        assert_eq!(Message::Ping.encode().unwrap(), vec![0x04, 0x00, 0x00]);
    }
}
