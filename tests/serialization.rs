//! Integration tests for the record and tagged codecs
//!
//! Exercises the bidirectional `Serializable` procedures and the tagged wire
//! format through the public API only, pinning the exact bytes where the layout
//! is fixed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::uninlined_format_args
)]

use bitpack_protocol::core::serialization::{serialize_ranged, serialize_string};
use bitpack_protocol::core::tagged::{
    make_tag, put_len_field, put_sint_field, put_varint_field, FieldReader, FieldValue,
    TaggedMessage, WireType,
};
use bitpack_protocol::protocol::message::{ChatMessage, GameObject, Position, PlayerState};
use bitpack_protocol::{BitReader, BitWriter, ProtocolError, Serializable};

fn alice() -> PlayerState {
    PlayerState {
        x: 500,
        y: 300,
        z: 100,
        health: 85,
        heading: 270,
        team: 2,
        alive: true,
        name: String::new(),
    }
}

// ============================================================================
// BIT-PACKED RECORDS
// ============================================================================

#[test]
fn test_player_state_exact_bytes() {
    let bytes = alice().encode().expect("Failed to encode");

    // 10+10+10+7+9+2+1 = 49 bits, LSB first, then the empty name's length byte
    assert_eq!(bytes, vec![0xF4, 0xB1, 0x44, 0x46, 0xD5, 0xA1, 0x01, 0x00]);
}

#[test]
fn test_player_state_with_name_roundtrip() {
    let mut player = alice();
    player.name = "Player_One".to_string();

    let bytes = player.encode().expect("Failed to encode");
    assert_eq!(bytes.len(), 8 + player.name.len());
    assert_eq!(&bytes[8..], player.name.as_bytes());

    let decoded = PlayerState::decode(&bytes).expect("Failed to decode");
    assert_eq!(decoded, player);
}

#[test]
fn test_player_state_multibyte_name() {
    let mut player = alice();
    player.name = "Ünïcødé 🎮".to_string();

    let bytes = player.encode().expect("Failed to encode");
    let decoded = PlayerState::decode(&bytes).expect("Failed to decode");
    assert_eq!(decoded.name, player.name);
}

#[test]
fn test_player_state_rejects_each_out_of_range_field() {
    let cases: [fn(&mut PlayerState); 6] = [
        |p: &mut PlayerState| p.x = 1024,
        |p: &mut PlayerState| p.y = 2000,
        |p: &mut PlayerState| p.z = u16::MAX,
        |p: &mut PlayerState| p.health = 101,
        |p: &mut PlayerState| p.heading = 360,
        |p: &mut PlayerState| p.team = 4,
    ];

    for mutate in cases {
        let mut player = alice();
        mutate(&mut player);
        let err = player.encode().expect_err("Out-of-range field should be rejected");
        assert!(
            matches!(err, ProtocolError::ValueOutOfRange { .. }),
            "Unexpected error: {:?}",
            err
        );
    }
}

#[test]
fn test_player_state_rejects_long_name() {
    let mut player = alice();
    player.name = "n".repeat(256);

    let err = player.encode().expect_err("256-byte name should be rejected");
    assert!(matches!(err, ProtocolError::StringTooLong(256)));
}

#[test]
fn test_player_state_decode_rejects_out_of_range_input() {
    // heading occupies bits 37..46; all ones decodes to 511 > 359
    let mut bytes = alice().encode().expect("Failed to encode");
    bytes[4] |= 0xE0;
    bytes[5] |= 0x3F;

    let err = PlayerState::decode(&bytes).expect_err("Heading 511 should be rejected");
    assert!(matches!(err, ProtocolError::ValueOutOfRange { max: 359, .. }));
}

#[test]
fn test_chat_message_layout() {
    let chat = ChatMessage {
        sender: "bob".to_string(),
        text: "hi".to_string(),
    };

    let bytes = chat.encode().expect("Failed to encode");
    assert_eq!(bytes, vec![3, b'b', b'o', b'b', 2, b'h', b'i']);
    assert_eq!(ChatMessage::decode(&bytes).expect("Failed to decode"), chat);
}

#[test]
fn test_chat_message_empty_strings() {
    let chat = ChatMessage::default();
    let bytes = chat.encode().expect("Failed to encode");
    assert_eq!(bytes, vec![0, 0]);
    assert_eq!(ChatMessage::decode(&bytes).expect("Failed to decode"), chat);
}

#[test]
fn test_chat_message_rejects_invalid_utf8() {
    let bytes = [1, b'a', 2, 0xC3, 0x28];
    let err = ChatMessage::decode(&bytes).expect_err("Invalid UTF-8 should be rejected");
    assert!(matches!(err, ProtocolError::InvalidUtf8));
}

#[test]
fn test_string_after_odd_bit_offset_is_aligned() {
    let mut writer = BitWriter::new();
    writer.write_bits(0b101, 3).unwrap();
    let mut name = "abc".to_string();
    serialize_string(&mut writer, &mut name).unwrap();
    let bytes = writer.into_bytes();

    // 3 bits padded to one byte, then length 3 and the raw text
    assert_eq!(bytes, vec![0b101, 3, b'a', b'b', b'c']);

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_bits(3).unwrap(), 0b101);
    let mut out = String::new();
    serialize_string(&mut reader, &mut out).unwrap();
    assert_eq!(out, "abc");
}

#[test]
fn test_ranged_field_width_follows_range() {
    let mut writer = BitWriter::new();
    let mut value = 359u16;
    serialize_ranged(&mut writer, &mut value, 0, 359).unwrap();
    assert_eq!(writer.bits_written(), 9);

    let mut flag = 1u8;
    serialize_ranged(&mut writer, &mut flag, 0, 1).unwrap();
    assert_eq!(writer.bits_written(), 10);
}

#[test]
fn test_game_object_bitpacked_is_sixteen_bytes() {
    let object = GameObject {
        id: 7,
        position: Position::new(1.0, 2.0, 3.0),
    };
    let bytes = object.encode().expect("Failed to encode");

    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[..4], &7u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &1.0f32.to_bits().to_le_bytes());

    let decoded = GameObject::decode(&bytes).expect("Failed to decode");
    assert!(decoded.bit_eq(&object));
}

// ============================================================================
// TAGGED WIRE FORMAT
// ============================================================================

#[test]
fn test_game_object_tagged_exact_bytes() {
    let object = GameObject {
        id: 1,
        position: Position::new(0.0, 0.0, 0.0),
    };
    let bytes = object.to_tagged_bytes();

    let mut expected = vec![0x08, 0x01, 0x12, 0x0F];
    for field in 1..=3u8 {
        expected.push((field << 3) | 5);
        expected.extend_from_slice(&[0, 0, 0, 0]);
    }
    assert_eq!(bytes, expected);
}

#[test]
fn test_game_object_tagged_float_bits_preserved() {
    let object = GameObject {
        id: 300,
        position: Position::new(-0.0, f32::INFINITY, f32::MIN_POSITIVE),
    };
    let decoded = GameObject::decode_tagged(&object.to_tagged_bytes()).expect("Failed to decode");
    assert!(decoded.bit_eq(&object));
}

#[test]
fn test_tagged_decode_skips_unknown_fields() {
    let object = GameObject {
        id: 9,
        position: Position::new(4.0, 5.0, 6.0),
    };
    let mut bytes = Vec::new();
    put_varint_field(&mut bytes, 15, 123_456);
    object.encode_tagged(&mut bytes);
    put_len_field(&mut bytes, 7, b"future field");
    put_sint_field(&mut bytes, 8, -42);

    let decoded = GameObject::decode_tagged(&bytes).expect("Unknown fields should be skipped");
    assert!(decoded.bit_eq(&object));
}

#[test]
fn test_tagged_decode_rejects_wrong_wire_type() {
    // field 1 (id) sent as LEN instead of VARINT
    let mut bytes = Vec::new();
    put_len_field(&mut bytes, 1, &[1, 2, 3]);

    let err = GameObject::decode_tagged(&bytes).expect_err("Wire type mismatch should fail");
    assert!(matches!(
        err,
        ProtocolError::WireTypeMismatch {
            field: 1,
            expected: 0,
            actual: 2
        }
    ));
}

#[test]
fn test_tagged_decode_missing_fields_default() {
    let decoded = GameObject::decode_tagged(&[]).expect("Empty message is valid");
    assert!(decoded.bit_eq(&GameObject::default()));
}

#[test]
fn test_tagged_nested_length_past_end() {
    let bytes = [0x08, 0x01, 0x12, 0x10, 0x0D, 0x00];
    let err = GameObject::decode_tagged(&bytes).expect_err("Nested length past end should fail");
    assert!(matches!(err, ProtocolError::UnexpectedEof { .. }));
}

#[test]
fn test_field_reader_walks_every_wire_type() {
    let mut bytes = Vec::new();
    put_varint_field(&mut bytes, 1, 150);
    bitpack_protocol::core::tagged::put_fixed64_field(&mut bytes, 2, u64::MAX);
    put_len_field(&mut bytes, 3, b"abc");
    bitpack_protocol::core::tagged::put_float_field(&mut bytes, 4, 2.5);

    let fields: Vec<_> = FieldReader::new(&bytes)
        .collect::<Result<_, _>>()
        .expect("All fields should parse");

    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0], (1, FieldValue::Varint(150)));
    assert_eq!(fields[1], (2, FieldValue::Fixed64(u64::MAX)));
    assert_eq!(fields[2], (3, FieldValue::LengthDelimited(b"abc")));
    assert_eq!(fields[3].1.as_f32(4).unwrap(), 2.5);
    assert_eq!(fields[3].1.wire_type(), WireType::I32);
}

#[test]
fn test_make_tag_matches_protobuf() {
    assert_eq!(make_tag(1, WireType::Varint), 0x08);
    assert_eq!(make_tag(2, WireType::Len), 0x12);
    assert_eq!(make_tag(1, WireType::I32), 0x0D);
    assert_eq!(make_tag(16, WireType::I64), 0x81);
}

#[test]
fn test_tagged_decode_rejects_field_zero() {
    let err = GameObject::decode_tagged(&[0x00, 0x01]).expect_err("Field 0 should be rejected");
    assert!(matches!(err, ProtocolError::InvalidFieldNumber(0)));
    assert!(err.is_decode_error());
}
