//! Example: Walking Every Layer of the Codec Stack
//!
//! Prints varint and zigzag tables, the field widths of the player record,
//! then round-trips a bit-packed record, a tagged record and a framed packet
//! with hex dumps of each encoding.
//!
//! Run with: `cargo run --example serialization_demo`
//! Set `BITPACK_LOG_LEVEL=trace` to see the dispatcher's payload dumps.

#![allow(clippy::uninlined_format_args)]

use bitpack_protocol::config::ProtocolConfig;
use bitpack_protocol::core::tagged::TaggedMessage;
use bitpack_protocol::core::varint::{self, bits_required, zigzag_encode};
use bitpack_protocol::protocol::message::{GameObject, Message, PlayerState, Position};
use bitpack_protocol::utils::hex::hex_dump;
use bitpack_protocol::utils::logging::init_logging;
use bitpack_protocol::{Dispatcher, MessageType, Serializable};

fn section(title: &str) {
    println!("--- {} ---", title);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProtocolConfig::from_env()?;
    config.validate_strict()?;
    init_logging(&config.logging)?;

    println!("=== Bit-Packed Serialization Demo ===\n");

    // 1. Varint
    section("Varint Encoding");
    for value in [0u32, 1, 127, 128, 300, 16_384, u32::MAX] {
        let bytes = varint::encode_to_vec(value);
        println!("  {:>10} -> {:02x?} ({} bytes)", value, bytes, bytes.len());
    }
    println!();

    // 2. ZigZag
    section("ZigZag Encoding");
    for value in [0i32, -1, 1, -2, 2, -64, 64] {
        println!("  {:>4} -> {}", value, zigzag_encode(value));
    }
    println!();

    // 3. Field widths
    section("bits_required");
    for (label, (min, max)) in [
        ("coordinate", PlayerState::COORD_RANGE),
        ("health", PlayerState::HEALTH_RANGE),
        ("heading", PlayerState::HEADING_RANGE),
        ("team", PlayerState::TEAM_RANGE),
    ] {
        println!("  {:<10} [{}, {}] = {} bits", label, min, max, bits_required(min, max));
    }
    println!();

    // 4. Bit-packed record
    section("PlayerState Round-trip");
    let player = PlayerState {
        x: 500,
        y: 300,
        z: 100,
        health: 85,
        heading: 270,
        team: 2,
        alive: true,
        name: "Alice".to_string(),
    };
    let bytes = player.encode()?;
    println!("{}", hex_dump(&bytes));
    let decoded = PlayerState::decode(&bytes)?;
    println!("  Original:     {:?}", player);
    println!("  Deserialized: {:?}", decoded);
    println!("  Match: {}\n", if decoded == player { "✓" } else { "✗" });

    // 5. Tagged record
    section("Tagged GameObject Round-trip");
    let object = GameObject {
        id: 42,
        position: Position::new(1.5, 2.5, 3.5),
    };
    let tagged = object.to_tagged_bytes();
    println!("{}", hex_dump(&tagged));
    let decoded = GameObject::decode_tagged(&tagged)?;
    println!("  Original: {:?}", object);
    println!("  Decoded:  {:?}", decoded);
    println!("  Match: {}\n", if decoded.bit_eq(&object) { "✓" } else { "✗" });

    // 6. Framed packet through the dispatcher
    section("RPC Packet Dispatch");
    let packet = Message::PlayerUpdate(player).encode()?;
    println!("{}", hex_dump(&packet));

    let mut dispatcher = Dispatcher::with_config(config.codec.clone());
    dispatcher.register(MessageType::PlayerUpdate, |message| {
        if let Message::PlayerUpdate(state) = message {
            println!(
                "  PLAYER_UPDATE: {} at ({}, {}, {}) hp={} heading={} team={} alive={}",
                state.name, state.x, state.y, state.z, state.health, state.heading, state.team, state.alive
            );
        }
        Ok(Some(Message::Ping))
    });
    dispatcher.register(MessageType::Ping, |_| {
        println!("  PING");
        Ok(None)
    });

    let mut stream = packet;
    stream.extend_from_slice(&Message::Ping.encode()?);
    let replies = dispatcher.dispatch_all(&stream)?;
    println!("  Replies: {:?}", replies);

    dispatcher.metrics().log_metrics();
    Ok(())
}
