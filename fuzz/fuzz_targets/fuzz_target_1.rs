#![no_main]

use bitpack_protocol::protocol::dispatcher::decode_message_with_policy;
use bitpack_protocol::{Packet, ReadPolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Framing and every payload decoder: no panics, never reads past the packet
    let _ = Packet::from_bytes(data);

    for policy in [ReadPolicy::Strict, ReadPolicy::Lenient] {
        if let Ok((_, consumed)) = decode_message_with_policy(data, policy) {
            assert!(consumed <= data.len());
        }
    }
});
