#![no_main]

use bitpack_protocol::core::varint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((value, consumed)) = varint::decode::<u32>(data) {
        assert!(consumed <= varint::MAX_VARINT32_BYTES);
        // re-encoding a decoded value never takes more bytes than were read
        assert!(varint::encoded_len(value) <= consumed);
    }

    if let Ok((value, consumed)) = varint::decode::<u64>(data) {
        assert!(consumed <= varint::MAX_VARINT64_BYTES);
        assert_eq!(varint::decode::<u64>(&varint::encode_to_vec(value)).ok(), Some((value, varint::encoded_len(value))));
    }
});
