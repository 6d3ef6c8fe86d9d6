#![no_main]

use bitpack_protocol::core::tagged::{FieldReader, TaggedMessage};
use bitpack_protocol::protocol::message::GameObject;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for field in FieldReader::new(data) {
        if field.is_err() {
            break;
        }
    }

    if let Ok(object) = GameObject::decode_tagged(data) {
        let again = GameObject::decode_tagged(&object.to_tagged_bytes());
        assert!(again.is_ok_and(|o| o.bit_eq(&object)));
    }
});
