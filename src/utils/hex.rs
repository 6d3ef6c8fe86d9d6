//! Hex dump formatting for trace logs and demos.

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Lowercase hex pairs, 16 per line, followed by the byte count.
///
/// ```rust
/// use bitpack_protocol::utils::hex::hex_dump;
///
/// assert_eq!(hex_dump(&[0x08, 0x01, 0x12]), "08 01 12\n(3 bytes)");
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3 + 16);
    for (i, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, byte) in chunk.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{byte:02x}");
        }
    }
    if !data.is_empty() {
        out.push('\n');
    }
    let _ = write!(out, "({} bytes)", data.len());
    out
}
