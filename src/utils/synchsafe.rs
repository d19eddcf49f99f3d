// Synchsafe and raw big-endian size fields

/// Largest value a synchsafe integer can carry (28 bits)
pub const MAX_SYNCHSAFE: u32 = (1 << 28) - 1;

/// Encode a 28-bit size into 4 synchsafe bytes (7 bits per byte, MSB first)
///
/// Bits above the 28th are dropped; callers must keep `total <= MAX_SYNCHSAFE`.
pub fn encode_size(total: u32) -> [u8; 4] {
    [
        ((total >> 21) & 0x7F) as u8,
        ((total >> 14) & 0x7F) as u8,
        ((total >> 7) & 0x7F) as u8,
        (total & 0x7F) as u8,
    ]
}

/// Decode 4 synchsafe bytes into a size
pub fn decode_size(bytes: [u8; 4]) -> u32 {
    ((bytes[0] as u32) << 21)
        | ((bytes[1] as u32) << 14)
        | ((bytes[2] as u32) << 7)
        | (bytes[3] as u32)
}

/// Read an unsigned big-endian integer of up to 4 bytes
pub fn read_be_uint(bytes: &[u8]) -> u32 {
    debug_assert!(bytes.len() <= 4);
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}
