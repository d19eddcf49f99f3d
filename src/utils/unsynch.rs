// Unsynchronisation scheme
//
// Writers insert a 0x00 after 0xFF so the tag never contains a false MPEG
// sync pattern. Readers collapse every 0xFF 0x00 pair back into 0xFF.

/// Collapse every `0xFF 0x00` pair into a single `0xFF`
///
/// The first byte is always kept. A `0x00` dropped as part of one pair is
/// never looked at again, so `FF 00 00` becomes `FF 00`.
pub fn remove_unsynchronisation(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let Some((&first, rest)) = data.split_first() else {
        return out;
    };

    out.push(first);
    let mut prev = first;
    for &byte in rest {
        if !(prev == 0xFF && byte == 0x00) {
            out.push(byte);
        }
        prev = byte;
    }

    out
}

/// Insert a `0x00` after every `0xFF`
pub fn add_unsynchronisation(data: &[u8]) -> Vec<u8> {
    let extra = data.iter().filter(|&&b| b == 0xFF).count();
    let mut out = Vec::with_capacity(data.len() + extra);
    for &byte in data {
        out.push(byte);
        if byte == 0xFF {
            out.push(0x00);
        }
    }
    out
}
