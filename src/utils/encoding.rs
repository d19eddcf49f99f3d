// Text encodings used by ID3v2 text payloads

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text encoding types, in the order of their ID3v2 encoding byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "ISO-8859-1")]
    Latin1 = 0,
    #[serde(rename = "UTF-16")]
    Utf16 = 1,
    #[serde(rename = "UTF-16BE")]
    Utf16BE = 2,
    #[serde(rename = "UTF-8")]
    Utf8 = 3,
}

impl TextEncoding {
    /// Ordered by encoding byte
    pub const ALL: [TextEncoding; 4] = [
        TextEncoding::Latin1,
        TextEncoding::Utf16,
        TextEncoding::Utf16BE,
        TextEncoding::Utf8,
    ];

    /// Map an encoding byte to its encoding, falling back to Latin-1
    pub fn from_byte(byte: u8) -> Self {
        Self::ALL.get(byte as usize).copied().unwrap_or_default()
    }

    /// Look up a canonical name ("ISO-8859-1", "UTF-16", "UTF-16BE", "UTF-8")
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Utf16 => "UTF-16",
            TextEncoding::Utf16BE => "UTF-16BE",
            TextEncoding::Utf8 => "UTF-8",
        }
    }

    /// Whether characters are 2 bytes wide (and so is the terminator)
    pub fn is_wide(self) -> bool {
        matches!(self, TextEncoding::Utf16 | TextEncoding::Utf16BE)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any of the ways an encoding is identified in tag data or by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingId<'a> {
    Code(i64),
    Name(&'a str),
    Encoding(TextEncoding),
}

impl From<u8> for EncodingId<'_> {
    fn from(code: u8) -> Self {
        EncodingId::Code(code as i64)
    }
}

impl From<i64> for EncodingId<'_> {
    fn from(code: i64) -> Self {
        EncodingId::Code(code)
    }
}

impl<'a> From<&'a str> for EncodingId<'a> {
    fn from(name: &'a str) -> Self {
        EncodingId::Name(name)
    }
}

impl From<TextEncoding> for EncodingId<'_> {
    fn from(encoding: TextEncoding) -> Self {
        EncodingId::Encoding(encoding)
    }
}

/// Normalize a code, name, or encoding to a [`TextEncoding`]
///
/// Codes outside 0..=3 and unknown names resolve to Latin-1.
pub fn resolve_encoding<'a>(value: impl Into<EncodingId<'a>>) -> TextEncoding {
    match value.into() {
        EncodingId::Encoding(encoding) => encoding,
        EncodingId::Name(name) => TextEncoding::from_name(name).unwrap_or_default(),
        EncodingId::Code(code) => u8::try_from(code)
            .map(TextEncoding::from_byte)
            .unwrap_or_default(),
    }
}

/// Decode text with specified encoding, dropping any NUL characters
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    let decoded = match encoding {
        TextEncoding::Latin1 => encoding_rs::mem::decode_latin1(data),
        TextEncoding::Utf16 => {
            // Detect BOM, little-endian when absent
            if data.starts_with(&[0xFF, 0xFE]) {
                UTF_16LE.decode_without_bom_handling(&data[2..]).0
            } else if data.starts_with(&[0xFE, 0xFF]) {
                UTF_16BE.decode_without_bom_handling(&data[2..]).0
            } else {
                UTF_16LE.decode_without_bom_handling(data).0
            }
        }
        TextEncoding::Utf16BE => UTF_16BE.decode_with_bom_removal(data).0,
        TextEncoding::Utf8 => UTF_8.decode_with_bom_removal(data).0,
    };

    decoded.replace('\0', "")
}

/// Encode text with specified encoding
///
/// UTF-16 is written little-endian behind an `FF FE` byte order mark.
/// Characters Latin-1 cannot represent become `?`.
pub fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Latin1 => {
            if encoding_rs::mem::is_str_latin1(text) {
                encoding_rs::mem::encode_latin1_lossy(text).into_owned()
            } else {
                text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()
            }
        }
        TextEncoding::Utf16 => {
            let mut out = vec![0xFF, 0xFE];
            out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            out
        }
        TextEncoding::Utf16BE => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
    }
}

/// Null terminator for the encoding
pub fn build_terminator(encoding: TextEncoding) -> &'static [u8] {
    if encoding.is_wide() {
        &[0x00, 0x00]
    } else {
        &[0x00]
    }
}

/// A buffer split around a null terminator
///
/// `value` is `None` when no terminator was found, in which case
/// `remainder` holds the whole input. `remainder` is `None` when the
/// terminator ends the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitBuffer<'a> {
    pub value: Option<&'a [u8]>,
    pub remainder: Option<&'a [u8]>,
}

/// Split `data` at the first null terminator for `encoding`
///
/// For the UTF-16 encodings the terminator is `00 00`. When a third `00`
/// follows, the match was one byte early (the last character ended in
/// `00`) and the terminator is shifted right by one.
pub fn split_at_terminator(data: &[u8], encoding: TextEncoding) -> SplitBuffer<'_> {
    let width = build_terminator(encoding).len();
    let start = if encoding.is_wide() {
        data.windows(2).position(|w| w == [0x00, 0x00]).map(|pos| {
            if data.get(pos + 2) == Some(&0x00) {
                pos + 1
            } else {
                pos
            }
        })
    } else {
        data.iter().position(|&b| b == 0x00)
    };

    match start {
        None => SplitBuffer {
            value: None,
            remainder: Some(data),
        },
        Some(start) => {
            let after = start + width;
            SplitBuffer {
                value: Some(&data[..start]),
                remainder: (after < data.len()).then(|| &data[after..]),
            }
        }
    }
}
