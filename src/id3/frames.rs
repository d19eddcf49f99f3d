// ID3 frame headers, frame iteration and text frame payloads

use crate::error::{Id3Error, Result};
use crate::id3::flags::{parse_frame_header_flags, FrameFlags, FRAME_HEADER_SIZE};
use crate::id3::header::Id3v2Version;
use crate::utils::encoding::{
    build_terminator, decode_text, encode_text, resolve_encoding, split_at_terminator, TextEncoding,
};
use crate::utils::synchsafe::{decode_size, encode_size, read_be_uint, MAX_SYNCHSAFE};
use crate::utils::unsynch::remove_unsynchronisation;
use serde::Serialize;

/// Size of an ID3v2.2 frame header (3-byte id, 3-byte size, no flags)
pub const V2_FRAME_HEADER_SIZE: usize = 6;

const MAX_V2_FRAME_SIZE: u32 = 0x00FF_FFFF;

/// Common frame identifiers
pub mod frame_ids {
    pub const TITLE: &str = "TIT2"; // Title/songname/content description
    pub const ARTIST: &str = "TPE1"; // Lead performer(s)/Soloist(s)
    pub const ALBUM: &str = "TALB"; // Album/Movie/Show title
    pub const USER_TEXT: &str = "TXXX"; // User defined text information
    pub const PICTURE: &str = "APIC"; // Attached picture

    pub const V2_TITLE: &str = "TT2";
    pub const V2_USER_TEXT: &str = "TXX";
}

/// Frame header length for `version`
pub fn frame_header_size(version: Id3v2Version) -> usize {
    match version {
        Id3v2Version::V2 => V2_FRAME_HEADER_SIZE,
        Id3v2Version::V3 | Id3v2Version::V4 => FRAME_HEADER_SIZE,
    }
}

fn frame_id_size(version: Id3v2Version) -> usize {
    match version {
        Id3v2Version::V2 => 3,
        Id3v2Version::V3 | Id3v2Version::V4 => 4,
    }
}

/// Read the declared payload size from a frame header
///
/// ID3v2.2 stores 3 bytes at offset 3, later versions 4 bytes at offset 4.
/// With `synchsafe` the field is decoded 7 bits per byte, otherwise as a
/// plain big-endian integer. Which combination is right for a version is
/// up to the caller. Returns `None` if `header` is too short.
pub fn read_frame_size(header: &[u8], version: Id3v2Version, synchsafe: bool) -> Option<u32> {
    let field = match version {
        Id3v2Version::V2 => header.get(3..6)?,
        Id3v2Version::V3 | Id3v2Version::V4 => header.get(4..8)?,
    };

    if synchsafe {
        let mut bytes = [0u8; 4];
        bytes[4 - field.len()..].copy_from_slice(field);
        Some(decode_size(bytes))
    } else {
        Some(read_be_uint(field))
    }
}

/// ID3v2 frame header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    pub id: String,
    /// Payload size as declared in the header
    pub size: u32,
    /// `None` for ID3v2.2, which has no frame flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<FrameFlags>,
    #[serde(skip)]
    pub version: Id3v2Version,
}

impl FrameHeader {
    /// Parse a frame header at the start of `data`
    ///
    /// Returns `None` when `data` is too short, when it starts with padding,
    /// or when the id contains anything but `A-Z` and `0-9`.
    pub fn parse(data: &[u8], version: Id3v2Version) -> Option<Self> {
        let header_size = frame_header_size(version);
        let header = data.get(..header_size)?;

        // Assume we just started reading padding
        if header[0] == 0 {
            return None;
        }

        let id_bytes = &header[..frame_id_size(version)];
        if !is_valid_frame_id(id_bytes) {
            log::warn!("Invalid frame id {:02x?}", id_bytes);
            return None;
        }

        let size = read_frame_size(header, version, version.synchsafe_frame_sizes())?;
        let flags = match version {
            Id3v2Version::V2 => None,
            _ => parse_frame_header_flags(header, version),
        };

        Some(FrameHeader {
            id: id_bytes.iter().map(|&b| b as char).collect(),
            size,
            flags,
            version,
        })
    }

    /// Length of the encoded header
    pub fn header_size(&self) -> usize {
        frame_header_size(self.version)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let unwritable = |reason| Id3Error::UnwritableFrame {
            id: self.id.clone(),
            reason,
        };

        if self.id.len() != frame_id_size(self.version) || !is_valid_frame_id(self.id.as_bytes()) {
            return Err(unwritable("frame id does not fit the tag version"));
        }

        let mut bytes = Vec::with_capacity(self.header_size());
        bytes.extend_from_slice(self.id.as_bytes());

        match self.version {
            Id3v2Version::V2 => {
                if self.size > MAX_V2_FRAME_SIZE {
                    return Err(unwritable("payload exceeds 24 bits"));
                }
                bytes.extend_from_slice(&self.size.to_be_bytes()[1..]);
            }
            Id3v2Version::V3 => bytes.extend_from_slice(&self.size.to_be_bytes()),
            Id3v2Version::V4 => {
                if self.size > MAX_SYNCHSAFE {
                    return Err(unwritable("payload exceeds 28 bits"));
                }
                bytes.extend_from_slice(&encode_size(self.size));
            }
        }

        if self.version != Id3v2Version::V2 {
            let flags = self.flags.unwrap_or_default();
            bytes.extend_from_slice(&flags.to_bytes(self.version));
        }

        Ok(bytes)
    }
}

fn is_valid_frame_id(id: &[u8]) -> bool {
    id.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// ID3v2 frame structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    /// Payload, with unsynchronisation and any data length indicator removed
    pub data: Vec<u8>,
    /// Value of the ID3v2.4 data length indicator, when the frame carries one
    pub data_length: Option<u32>,
}

impl Frame {
    pub fn id(&self) -> &str {
        &self.header.id
    }

    /// Text information frames, excluding the user defined `TXXX`/`TXX`
    pub fn is_text(&self) -> bool {
        let id = self.id();
        id.starts_with('T') && id != frame_ids::USER_TEXT && id != frame_ids::V2_USER_TEXT
    }

    /// Decoded payload of a text frame
    pub fn text(&self) -> Option<String> {
        self.is_text().then(|| decode_text_frame(&self.data))
    }
}

/// Iterator over the frames of a tag body
///
/// Stops at padding, at the end of the body, or at the first frame whose
/// declared size runs past the body.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    body: &'a [u8],
    pos: usize,
    version: Id3v2Version,
    unsynchronisation: bool,
}

impl<'a> Frames<'a> {
    /// With `unsynchronisation`, payloads of frames flagged as unsynchronised
    /// are decoded while iterating.
    pub fn new(body: &'a [u8], version: Id3v2Version, unsynchronisation: bool) -> Self {
        Self {
            body,
            pos: 0,
            version,
            unsynchronisation,
        }
    }

    /// Offset into the body of the next frame
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let rest = self.body.get(self.pos..)?;
        let header = FrameHeader::parse(rest, self.version)?;

        let start = header.header_size();
        let end = start + header.size as usize;
        let Some(payload) = rest.get(start..end) else {
            log::warn!(
                "Frame {} declares {} bytes but only {} remain, stopping",
                header.id,
                header.size,
                rest.len() - start
            );
            self.pos = self.body.len();
            return None;
        };
        self.pos += end;

        let unsynchronised = header.flags.is_some_and(|f| f.is_unsynchronised());
        let mut data = if self.unsynchronisation && unsynchronised {
            remove_unsynchronisation(payload)
        } else {
            payload.to_vec()
        };

        let mut data_length = None;
        let has_indicator = header.flags.is_some_and(|f| f.data_length_indicator == Some(true));
        if has_indicator {
            match data.get(..4) {
                Some(field) => {
                    data_length = Some(decode_size([field[0], field[1], field[2], field[3]]));
                    data.drain(..4);
                }
                None => log::warn!(
                    "Frame {} is too short for its data length indicator",
                    header.id
                ),
            }
        }

        log::debug!("Read frame {} ({} bytes)", header.id, header.size);
        Some(Frame {
            header,
            data,
            data_length,
        })
    }
}

/// Decode text frame data (encoding byte followed by text)
pub fn decode_text_frame(data: &[u8]) -> String {
    let Some((&code, text)) = data.split_first() else {
        return String::new();
    };

    decode_text(text, resolve_encoding(code))
}

/// Decode each null separated value of a text frame
pub fn decode_text_frame_values(data: &[u8]) -> Vec<String> {
    let Some((&code, text)) = data.split_first() else {
        return Vec::new();
    };
    let encoding = resolve_encoding(code);

    let mut values = Vec::new();
    let mut rest = Some(text);
    while let Some(chunk) = rest {
        let split = split_at_terminator(chunk, encoding);
        match split.value {
            Some(value) => {
                values.push(decode_text(value, encoding));
                rest = split.remainder;
            }
            None => {
                values.push(decode_text(chunk, encoding));
                break;
            }
        }
    }

    values
}

/// Encode text frame data
pub fn encode_text_frame(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let mut result = vec![encoding.as_byte()];
    result.extend(encode_text(text, encoding));
    result
}

/// Encode several values into one text frame, null separated
pub fn encode_text_frame_values<S: AsRef<str>>(values: &[S], encoding: TextEncoding) -> Vec<u8> {
    let mut result = vec![encoding.as_byte()];
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            result.extend_from_slice(build_terminator(encoding));
        }
        result.extend(encode_text(value.as_ref(), encoding));
    }
    result
}
