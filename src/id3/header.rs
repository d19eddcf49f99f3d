// ID3v2 tag header: validation, location and parsing

use crate::id3::flags::{parse_tag_header_flags, TagFlags};
use crate::utils::synchsafe::{decode_size, encode_size};
use serde::Serialize;

/// Size of the tag header (and of the v2.4 footer)
pub const TAG_HEADER_SIZE: usize = 10;

const ID: [u8; 3] = *b"ID3";

/// The ID3v2 major version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum Id3v2Version {
    /// ID3v2.2
    V2,
    /// ID3v2.3
    V3,
    /// ID3v2.4
    V4,
}

impl Id3v2Version {
    /// Map the major version byte, `None` for anything but 2, 3 or 4
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            2 => Some(Id3v2Version::V2),
            3 => Some(Id3v2Version::V3),
            4 => Some(Id3v2Version::V4),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Id3v2Version::V2 => 2,
            Id3v2Version::V3 => 3,
            Id3v2Version::V4 => 4,
        }
    }

    /// Whether frame sizes are stored synchsafe
    pub fn synchsafe_frame_sizes(self) -> bool {
        self == Id3v2Version::V4
    }
}

impl From<Id3v2Version> for u8 {
    fn from(version: Id3v2Version) -> Self {
        version.as_byte()
    }
}

/// Check that `header` starts with a structurally valid 10-byte tag header
///
/// Requires the `ID3` marker, a major version of 2, 3 or 4, a zero revision
/// byte and a synchsafe size (no size byte with its high bit set).
pub fn is_valid_header(header: &[u8]) -> bool {
    if header.len() < TAG_HEADER_SIZE {
        return false;
    }

    header[..3] == ID
        && Id3v2Version::from_byte(header[3]).is_some()
        && header[4] == 0
        && header[6..10].iter().all(|&b| b & 0x80 == 0)
}

/// Find the offset of the first valid tag header in `data`
///
/// `ID3` can show up by accident in audio or picture data, so every marker
/// is checked against the full header before it is accepted.
pub fn find_tag_start(data: &[u8]) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = find_marker(&data[from..]).map(|p| p + from) {
        let end = (pos + TAG_HEADER_SIZE).min(data.len());
        if is_valid_header(&data[pos..end]) {
            return Some(pos);
        }

        log::trace!("Rejected ID3 marker at offset {pos}");
        from = pos + 1;
    }

    None
}

fn find_marker(haystack: &[u8]) -> Option<usize> {
    haystack.windows(ID.len()).position(|w| w == ID)
}

/// ID3v2 header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagHeader {
    pub version: Id3v2Version,
    pub revision: u8,
    /// Raw flags byte, see [`TagHeader::flags`]
    pub flags: u8,
    /// Size of the tag contents, **excluding** the header and footer
    pub size: u32,
}

impl TagHeader {
    /// Parse the first 10 bytes of `data`
    pub fn parse(data: &[u8]) -> Option<Self> {
        if !is_valid_header(data) {
            return None;
        }

        let header = TagHeader {
            version: Id3v2Version::from_byte(data[3])?,
            revision: data[4],
            flags: data[5],
            size: decode_size([data[6], data[7], data[8], data[9]]),
        };
        log::debug!(
            "Parsed ID3v2.{} header: flags {:#04x}, {} bytes",
            header.version.as_byte(),
            header.flags,
            header.size
        );

        Some(header)
    }

    /// Decoded tag-level flags; `None` for ID3v2.2
    pub fn flags(&self) -> Option<TagFlags> {
        parse_tag_header_flags(&self.to_bytes())
    }

    /// Total size on disk, including header and any footer
    pub fn total_size(&self) -> usize {
        let footer = self.flags().is_some_and(|f| f.footer_present == Some(true));
        TAG_HEADER_SIZE + self.size as usize + if footer { TAG_HEADER_SIZE } else { 0 }
    }

    pub fn to_bytes(&self) -> [u8; TAG_HEADER_SIZE] {
        let size = encode_size(self.size);
        [
            ID[0],
            ID[1],
            ID[2],
            self.version.as_byte(),
            self.revision,
            self.flags,
            size[0],
            size[1],
            size[2],
            size[3],
        ]
    }
}
