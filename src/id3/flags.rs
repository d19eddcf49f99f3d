// Tag and frame flag sets
//
// The same flag sits at different bits in ID3v2.3 and ID3v2.4. Both the
// parser and the encoder read the bit positions from the tables below.

use crate::id3::header::{Id3v2Version, TAG_HEADER_SIZE};
use serde::Serialize;

/// Size of an ID3v2.3/2.4 frame header
pub const FRAME_HEADER_SIZE: usize = 10;

/// Tag-level flags (header byte 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFlag {
    Unsynchronisation,
    ExtendedHeader,
    ExperimentalIndicator,
    FooterPresent,
}

impl TagFlag {
    pub const ALL: [TagFlag; 4] = [
        TagFlag::Unsynchronisation,
        TagFlag::ExtendedHeader,
        TagFlag::ExperimentalIndicator,
        TagFlag::FooterPresent,
    ];

    /// Bitmask in the flags byte, `None` if the flag doesn't exist in `version`
    pub const fn mask(self, version: Id3v2Version) -> Option<u8> {
        match (version, self) {
            (Id3v2Version::V2, _) => None,
            (_, TagFlag::Unsynchronisation) => Some(0x80),
            (_, TagFlag::ExtendedHeader) => Some(0x40),
            (_, TagFlag::ExperimentalIndicator) => Some(0x20),
            (Id3v2Version::V3, TagFlag::FooterPresent) => None,
            (Id3v2Version::V4, TagFlag::FooterPresent) => Some(0x10),
        }
    }
}

/// Frame-level flags (the two bytes ending a v2.3/v2.4 frame header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameFlag {
    TagAlterPreservation,
    FileAlterPreservation,
    ReadOnly,
    GroupingIdentity,
    Compression,
    Encryption,
    Unsynchronisation,
    DataLengthIndicator,
}

impl FrameFlag {
    pub const ALL: [FrameFlag; 8] = [
        FrameFlag::TagAlterPreservation,
        FrameFlag::FileAlterPreservation,
        FrameFlag::ReadOnly,
        FrameFlag::GroupingIdentity,
        FrameFlag::Compression,
        FrameFlag::Encryption,
        FrameFlag::Unsynchronisation,
        FrameFlag::DataLengthIndicator,
    ];

    /// `(flag byte index, bitmask)`, `None` if the flag doesn't exist in `version`
    pub const fn mask(self, version: Id3v2Version) -> Option<(usize, u8)> {
        match (version, self) {
            (Id3v2Version::V2, _) => None,

            (Id3v2Version::V3, FrameFlag::TagAlterPreservation) => Some((0, 0x80)),
            (Id3v2Version::V3, FrameFlag::FileAlterPreservation) => Some((0, 0x40)),
            (Id3v2Version::V3, FrameFlag::ReadOnly) => Some((0, 0x20)),
            (Id3v2Version::V3, FrameFlag::Compression) => Some((1, 0x80)),
            (Id3v2Version::V3, FrameFlag::Encryption) => Some((1, 0x40)),
            (Id3v2Version::V3, FrameFlag::GroupingIdentity) => Some((1, 0x20)),
            (Id3v2Version::V3, FrameFlag::Unsynchronisation) => None,
            (Id3v2Version::V3, FrameFlag::DataLengthIndicator) => None,

            (Id3v2Version::V4, FrameFlag::TagAlterPreservation) => Some((0, 0x40)),
            (Id3v2Version::V4, FrameFlag::FileAlterPreservation) => Some((0, 0x20)),
            (Id3v2Version::V4, FrameFlag::ReadOnly) => Some((0, 0x10)),
            (Id3v2Version::V4, FrameFlag::GroupingIdentity) => Some((1, 0x40)),
            (Id3v2Version::V4, FrameFlag::Compression) => Some((1, 0x08)),
            (Id3v2Version::V4, FrameFlag::Encryption) => Some((1, 0x04)),
            (Id3v2Version::V4, FrameFlag::Unsynchronisation) => Some((1, 0x02)),
            (Id3v2Version::V4, FrameFlag::DataLengthIndicator) => Some((1, 0x01)),
        }
    }
}

/// Flags that apply to the entire tag
///
/// `footer_present` is only `Some` for ID3v2.4 tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFlags {
    pub unsynchronisation: bool,
    pub extended_header: bool,
    pub experimental_indicator: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_present: Option<bool>,
}

impl TagFlags {
    fn from_byte(byte: u8, version: Id3v2Version) -> Option<Self> {
        let get = |flag: TagFlag| flag.mask(version).map(|mask| byte & mask != 0);

        Some(TagFlags {
            unsynchronisation: get(TagFlag::Unsynchronisation)?,
            extended_header: get(TagFlag::ExtendedHeader)?,
            experimental_indicator: get(TagFlag::ExperimentalIndicator)?,
            footer_present: get(TagFlag::FooterPresent),
        })
    }

    pub fn get(&self, flag: TagFlag) -> Option<bool> {
        match flag {
            TagFlag::Unsynchronisation => Some(self.unsynchronisation),
            TagFlag::ExtendedHeader => Some(self.extended_header),
            TagFlag::ExperimentalIndicator => Some(self.experimental_indicator),
            TagFlag::FooterPresent => self.footer_present,
        }
    }

    /// Get the flags byte for `version`
    ///
    /// Flags that don't exist in `version` are not written.
    pub fn to_byte(&self, version: Id3v2Version) -> u8 {
        TagFlag::ALL
            .into_iter()
            .filter(|&flag| self.get(flag) == Some(true))
            .filter_map(|flag| flag.mask(version))
            .fold(0, |byte, mask| byte | mask)
    }
}

/// Flags of a single frame
///
/// `unsynchronisation` and `data_length_indicator` are only `Some` for
/// ID3v2.4 frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameFlags {
    pub tag_alter_preservation: bool,
    pub file_alter_preservation: bool,
    pub read_only: bool,
    pub grouping_identity: bool,
    pub compression: bool,
    pub encryption: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsynchronisation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_length_indicator: Option<bool>,
}

impl FrameFlags {
    /// Decode the two flag bytes of a frame header
    pub fn from_bytes(bytes: [u8; 2], version: Id3v2Version) -> Option<Self> {
        let get = |flag: FrameFlag| {
            flag.mask(version)
                .map(|(index, mask)| bytes[index] & mask != 0)
        };

        Some(FrameFlags {
            tag_alter_preservation: get(FrameFlag::TagAlterPreservation)?,
            file_alter_preservation: get(FrameFlag::FileAlterPreservation)?,
            read_only: get(FrameFlag::ReadOnly)?,
            grouping_identity: get(FrameFlag::GroupingIdentity)?,
            compression: get(FrameFlag::Compression)?,
            encryption: get(FrameFlag::Encryption)?,
            unsynchronisation: get(FrameFlag::Unsynchronisation),
            data_length_indicator: get(FrameFlag::DataLengthIndicator),
        })
    }

    pub fn get(&self, flag: FrameFlag) -> Option<bool> {
        match flag {
            FrameFlag::TagAlterPreservation => Some(self.tag_alter_preservation),
            FrameFlag::FileAlterPreservation => Some(self.file_alter_preservation),
            FrameFlag::ReadOnly => Some(self.read_only),
            FrameFlag::GroupingIdentity => Some(self.grouping_identity),
            FrameFlag::Compression => Some(self.compression),
            FrameFlag::Encryption => Some(self.encryption),
            FrameFlag::Unsynchronisation => self.unsynchronisation,
            FrameFlag::DataLengthIndicator => self.data_length_indicator,
        }
    }

    /// Get the two flag bytes for `version`
    pub fn to_bytes(&self, version: Id3v2Version) -> [u8; 2] {
        let mut bytes = [0; 2];
        for flag in FrameFlag::ALL {
            if self.get(flag) != Some(true) {
                continue;
            }
            if let Some((index, mask)) = flag.mask(version) {
                bytes[index] |= mask;
            }
        }
        bytes
    }

    /// Whether the frame payload must be unsynchronised on read
    pub fn is_unsynchronised(&self) -> bool {
        self.unsynchronisation == Some(true)
    }
}

/// Decode the flags byte of a 10-byte tag header
///
/// Returns `None` (an empty flag set) for short input, for an unknown
/// version byte, and for ID3v2.2, which has no flags this codec reads.
pub fn parse_tag_header_flags(header: &[u8]) -> Option<TagFlags> {
    if header.len() < TAG_HEADER_SIZE {
        return None;
    }

    let version = Id3v2Version::from_byte(header[3])?;
    TagFlags::from_byte(header[5], version)
}

/// Decode the flag bytes of a 10-byte v2.3/v2.4 frame header
///
/// Any length other than 10, or ID3v2.2, gives `None`.
pub fn parse_frame_header_flags(header: &[u8], version: Id3v2Version) -> Option<FrameFlags> {
    if header.len() != FRAME_HEADER_SIZE {
        return None;
    }

    FrameFlags::from_bytes([header[8], header[9]], version)
}
