// ID3v2 tag reading and writing

use crate::config::ParseOptions;
use crate::error::{Id3Error, Result};
use crate::id3::flags::{FrameFlags, TagFlag, TagFlags};
use crate::id3::frames::{encode_text_frame, Frame, FrameHeader, Frames};
use crate::id3::header::{find_tag_start, Id3v2Version, TagHeader, TAG_HEADER_SIZE};
use crate::utils::encoding::TextEncoding;
use crate::utils::synchsafe::{decode_size, encode_size, read_be_uint, MAX_SYNCHSAFE};
use crate::utils::unsynch::{add_unsynchronisation, remove_unsynchronisation};
use std::borrow::Cow;

// Bit 7 of the flags byte means unsynchronisation in every version, including
// ID3v2.2, whose remaining flags aren't decoded
const UNSYNCHRONISATION_BIT: u8 = 0x80;

const FOOTER_ID: [u8; 3] = *b"3DI";

/// ID3v2 tag structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v2Tag {
    /// Offset of the tag header in the parsed buffer
    pub offset: usize,
    pub header: TagHeader,
    /// Raw extended header, including its size field
    pub extended_header: Option<Vec<u8>>,
    pub frames: Vec<Frame>,
}

impl Id3v2Tag {
    /// Locate and parse the first tag in `data`
    pub fn parse(data: &[u8], options: ParseOptions) -> Result<Self> {
        let offset = find_tag_start(data).ok_or(Id3Error::NoTag)?;
        let header = TagHeader::parse(&data[offset..]).ok_or(Id3Error::NoTag)?;
        let version = header.version;

        let body_start = offset + TAG_HEADER_SIZE;
        let declared = header.size as usize;
        let available = data.len() - body_start;
        if declared > available {
            return Err(Id3Error::Truncated {
                declared,
                available,
            });
        }
        let mut body = Cow::Borrowed(&data[body_start..body_start + declared]);

        // Before v2.4 the whole body is unsynchronised, in v2.4 each frame is
        let tag_unsynchronised = header.flags & UNSYNCHRONISATION_BIT != 0;
        if options.unsynchronisation && tag_unsynchronised && version != Id3v2Version::V4 {
            log::debug!("Removing tag-wide unsynchronisation");
            body = Cow::Owned(remove_unsynchronisation(&body));
        }

        let flags = header.flags();
        let mut extended_header = None;
        let mut frames_start = 0;
        if flags.is_some_and(|f| f.extended_header) {
            let size = extended_header_size(&body, version)?;
            extended_header = Some(body[..size].to_vec());
            frames_start = size;
        }

        let frames = Frames::new(
            &body[frames_start..],
            version,
            options.unsynchronisation && version == Id3v2Version::V4,
        )
        .take(options.max_frames.unwrap_or(usize::MAX))
        .collect::<Vec<_>>();
        log::debug!("Read {} frames from ID3v2.{} tag", frames.len(), version.as_byte());

        Ok(Id3v2Tag {
            offset,
            header,
            extended_header,
            frames,
        })
    }

    pub fn version(&self) -> Id3v2Version {
        self.header.version
    }

    /// First frame with the given id
    pub fn get(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id() == id)
    }

    /// All frames with the given id
    pub fn get_all<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Frame> + 'a {
        self.frames.iter().filter(move |f| f.id() == id)
    }

    /// Decoded value of the first text frame with the given id
    pub fn text(&self, id: &str) -> Option<String> {
        self.get(id).and_then(Frame::text)
    }
}

/// Size of the extended header at the start of `body`, including its size field
fn extended_header_size(body: &[u8], version: Id3v2Version) -> Result<usize> {
    let too_large = |size| Id3Error::ExtendedHeader {
        size,
        body: body.len(),
    };

    let Some(field) = body.get(..4) else {
        return Err(too_large(4));
    };

    let size = match version {
        // v2.3 excludes the size field itself
        Id3v2Version::V3 => read_be_uint(field) as usize + 4,
        _ => decode_size([field[0], field[1], field[2], field[3]]) as usize,
    };

    if size < 4 || size > body.len() {
        return Err(too_large(size));
    }

    log::debug!("Skipping {size}-byte extended header");
    Ok(size)
}

struct PendingFrame {
    id: String,
    flags: FrameFlags,
    data: Vec<u8>,
}

/// Builds the bytes of a complete tag
pub struct TagBuilder {
    version: Id3v2Version,
    flags: TagFlags,
    unsynchronise: bool,
    padding: usize,
    frames: Vec<PendingFrame>,
}

impl TagBuilder {
    pub fn new(version: Id3v2Version) -> Self {
        Self {
            version,
            flags: TagFlags::default(),
            unsynchronise: false,
            padding: 0,
            frames: Vec::new(),
        }
    }

    /// Start a rewrite of a parsed tag, keeping its version, flags and frames
    ///
    /// Frame payloads are taken as parsed, so unsynchronisation is only
    /// reapplied if [`TagBuilder::unsynchronise`] is set.
    pub fn from_tag(tag: &Id3v2Tag) -> Self {
        let mut builder = Self::new(tag.version());
        builder.flags = tag.header.flags().unwrap_or_default();
        builder.unsynchronise = tag.header.flags & UNSYNCHRONISATION_BIT != 0;
        for frame in &tag.frames {
            let mut flags = frame.header.flags.unwrap_or_default();
            if flags.unsynchronisation.is_some() {
                flags.unsynchronisation = Some(false);
            }
            builder = builder.frame_with_flags(frame.id(), flags, frame.data.clone());
        }
        builder
    }

    /// Tag-level flags; the extended header flag is ignored
    pub fn flags(mut self, flags: TagFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn unsynchronise(mut self, unsynchronise: bool) -> Self {
        self.unsynchronise = unsynchronise;
        self
    }

    /// Zero bytes appended after the last frame
    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn frame(self, id: &str, data: impl Into<Vec<u8>>) -> Self {
        self.frame_with_flags(id, FrameFlags::default(), data)
    }

    pub fn frame_with_flags(
        mut self,
        id: &str,
        flags: FrameFlags,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.frames.push(PendingFrame {
            id: id.to_string(),
            flags,
            data: data.into(),
        });
        self
    }

    pub fn text_frame(self, id: &str, text: &str, encoding: TextEncoding) -> Self {
        self.frame(id, encode_text_frame(text, encoding))
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let version = self.version;
        let per_frame_unsync = self.unsynchronise && version == Id3v2Version::V4;

        let mut body = Vec::new();
        for frame in &self.frames {
            let mut flags = frame.flags;
            if per_frame_unsync {
                flags.unsynchronisation = Some(true);
            }

            let mut payload = Cow::Borrowed(frame.data.as_slice());
            if version == Id3v2Version::V4 && flags.data_length_indicator == Some(true) {
                let length = u32::try_from(frame.data.len())
                    .ok()
                    .filter(|&length| length <= MAX_SYNCHSAFE)
                    .ok_or_else(|| Id3Error::UnwritableFrame {
                        id: frame.id.clone(),
                        reason: "data length exceeds 28 bits",
                    })?;
                let mut content = encode_size(length).to_vec();
                content.extend_from_slice(&frame.data);
                payload = Cow::Owned(content);
            }
            // Escape exactly the frames whose written flag claims it
            if version == Id3v2Version::V4 && flags.unsynchronisation == Some(true) {
                payload = Cow::Owned(add_unsynchronisation(&payload));
            }

            let size = u32::try_from(payload.len()).map_err(|_| Id3Error::UnwritableFrame {
                id: frame.id.clone(),
                reason: "payload exceeds 32 bits",
            })?;
            let header = FrameHeader {
                id: frame.id.clone(),
                size,
                flags: (version != Id3v2Version::V2).then_some(flags),
                version,
            };

            body.extend(header.to_bytes()?);
            body.extend_from_slice(&payload);
        }

        if self.unsynchronise && version != Id3v2Version::V4 {
            body = add_unsynchronisation(&body);
        }
        body.resize(body.len() + self.padding, 0);

        let size = u32::try_from(body.len())
            .ok()
            .filter(|&size| size <= MAX_SYNCHSAFE)
            .ok_or(Id3Error::TagTooLarge(body.len()))?;

        let mut flags = self.flags;
        if flags.extended_header {
            log::debug!("Extended headers are not written, dropping the flag");
            flags.extended_header = false;
        }
        let mut flags_byte = flags.to_byte(version);
        if self.unsynchronise {
            flags_byte |= UNSYNCHRONISATION_BIT;
        }

        let header = TagHeader {
            version,
            revision: 0,
            flags: flags_byte,
            size,
        };
        let header_bytes = header.to_bytes();

        let mut tag = Vec::with_capacity(header.total_size());
        tag.extend_from_slice(&header_bytes);
        tag.extend(body);

        if flags.get(TagFlag::FooterPresent) == Some(true) && version == Id3v2Version::V4 {
            tag.extend_from_slice(&FOOTER_ID);
            tag.extend_from_slice(&header_bytes[FOOTER_ID.len()..]);
        }

        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::frames::frame_ids;

    #[test]
    fn test_parse_built_v3_tag() {
        let tag_bytes = TagBuilder::new(Id3v2Version::V3)
            .text_frame(frame_ids::TITLE, "Song", TextEncoding::Latin1)
            .text_frame(frame_ids::ARTIST, "Band", TextEncoding::Utf16)
            .padding(32)
            .build()
            .unwrap();

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
        assert_eq!(tag.offset, 0);
        assert_eq!(tag.version(), Id3v2Version::V3);
        assert_eq!(tag.header.total_size(), tag_bytes.len());
        assert_eq!(tag.frames.len(), 2);
        assert_eq!(tag.text(frame_ids::TITLE).as_deref(), Some("Song"));
        assert_eq!(tag.text(frame_ids::ARTIST).as_deref(), Some("Band"));
        assert_eq!(tag.text(frame_ids::ALBUM), None);
    }

    #[test]
    fn test_parse_v2_tag() {
        let tag_bytes = TagBuilder::new(Id3v2Version::V2)
            .text_frame(frame_ids::V2_TITLE, "Old", TextEncoding::Latin1)
            .build()
            .unwrap();

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
        assert_eq!(tag.frames[0].header.flags, None);
        assert_eq!(tag.text(frame_ids::V2_TITLE).as_deref(), Some("Old"));
    }

    #[test]
    fn test_unsynchronised_round_trip() {
        let payload = vec![0xFF, 0x00, 0xFF, 0xE0, 0x12, 0xFF];

        for version in [Id3v2Version::V3, Id3v2Version::V4] {
            let tag_bytes = TagBuilder::new(version)
                .frame(frame_ids::PICTURE, payload.clone())
                .unsynchronise(true)
                .build()
                .unwrap();
            assert_eq!(tag_bytes[5] & UNSYNCHRONISATION_BIT, UNSYNCHRONISATION_BIT);

            let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
            let frame = tag.get(frame_ids::PICTURE).unwrap();
            assert_eq!(frame.data, payload, "v2.{}", version.as_byte());

            let options = ParseOptions::new().unsynchronisation(false);
            let raw = Id3v2Tag::parse(&tag_bytes, options).unwrap();
            assert_ne!(raw.frames.first().map(|f| &f.data), Some(&payload));
        }
    }

    #[test]
    fn test_flagged_frame_escaped_without_tag_unsynchronisation() {
        let flags = FrameFlags {
            unsynchronisation: Some(true),
            ..FrameFlags::default()
        };
        let payload = vec![0x01, 0xFF, 0x00, 0x02];
        let tag_bytes = TagBuilder::new(Id3v2Version::V4)
            .frame_with_flags(frame_ids::PICTURE, flags, payload.clone())
            .build()
            .unwrap();
        assert_eq!(tag_bytes[5] & UNSYNCHRONISATION_BIT, 0);

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
        let frame = tag.get(frame_ids::PICTURE).unwrap();
        assert!(frame.header.flags.is_some_and(|f| f.is_unsynchronised()));
        assert_eq!(frame.data, payload);
    }

    #[test]
    fn test_data_length_indicator_round_trip() {
        let flags = FrameFlags {
            data_length_indicator: Some(true),
            ..FrameFlags::default()
        };
        let tag_bytes = TagBuilder::new(Id3v2Version::V4)
            .frame_with_flags(
                frame_ids::TITLE,
                flags,
                encode_text_frame("\u{ff}", TextEncoding::Latin1),
            )
            .unsynchronise(true)
            .build()
            .unwrap();

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
        let frame = tag.get(frame_ids::TITLE).unwrap();
        assert_eq!(frame.data_length, Some(2));
        assert_eq!(frame.text().as_deref(), Some("\u{ff}"));

        let rebuilt = TagBuilder::from_tag(&tag).unsynchronise(true).build().unwrap();
        assert_eq!(rebuilt, tag_bytes);
    }

    #[test]
    fn test_rewrite_from_tag() {
        let original = TagBuilder::new(Id3v2Version::V4)
            .text_frame(frame_ids::TITLE, "Again", TextEncoding::Utf8)
            .frame(frame_ids::PICTURE, vec![0xFF, 0xD8, 0xFF, 0x00])
            .unsynchronise(true)
            .build()
            .unwrap();

        let tag = Id3v2Tag::parse(&original, ParseOptions::new()).unwrap();
        let rebuilt = TagBuilder::from_tag(&tag).build().unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_footer_written() {
        let flags = TagFlags {
            footer_present: Some(true),
            ..TagFlags::default()
        };
        let tag_bytes = TagBuilder::new(Id3v2Version::V4)
            .flags(flags)
            .text_frame(frame_ids::TITLE, "Foot", TextEncoding::Latin1)
            .build()
            .unwrap();

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
        assert_eq!(tag.header.total_size(), tag_bytes.len());
        assert_eq!(&tag_bytes[tag_bytes.len() - 10..][..3], b"3DI");
        assert_eq!(tag_bytes[tag_bytes.len() - 7..], tag_bytes[3..10]);
    }

    #[test]
    fn test_extended_header_skipped() {
        let frame = FrameHeader {
            id: frame_ids::TITLE.to_string(),
            size: 3,
            flags: Some(FrameFlags::default()),
            version: Id3v2Version::V3,
        };

        // v2.3: 4-byte size excluding itself, then 2 flag bytes and 4 bytes of padding size
        let mut body = vec![0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        body.extend(frame.to_bytes().unwrap());
        body.extend_from_slice(b"\x00Hi");

        let mut tag_bytes = vec![b'I', b'D', b'3', 3, 0, 0x40];
        tag_bytes.extend_from_slice(&encode_size(body.len() as u32));
        tag_bytes.extend(body);

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new()).unwrap();
        assert_eq!(tag.extended_header.as_ref().map(Vec::len), Some(10));
        assert_eq!(tag.text(frame_ids::TITLE).as_deref(), Some("Hi"));
    }

    #[test]
    fn test_extended_header_too_large() {
        let mut tag_bytes = vec![b'I', b'D', b'3', 4, 0, 0x40, 0, 0, 0, 6];
        tag_bytes.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x00]);

        assert!(matches!(
            Id3v2Tag::parse(&tag_bytes, ParseOptions::new()),
            Err(Id3Error::ExtendedHeader { size: 128, body: 6 })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Id3v2Tag::parse(b"no tag here", ParseOptions::new()),
            Err(Id3Error::NoTag)
        ));

        let truncated = [b'I', b'D', b'3', 3, 0, 0, 0, 0, 0, 20, 0, 0];
        assert!(matches!(
            Id3v2Tag::parse(&truncated, ParseOptions::new()),
            Err(Id3Error::Truncated {
                declared: 20,
                available: 2
            })
        ));
    }

    #[test]
    fn test_max_frames() {
        let tag_bytes = TagBuilder::new(Id3v2Version::V3)
            .text_frame(frame_ids::TITLE, "1", TextEncoding::Latin1)
            .text_frame(frame_ids::ARTIST, "2", TextEncoding::Latin1)
            .build()
            .unwrap();

        let tag = Id3v2Tag::parse(&tag_bytes, ParseOptions::new().max_frames(1)).unwrap();
        assert_eq!(tag.frames.len(), 1);
    }

    #[test]
    fn test_unwritable_frame_id() {
        let result = TagBuilder::new(Id3v2Version::V2)
            .text_frame(frame_ids::TITLE, "Too long an id", TextEncoding::Latin1)
            .build();
        assert!(matches!(result, Err(Id3Error::UnwritableFrame { .. })));
    }
}
