// End-to-end: locate a tag inside junk, read its header and frames, decode text

use oxid3::id3::frames::{decode_text_frame_values, encode_text_frame_values, frame_ids};
use oxid3::{
    build_terminator, decode_text, encode_size, find_tag_start, is_valid_header,
    parse_frame_header_flags, parse_tag_header_flags, read_frame_size, remove_unsynchronisation,
    split_at_terminator, FrameFlags, Frames, Id3Error, Id3v2Tag, Id3v2Version, ParseOptions,
    TagBuilder, TagHeader, TextEncoding,
};
use proptest::prelude::*;

fn embed(tag: &[u8]) -> Vec<u8> {
    // "ID3" inside leading junk that is not a header
    let mut file = b"RIFF\x00ID3\xFF\xFF\x00\x00\x00\x00".to_vec();
    file.extend_from_slice(tag);
    file.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64, 0x00]);
    file
}

#[test]
fn manual_walk_over_a_v4_tag() {
    let tag = TagBuilder::new(Id3v2Version::V4)
        .text_frame(frame_ids::TITLE, "Titel", TextEncoding::Utf16)
        .frame(frame_ids::PICTURE, vec![0xFF, 0xD8, 0xFF, 0xE0])
        .unsynchronise(true)
        .padding(16)
        .build()
        .unwrap();
    let file = embed(&tag);

    let start = find_tag_start(&file).unwrap();
    assert_eq!(start, 14);
    assert!(is_valid_header(&file[start..start + 10]));

    let header = TagHeader::parse(&file[start..]).unwrap();
    let flags = parse_tag_header_flags(&file[start..start + 10]).unwrap();
    assert!(flags.unsynchronisation);
    assert_eq!(flags.footer_present, Some(false));

    let body = &file[start + 10..start + 10 + header.size as usize];

    let title_header = &body[..10];
    let title_size = read_frame_size(title_header, Id3v2Version::V4, true).unwrap() as usize;
    let title_flags = parse_frame_header_flags(title_header, Id3v2Version::V4).unwrap();
    assert!(title_flags.is_unsynchronised());

    let payload = remove_unsynchronisation(&body[10..10 + title_size]);
    let encoding = TextEncoding::from_byte(payload[0]);
    assert_eq!(encoding, TextEncoding::Utf16);
    assert_eq!(decode_text(&payload[1..], encoding), "Titel");

    let picture = &body[10 + title_size..];
    let picture_size = read_frame_size(picture, Id3v2Version::V4, true).unwrap() as usize;
    assert_eq!(picture_size, 6);
    assert_eq!(remove_unsynchronisation(&picture[10..10 + picture_size]), [0xFF, 0xD8, 0xFF, 0xE0]);
}

#[test]
fn parse_tag_from_embedded_buffer() {
    let tag = TagBuilder::new(Id3v2Version::V3)
        .text_frame(frame_ids::TITLE, "Caf\u{e9}", TextEncoding::Latin1)
        .text_frame(frame_ids::ARTIST, "Nobody", TextEncoding::Utf8)
        .frame("TCON", encode_text_frame_values(&["Rock", "Pop"], TextEncoding::Utf16))
        .build()
        .unwrap();
    let file = embed(&tag);

    let parsed = Id3v2Tag::parse(&file, ParseOptions::new()).unwrap();
    assert_eq!(parsed.offset, 14);
    assert_eq!(parsed.text(frame_ids::TITLE).as_deref(), Some("Caf\u{e9}"));
    assert_eq!(parsed.text(frame_ids::ARTIST).as_deref(), Some("Nobody"));
    assert_eq!(decode_text_frame_values(&parsed.get("TCON").unwrap().data), ["Rock", "Pop"]);
    assert_eq!(parsed.get_all("TCON").count(), 1);
}

#[test]
fn v3_and_v4_frame_sizes_differ() {
    // 0x00 0x00 0x01 0x7F is 383 raw but 255 synchsafe
    let header = [b'T', b'A', b'L', b'B', 0x00, 0x00, 0x01, 0x7F, 0x00, 0x00];
    assert_eq!(read_frame_size(&header, Id3v2Version::V3, false), Some(383));
    assert_eq!(read_frame_size(&header, Id3v2Version::V4, true), Some(255));
}

#[test]
fn frame_flag_bits_move_between_versions() {
    let header = [b'T', b'I', b'T', b'2', 0, 0, 0, 1, 0x40, 0x40];

    let v3 = parse_frame_header_flags(&header, Id3v2Version::V3).unwrap();
    assert!(v3.file_alter_preservation && v3.encryption);
    assert!(!v3.tag_alter_preservation && !v3.grouping_identity);

    let v4 = parse_frame_header_flags(&header, Id3v2Version::V4).unwrap();
    assert!(v4.tag_alter_preservation && v4.grouping_identity);
    assert!(!v4.file_alter_preservation && !v4.encryption);
}

#[test]
fn split_comment_style_payload() {
    // COMM-like: language, description terminated, then text
    let mut payload = b"eng".to_vec();
    payload.extend(oxid3::encode_text("desc", TextEncoding::Utf16));
    payload.extend_from_slice(build_terminator(TextEncoding::Utf16));
    payload.extend(oxid3::encode_text("body", TextEncoding::Utf16));

    let split = split_at_terminator(&payload[3..], TextEncoding::Utf16);
    assert_eq!(decode_text(split.value.unwrap(), TextEncoding::Utf16), "desc");
    assert_eq!(decode_text(split.remainder.unwrap(), TextEncoding::Utf16), "body");
}

#[test]
fn frames_iterator_on_raw_body() {
    let mut body = b"TIT2".to_vec();
    body.extend_from_slice(&encode_size(3));
    body.extend_from_slice(&FrameFlags::default().to_bytes(Id3v2Version::V4));
    body.extend_from_slice(b"\x03Hi");

    let frames: Vec<_> = Frames::new(&body, Id3v2Version::V4, true).collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].text().as_deref(), Some("Hi"));
}

#[test]
fn missing_or_truncated_tags() {
    assert!(matches!(Id3v2Tag::parse(b"ID3", ParseOptions::new()), Err(Id3Error::NoTag)));
    assert_eq!(find_tag_start(b"ID3"), None);

    let tag = TagBuilder::new(Id3v2Version::V3)
        .text_frame(frame_ids::ALBUM, "Cut short", TextEncoding::Latin1)
        .build()
        .unwrap();
    let cut = &tag[..tag.len() - 4];
    assert!(matches!(
        Id3v2Tag::parse(cut, ParseOptions::new()),
        Err(Id3Error::Truncated { .. })
    ));
}

fn exercise_untrusted(data: &[u8]) {
    let _ = find_tag_start(data);
    if let Ok(tag) = Id3v2Tag::parse(data, ParseOptions::new()) {
        for frame in &tag.frames {
            let _ = frame.text();
            let _ = decode_text_frame_values(&frame.data);
        }
    }
    let _ = Id3v2Tag::parse(data, ParseOptions::new().unsynchronisation(false));

    for encoding in TextEncoding::ALL {
        let _ = split_at_terminator(data, encoding);
    }
    let _ = decode_text_frame_values(data);
}

proptest! {
    #[test]
    fn arbitrary_bytes_after_marker_never_panic(
        tail in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let mut data = b"ID3".to_vec();
        data.extend(tail);
        exercise_untrusted(&data);
    }

    #[test]
    fn valid_header_over_arbitrary_body_never_panics(
        major in 2u8..=4,
        flags in any::<u8>(),
        declared in 0u32..600,
        body in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let mut data = vec![b'I', b'D', b'3', major, 0, flags];
        data.extend_from_slice(&encode_size(declared));
        data.extend(body);
        exercise_untrusted(&data);
    }
}
