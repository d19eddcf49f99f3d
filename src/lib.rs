//! Oxid3 - a low-level ID3v2 codec
//!
//! Parses and produces the structural pieces of ID3v2.2, ID3v2.3 and ID3v2.4
//! tags: the tag header, frame headers, synchsafe and raw sizes, flag bytes,
//! unsynchronisation and the four text encodings. Everything works on byte
//! slices; reading and writing files is left to the caller.
//!
//! ```
//! use oxid3::{find_tag_start, Id3v2Tag, Id3v2Version, ParseOptions, TagBuilder, TextEncoding};
//!
//! let tag = TagBuilder::new(Id3v2Version::V4)
//!     .text_frame("TIT2", "Title", TextEncoding::Utf8)
//!     .build()
//!     .unwrap();
//!
//! let mut file = b"junk".to_vec();
//! file.extend(tag);
//! assert_eq!(find_tag_start(&file), Some(4));
//!
//! let tag = Id3v2Tag::parse(&file, ParseOptions::new()).unwrap();
//! assert_eq!(tag.text("TIT2").as_deref(), Some("Title"));
//! ```

pub mod config;
pub mod error;
pub mod id3;
pub mod utils;

pub use config::ParseOptions;
pub use error::{Id3Error, Result};
pub use id3::{
    find_tag_start, get_spec_options, is_valid_header, parse_frame_header_flags,
    parse_tag_header_flags, read_frame_size, Frame, FrameFlags, FrameHeader, FrameOptions,
    FrameOptionsSource, FrameOptionsTable, Frames, Id3v2Tag, Id3v2Version, TagBuilder, TagFlags,
    TagHeader,
};
pub use utils::encoding::{
    build_terminator, decode_text, encode_text, resolve_encoding, split_at_terminator, SplitBuffer,
    TextEncoding,
};
pub use utils::synchsafe::{decode_size, encode_size};
pub use utils::unsynch::{add_unsynchronisation, remove_unsynchronisation};
