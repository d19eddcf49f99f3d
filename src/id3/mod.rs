// ID3v2 structural codec
pub mod flags;
pub mod frames;
pub mod header;
pub mod spec_options;
pub mod v2;

pub use flags::{parse_frame_header_flags, parse_tag_header_flags, FrameFlags, TagFlags};
pub use frames::{read_frame_size, Frame, FrameHeader, Frames};
pub use header::{find_tag_start, is_valid_header, Id3v2Version, TagHeader};
pub use spec_options::{get_spec_options, FrameOptions, FrameOptionsSource, FrameOptionsTable};
pub use v2::{Id3v2Tag, TagBuilder};
