//! Errors raised by whole-tag operations
//!
//! The structural codecs never fail; they report invalid input through
//! `Option`/`bool` results. Only the conveniences that stitch them together
//! (tag parsing and frame options loading) produce an [`Id3Error`].

use thiserror::Error;

/// Alias for `Result<T, Id3Error>`
pub type Result<T> = std::result::Result<T, Id3Error>;

#[derive(Debug, Error)]
pub enum Id3Error {
    /// No structurally valid tag header in the buffer
    #[error("no valid ID3v2 header found")]
    NoTag,

    /// The header declares more bytes than the buffer holds
    #[error("tag declares {declared} bytes but only {available} are available")]
    Truncated { declared: usize, available: usize },

    /// Extended header size runs past the tag body
    #[error("extended header of {size} bytes does not fit in a {body}-byte tag body")]
    ExtendedHeader { size: usize, body: usize },

    /// A frame cannot be represented in the tag's version
    #[error("frame {id:?} cannot be written: {reason}")]
    UnwritableFrame { id: String, reason: &'static str },

    /// The tag body does not fit a 28-bit synchsafe size
    #[error("tag body of {0} bytes exceeds the synchsafe size limit")]
    TagTooLarge(usize),

    /// The frame options table could not be deserialised
    #[error("invalid frame options table: {0}")]
    FrameOptions(#[from] serde_json::Error),
}
