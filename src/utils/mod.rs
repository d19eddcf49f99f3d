// Byte-level helpers shared by the ID3 codec
pub mod encoding;
pub mod synchsafe;
pub mod unsynch;
