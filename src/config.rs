// Options for whole-tag parsing

/// Options to control how a tag is parsed
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParseOptions {
    pub(crate) unsynchronisation: bool,
    pub(crate) max_frames: Option<usize>,
}

impl Default for ParseOptions {
    /// Unsynchronisation is honoured and every frame is read
    fn default() -> Self {
        Self::new()
    }
}

impl ParseOptions {
    pub const fn new() -> Self {
        Self {
            unsynchronisation: true,
            max_frames: None,
        }
    }

    /// Whether to undo unsynchronisation when the tag or a frame is flagged
    ///
    /// With this off, payloads are returned exactly as stored.
    pub fn unsynchronisation(&mut self, unsynchronisation: bool) -> Self {
        self.unsynchronisation = unsynchronisation;
        *self
    }

    /// Stop after reading this many frames
    pub fn max_frames(&mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        *self
    }
}
