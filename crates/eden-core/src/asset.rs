//! Media assets exchanged between the content store, the transcoder, and
//! the chat surface.

/// Kind of a media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// A still image.
    Still,
    /// A playable video clip.
    Video,
    /// A looping animated image derived from a video.
    Animated,
}

/// A downloaded (or transcoded) piece of media ready to attach to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    /// File name presented to the chat surface, e.g. `abc.png` or `v1.gif`.
    pub file_name: String,
    /// Raw bytes of the asset.
    pub bytes: Vec<u8>,
    /// What the bytes are.
    pub kind: MediaKind,
}

impl MediaAsset {
    /// Create a new media asset.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, kind: MediaKind) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            kind,
        }
    }
}
