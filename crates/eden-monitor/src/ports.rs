//! Collaborator ports.
//!
//! The monitor talks to everything outside itself through these traits:
//! the gateway ([`StatusSource`]), the content store ([`ContentFetcher`]),
//! the GIF converter ([`Transcoder`]), and the chat surface
//! ([`MessageSink`]). Production implementations live in `eden-client` and
//! `eden-transcode`; tests use in-memory fakes.

use async_trait::async_trait;
use std::fmt;

use eden_core::{ContentId, JobSnapshot, MediaAsset, MediaKind, TaskId};

use crate::error::{FetchError, PollError, SinkError, TranscodeError};

/// Opaque handle to the single chat message a run keeps updating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef(String);

impl MessageRef {
    /// Create a new message handle from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of point-in-time snapshots for a creation task.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Poll the current snapshot for a task.
    ///
    /// `Ok(None)` means the gateway has no record of the task id.
    async fn poll(&self, task: &TaskId) -> Result<Option<JobSnapshot>, PollError>;
}

/// Retrieves media bytes by content identity.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Download the bytes behind a content identity.
    ///
    /// `kind` selects the locator: videos live under `<id>.mp4`, stills
    /// under the bare `<id>`.
    async fn fetch(&self, id: &ContentId, kind: MediaKind) -> Result<MediaAsset, FetchError>;
}

/// Converts a video asset into a shareable looping image.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Produce the animated variant of a video asset.
    async fn to_animated(&self, video: &MediaAsset) -> Result<MediaAsset, TranscodeError>;
}

/// Renders onto the single persistent chat message.
///
/// Both operations are idempotent full replacements: `set_text` replaces
/// the message's text segment, `set_media` replaces its attachment. There
/// are no append semantics.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Replace the message's text segment.
    async fn set_text(&self, message: &MessageRef, text: &str) -> Result<(), SinkError>;

    /// Replace the message's attached media.
    async fn set_media(&self, message: &MessageRef, asset: &MediaAsset) -> Result<(), SinkError>;
}
