//! Polled job snapshots.
//!
//! A [`JobSnapshot`] is one point-in-time observation of a creation task.
//! It is a tagged union over the gateway's status values so that progress
//! and content fields only exist in the variants where they are valid -
//! a `Running` snapshot always has a percent, a `Queued` snapshot always
//! has a queue position, and only `Complete` carries a final result.

use crate::asset::MediaKind;
use crate::ids::ContentId;
use serde::{Deserialize, Serialize};

/// One polled observation of a creation task.
///
/// An unknown task id is not a snapshot; the gateway reports it as an
/// empty result, surfaced to callers as `Option<JobSnapshot>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobSnapshot {
    /// Waiting, no queue position known yet.
    Pending {
        /// Latest intermediate preview, if the generator has produced one.
        preview: Option<ContentId>,
    },
    /// Waiting, with a known position in the queue.
    Queued {
        /// Position in the queue (1 = next).
        position: u32,
        /// Latest intermediate preview, if the generator has produced one.
        preview: Option<ContentId>,
    },
    /// Actively computing.
    Running {
        /// Percent complete, 0-100.
        percent: u8,
        /// Latest intermediate preview, if the generator has produced one.
        preview: Option<ContentId>,
    },
    /// Finished successfully with a final result.
    Complete {
        /// The finished media.
        result: FinalContent,
    },
    /// Finished unsuccessfully.
    Failed,
}

/// The final media of a completed creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalContent {
    /// A still image.
    Still(ContentId),
    /// A video clip.
    Video(ContentId),
}

impl FinalContent {
    /// The content identity of the final media.
    pub fn content_id(&self) -> &ContentId {
        match self {
            Self::Still(id) | Self::Video(id) => id,
        }
    }

    /// Whether the final media is a video.
    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }
}

/// The media the monitor should consider showing for a snapshot: the final
/// result when complete, otherwise the latest intermediate preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    /// Content identity used for change detection.
    pub id: ContentId,
    /// Kind of the underlying bytes in the content store.
    pub kind: MediaKind,
}

impl JobSnapshot {
    /// Check if the snapshot is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed)
    }

    /// The latest intermediate preview, if any.
    pub fn preview(&self) -> Option<&ContentId> {
        match self {
            Self::Pending { preview }
            | Self::Queued { preview, .. }
            | Self::Running { preview, .. } => preview.as_ref(),
            Self::Complete { .. } | Self::Failed => None,
        }
    }

    /// The media this snapshot offers for display, if any.
    ///
    /// Complete snapshots offer their final result; in-flight snapshots
    /// offer their latest preview (always a still). Failed snapshots offer
    /// nothing.
    pub fn media_candidate(&self) -> Option<MediaCandidate> {
        match self {
            Self::Complete { result } => Some(MediaCandidate {
                id: result.content_id().clone(),
                kind: if result.is_video() {
                    MediaKind::Video
                } else {
                    MediaKind::Still
                },
            }),
            _ => self.preview().map(|id| MediaCandidate {
                id: id.clone(),
                kind: MediaKind::Still,
            }),
        }
    }

    /// The status line shown on the chat surface for this snapshot.
    ///
    /// Pure formatting, no side effects. A complete snapshot clears the
    /// line - the attached media carries the result.
    pub fn status_line(&self) -> String {
        match self {
            Self::Failed => "Server error: Eden task failed".to_string(),
            Self::Pending { .. } => "Creation is pending".to_string(),
            Self::Queued { position, .. } => format!("Creation is #{} in queue", position),
            Self::Running { percent, .. } => format!("Creation is {}% complete", percent),
            Self::Complete { .. } => String::new(),
        }
    }
}
