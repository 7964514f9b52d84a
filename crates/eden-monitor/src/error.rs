//! Error types for the monitor's collaborator ports.

use thiserror::Error;

/// Errors from polling the gateway for a snapshot.
///
/// Both variants are fatal for the current run: the gateway does not get
/// retried, and the monitor leaves a final `Server error: ...` line on the
/// message instead.
#[derive(Debug, Error)]
pub enum PollError {
    /// The poll request itself failed (network error or non-2xx response).
    /// The message carries the decoded error body where one was available.
    #[error("poll request failed: {0}")]
    Request(String),

    /// The gateway answered with a record the generator kind cannot
    /// produce, or one missing a required field.
    #[error("malformed status record: {0}")]
    Malformed(String),
}

/// A content-store download failed. Recoverable: the monitor notes it on
/// the message and keeps polling.
#[derive(Debug, Error)]
#[error("content fetch failed: {0}")]
pub struct FetchError(pub String);

/// Video-to-GIF conversion failed. Recoverable: the monitor notes it on
/// the message and keeps polling.
#[derive(Debug, Error)]
#[error("transcode failed: {0}")]
pub struct TranscodeError(pub String);

/// The chat surface rejected an update. Fatal for the run: with the
/// message unreachable there is nothing left to report to.
#[derive(Debug, Error)]
#[error("message update failed: {0}")]
pub struct SinkError(pub String);
