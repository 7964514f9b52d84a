//! Error types for the gateway and content-store clients.

use thiserror::Error;

/// Errors from talking to the gateway or the content store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The submission request was rejected; carries the decoded error body.
    #[error("submission failed: {0}")]
    Submission(String),

    /// A poll request was rejected; carries the decoded error body.
    #[error("poll failed: {0}")]
    Poll(String),

    /// A content download was rejected.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The gateway answered with a record this generator kind cannot
    /// produce, or one missing a required field.
    #[error("malformed creation record: {0}")]
    Malformed(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
