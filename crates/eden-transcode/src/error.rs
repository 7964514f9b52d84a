//! Error types for the transcoder.

use thiserror::Error;

/// Errors from converting a video to its animated variant.
#[derive(Debug, Error)]
pub enum MediaError {
    /// ffmpeg ran but exited unsuccessfully.
    #[error("ffmpeg exited with code {code}: {stderr}")]
    Ffmpeg {
        /// Process exit code (-1 when killed by a signal).
        code: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// Spawning ffmpeg or touching the scratch directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
