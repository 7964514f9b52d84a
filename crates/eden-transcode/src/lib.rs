//! Video-to-GIF conversion for Eden creations.
//!
//! Wraps an `ffmpeg` subprocess behind the monitor's `Transcoder` port.
//! All on-disk intermediates live in a scoped temporary directory that is
//! removed on every exit path - success, failure, or cancellation.

pub mod error;
pub mod transcode;

pub use error::MediaError;
pub use transcode::FfmpegTranscoder;
