//! Eden Bridge Progress Monitor
//!
//! The core of the bridge: a poll loop that watches one creation task and
//! mirrors its progress onto a single chat message. Each cycle polls the
//! gateway, pushes a status line, and - only when the content identity
//! changed - fetches and attaches new media. The gateway, content store,
//! transcoder, and chat surface are all consumed through the narrow traits
//! in [`ports`], so the loop itself has no network or platform code.

pub mod config;
pub mod error;
pub mod monitor;
pub mod ports;

// Re-export commonly used types
pub use config::MonitorConfig;
pub use error::{FetchError, PollError, SinkError, TranscodeError};
pub use monitor::ProgressMonitor;
pub use ports::{ContentFetcher, MessageRef, MessageSink, StatusSource, Transcoder};
