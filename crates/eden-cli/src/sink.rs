//! Terminal message sink.
//!
//! Stands in for a chat platform: the status line goes to stdout and
//! received media lands in the output directory.

use std::path::PathBuf;

use async_trait::async_trait;

use eden_core::MediaAsset;
use eden_monitor::{MessageRef, MessageSink, SinkError};

/// Renders monitor updates onto the terminal.
pub struct TerminalSink {
    out_dir: PathBuf,
}

impl TerminalSink {
    /// Create a sink saving media under `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl MessageSink for TerminalSink {
    async fn set_text(&self, _message: &MessageRef, text: &str) -> Result<(), SinkError> {
        // An empty line is the monitor clearing the status; nothing to show.
        if !text.is_empty() {
            println!("{}", text);
        }
        Ok(())
    }

    async fn set_media(&self, _message: &MessageRef, asset: &MediaAsset) -> Result<(), SinkError> {
        let path = self.out_dir.join(&asset.file_name);
        tokio::fs::write(&path, &asset.bytes)
            .await
            .map_err(|e| SinkError(format!("writing {}: {}", path.display(), e)))?;
        println!("Saved {}", path.display());
        Ok(())
    }
}
