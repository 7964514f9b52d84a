//! ffmpeg-backed GIF conversion.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use eden_core::{MediaAsset, MediaKind};
use eden_monitor::{TranscodeError, Transcoder};

use crate::error::MediaError;

/// Converts MP4 assets to looping GIFs by shelling out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    /// Path to the ffmpeg executable; bare `ffmpeg` uses PATH lookup.
    ffmpeg_path: String,

    /// Output frame rate.
    fps: u32,

    /// Output width in pixels; height follows the aspect ratio.
    width: u32,

    /// Parent directory for scratch space. `None` uses the system temp dir.
    work_root: Option<PathBuf>,
}

impl FfmpegTranscoder {
    /// Create a transcoder using the given ffmpeg executable.
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            fps: 12,
            width: 480,
            work_root: None,
        }
    }

    /// Builder method to set the output frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Builder method to set the output width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Builder method to place scratch directories under `root`.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    /// The ffmpeg filtergraph for the configured rate and size.
    fn filter(&self) -> String {
        format!("fps={},scale={}:-1:flags=lanczos", self.fps, self.width)
    }

    /// Convert a video asset into a looping GIF.
    ///
    /// The MP4 bytes and the rendered GIF only ever exist on disk inside a
    /// scoped temporary directory, removed when this returns - on the error
    /// paths and when the future is dropped mid-conversion as well.
    pub async fn convert(&self, video: &MediaAsset) -> Result<MediaAsset, MediaError> {
        let dir = match &self.work_root {
            Some(root) => tempfile::Builder::new().prefix("eden-gif-").tempdir_in(root)?,
            None => tempfile::Builder::new().prefix("eden-gif-").tempdir()?,
        };

        let input = dir.path().join(&video.file_name);
        let output = input.with_extension("gif");
        tokio::fs::write(&input, &video.bytes).await?;

        info!(input = %input.display(), "Converting video to GIF");

        let result = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(&input)
            .arg("-vf")
            .arg(self.filter())
            .arg("-loop")
            .arg("0")
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            return Err(MediaError::Ffmpeg {
                code: result.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let bytes = tokio::fs::read(&output).await?;
        debug!(bytes = bytes.len(), "GIF rendered");

        Ok(MediaAsset::new(
            gif_file_name(&video.file_name),
            bytes,
            MediaKind::Animated,
        ))
    }
}

/// The GIF file name for a video file name, e.g. `v1.mp4` -> `v1.gif`.
fn gif_file_name(video_name: &str) -> String {
    Path::new(video_name)
        .with_extension("gif")
        .to_string_lossy()
        .into_owned()
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn to_animated(&self, video: &MediaAsset) -> Result<MediaAsset, TranscodeError> {
        self.convert(video)
            .await
            .map_err(|e| TranscodeError(e.to_string()))
    }
}
