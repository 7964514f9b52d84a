//! Monitor configuration.

use std::time::Duration;

/// Configuration for a [`crate::ProgressMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between polls. Must be positive.
    pub poll_interval: Duration,

    /// Convert a video result to a looping GIF instead of attaching the
    /// raw clip.
    pub animated_variant: bool,

    /// Upper bound on the total run duration. `None` polls until a
    /// terminal status arrives, however long that takes.
    pub max_run_duration: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            animated_variant: false,
            max_run_duration: None,
        }
    }
}

impl MonitorConfig {
    /// Builder method to set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builder method to enable the animated variant for video results.
    pub fn with_animated_variant(mut self, enabled: bool) -> Self {
        self.animated_variant = enabled;
        self
    }

    /// Builder method to bound the total run duration.
    pub fn with_max_run_duration(mut self, max: Duration) -> Self {
        self.max_run_duration = Some(max);
        self
    }
}
