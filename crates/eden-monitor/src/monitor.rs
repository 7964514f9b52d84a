//! The progress-polling loop.
//!
//! One [`ProgressMonitor::run`] call owns one creation task: it polls the
//! gateway on a fixed interval, pushes the status line every cycle, and
//! fetches/attaches media only when the content identity differs from the
//! last one it rendered. The loop is strictly sequential - one outstanding
//! poll at a time - so updates reach the chat surface in snapshot order.

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use eden_core::{ContentId, MediaCandidate, MediaKind, TaskId, TerminalOutcome};

use crate::config::MonitorConfig;
use crate::error::PollError;
use crate::ports::{ContentFetcher, MessageRef, MessageSink, StatusSource, Transcoder};

/// Status line pushed while a video result is being converted to a GIF.
const MAKING_GIF_TEXT: &str = "Creation is finished. Making GIF...";

/// Why a media update could not be delivered this cycle. Recoverable: the
/// note lands on the message and the loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaFailure {
    /// The content-store download failed.
    Fetch,
    /// Transcoding or attaching the asset failed.
    Attach,
}

impl MediaFailure {
    fn note(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch failed",
            Self::Attach => "GIF attachment failed... :(",
        }
    }
}

/// Watches one creation task and mirrors its progress onto one message.
///
/// Each instance owns its run state exclusively; nothing is shared between
/// monitors, so any number of them can run concurrently for different
/// tasks without coordination.
pub struct ProgressMonitor {
    status: Arc<dyn StatusSource>,
    fetcher: Arc<dyn ContentFetcher>,
    transcoder: Arc<dyn Transcoder>,
    sink: Arc<dyn MessageSink>,
    config: MonitorConfig,
}

impl ProgressMonitor {
    /// Create a monitor over the four collaborators.
    pub fn new(
        status: Arc<dyn StatusSource>,
        fetcher: Arc<dyn ContentFetcher>,
        transcoder: Arc<dyn Transcoder>,
        sink: Arc<dyn MessageSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            status,
            fetcher,
            transcoder,
            sink,
            config,
        }
    }

    /// Poll the task until it reaches a terminal state.
    ///
    /// `task_id` must come from a successful submission and
    /// `config.poll_interval` must be positive. Cancellation is observed
    /// at the top of each cycle and during the inter-cycle sleep; a
    /// cancelled run pushes nothing further.
    pub async fn run(
        &self,
        task_id: &TaskId,
        message: &MessageRef,
        cancel: CancellationToken,
    ) -> TerminalOutcome {
        info!(task_id = %task_id, message = %message, "Starting progress monitor");

        let started = Instant::now();
        let mut last_rendered: Option<ContentId> = None;

        let outcome = loop {
            if cancel.is_cancelled() {
                break TerminalOutcome::Cancelled;
            }

            if let Some(max) = self.config.max_run_duration {
                if started.elapsed() >= max {
                    self.push_final_text(message, "Server error: timed out waiting for creation")
                        .await;
                    break TerminalOutcome::TimedOut;
                }
            }

            let snapshot = match self.status.poll(task_id).await {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => {
                    self.push_final_text(message, "Server error: task ID not found")
                        .await;
                    break TerminalOutcome::UnknownTask;
                }
                Err(PollError::Malformed(detail)) => {
                    warn!(task_id = %task_id, detail = %detail, "Malformed status record");
                    self.push_final_text(message, "Server error: malformed status")
                        .await;
                    break TerminalOutcome::ServerError;
                }
                Err(PollError::Request(cause)) => {
                    self.push_final_text(message, &format!("Server error: {}", cause))
                        .await;
                    break TerminalOutcome::ServerError;
                }
            };

            debug!(task_id = %task_id, snapshot = ?snapshot, "Polled snapshot");

            // The status line is idempotent and cheap, so it is pushed every
            // cycle; media is the dedup-guarded part.
            if let Err(e) = self.sink.set_text(message, &snapshot.status_line()).await {
                error!(task_id = %task_id, error = %e, "Chat surface rejected status update");
                break TerminalOutcome::ServerError;
            }

            if let Some(candidate) = snapshot.media_candidate() {
                if last_rendered.as_ref() != Some(&candidate.id) {
                    match self.render_media(message, &candidate).await {
                        Ok(()) => last_rendered = Some(candidate.id),
                        Err(failure) => {
                            // A single bad media update must not kill an
                            // otherwise-healthy job; the id stays
                            // unrendered so the next cycle retries it.
                            warn!(
                                task_id = %task_id,
                                content = %candidate.id,
                                note = failure.note(),
                                "Media update failed; continuing"
                            );
                            if let Err(e) = self.sink.set_text(message, failure.note()).await {
                                error!(task_id = %task_id, error = %e, "Chat surface rejected failure note");
                                break TerminalOutcome::ServerError;
                            }
                        }
                    }
                }
            }

            if snapshot.is_terminal() {
                break if matches!(snapshot, eden_core::JobSnapshot::Failed) {
                    TerminalOutcome::Failed
                } else {
                    TerminalOutcome::Completed
                };
            }

            tokio::select! {
                _ = cancel.cancelled() => break TerminalOutcome::Cancelled,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        };

        info!(task_id = %task_id, outcome = %outcome, "Monitor run finished");
        outcome
    }

    /// Fetch, optionally transcode, and attach the candidate media.
    async fn render_media(
        &self,
        message: &MessageRef,
        candidate: &MediaCandidate,
    ) -> Result<(), MediaFailure> {
        let animated = candidate.kind == MediaKind::Video && self.config.animated_variant;

        if animated {
            // Transitional line while the conversion runs.
            self.sink
                .set_text(message, MAKING_GIF_TEXT)
                .await
                .map_err(|_| MediaFailure::Attach)?;
        }

        let asset = self
            .fetcher
            .fetch(&candidate.id, candidate.kind)
            .await
            .map_err(|e| {
                warn!(content = %candidate.id, error = %e, "Content fetch failed");
                MediaFailure::Fetch
            })?;

        let asset = if animated {
            let gif = self.transcoder.to_animated(&asset).await.map_err(|e| {
                warn!(content = %candidate.id, error = %e, "Transcode failed");
                MediaFailure::Attach
            })?;
            // Clear the transitional line before attaching.
            self.sink
                .set_text(message, "")
                .await
                .map_err(|_| MediaFailure::Attach)?;
            gif
        } else {
            asset
        };

        self.sink
            .set_media(message, &asset)
            .await
            .map_err(|e| {
                warn!(content = %candidate.id, error = %e, "Media attach failed");
                MediaFailure::Attach
            })
    }

    /// Push the last line of a terminating run; the run ends either way.
    async fn push_final_text(&self, message: &MessageRef, text: &str) {
        if let Err(e) = self.sink.set_text(message, text).await {
            warn!(message = %message, error = %e, "Could not deliver final status line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, PollError, SinkError, TranscodeError};
    use async_trait::async_trait;
    use eden_core::{FinalContent, JobSnapshot, MediaAsset};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum SinkEvent {
        Text(String),
        Media(String),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<SinkEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<SinkEvent> {
            self.events.lock().unwrap().clone()
        }

        fn media_pushes(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    SinkEvent::Media(name) => Some(name),
                    SinkEvent::Text(_) => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn set_text(&self, _message: &MessageRef, text: &str) -> Result<(), SinkError> {
            self.events
                .lock()
                .unwrap()
                .push(SinkEvent::Text(text.to_string()));
            Ok(())
        }

        async fn set_media(&self, _message: &MessageRef, asset: &MediaAsset) -> Result<(), SinkError> {
            self.events
                .lock()
                .unwrap()
                .push(SinkEvent::Media(asset.file_name.clone()));
            Ok(())
        }
    }

    /// One scripted poll response.
    #[derive(Debug, Clone)]
    enum Step {
        Snapshot(Option<JobSnapshot>),
        RequestError(String),
        Malformed(String),
    }

    /// Serves a scripted snapshot sequence; repeats the last step when the
    /// script runs out so non-terminating sequences can be expressed.
    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
        last: Mutex<Option<Step>>,
        polls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                last: Mutex::new(None),
                polls: AtomicUsize::new(0),
            }
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn poll(&self, _task: &TaskId) -> Result<Option<JobSnapshot>, PollError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let step = match self.steps.lock().unwrap().pop_front() {
                Some(step) => {
                    *self.last.lock().unwrap() = Some(step.clone());
                    step
                }
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .expect("scripted source polled with empty script"),
            };
            match step {
                Step::Snapshot(snapshot) => Ok(snapshot),
                Step::RequestError(cause) => Err(PollError::Request(cause)),
                Step::Malformed(detail) => Err(PollError::Malformed(detail)),
            }
        }
    }

    #[derive(Default)]
    struct StubFetcher {
        fail_ids: Vec<ContentId>,
        fetched: Mutex<Vec<(ContentId, MediaKind)>>,
    }

    impl StubFetcher {
        fn failing_for(ids: Vec<ContentId>) -> Self {
            Self {
                fail_ids: ids,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<(ContentId, MediaKind)> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentFetcher for StubFetcher {
        async fn fetch(&self, id: &ContentId, kind: MediaKind) -> Result<MediaAsset, FetchError> {
            self.fetched.lock().unwrap().push((id.clone(), kind));
            if self.fail_ids.contains(id) {
                return Err(FetchError(format!("404 for {}", id)));
            }
            let file_name = match kind {
                MediaKind::Video => format!("{}.mp4", id),
                _ => format!("{}.png", id),
            };
            Ok(MediaAsset::new(file_name, vec![0xAB, 0xCD], kind))
        }
    }

    #[derive(Default)]
    struct StubTranscoder {
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubTranscoder {
        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transcoder for StubTranscoder {
        async fn to_animated(&self, video: &MediaAsset) -> Result<MediaAsset, TranscodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TranscodeError("ffmpeg exited with code 1".to_string()));
            }
            let file_name = video.file_name.replace(".mp4", ".gif");
            Ok(MediaAsset::new(file_name, vec![0x47], MediaKind::Animated))
        }
    }

    struct Harness {
        source: Arc<ScriptedSource>,
        fetcher: Arc<StubFetcher>,
        transcoder: Arc<StubTranscoder>,
        sink: Arc<RecordingSink>,
        monitor: Arc<ProgressMonitor>,
    }

    fn harness(steps: Vec<Step>, config: MonitorConfig) -> Harness {
        harness_with(
            steps,
            config,
            StubFetcher::default(),
            StubTranscoder::default(),
        )
    }

    fn harness_with(
        steps: Vec<Step>,
        config: MonitorConfig,
        fetcher: StubFetcher,
        transcoder: StubTranscoder,
    ) -> Harness {
        let source = Arc::new(ScriptedSource::new(steps));
        let fetcher = Arc::new(fetcher);
        let transcoder = Arc::new(transcoder);
        let sink = Arc::new(RecordingSink::default());
        let monitor = Arc::new(ProgressMonitor::new(
            source.clone(),
            fetcher.clone(),
            transcoder.clone(),
            sink.clone(),
            config,
        ));
        Harness {
            source,
            fetcher,
            transcoder,
            sink,
            monitor,
        }
    }

    fn running(percent: u8, preview: Option<&str>) -> Step {
        Step::Snapshot(Some(JobSnapshot::Running {
            percent,
            preview: preview.map(ContentId::new),
        }))
    }

    fn complete_still(id: &str) -> Step {
        Step::Snapshot(Some(JobSnapshot::Complete {
            result: FinalContent::Still(ContentId::new(id)),
        }))
    }

    fn complete_video(id: &str) -> Step {
        Step::Snapshot(Some(JobSnapshot::Complete {
            result: FinalContent::Video(ContentId::new(id)),
        }))
    }

    async fn run(h: &Harness) -> TerminalOutcome {
        h.monitor
            .run(
                &TaskId::new("task-1"),
                &MessageRef::new("msg-1"),
                CancellationToken::new(),
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_image() {
        let h = harness(
            vec![
                Step::Snapshot(Some(JobSnapshot::Pending { preview: None })),
                running(10, None),
                running(60, None),
                complete_still("abc"),
            ],
            MonitorConfig::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert_eq!(h.source.polls(), 4);
        assert_eq!(
            h.sink.events(),
            vec![
                SinkEvent::Text("Creation is pending".to_string()),
                SinkEvent::Text("Creation is 10% complete".to_string()),
                SinkEvent::Text("Creation is 60% complete".to_string()),
                SinkEvent::Text(String::new()),
                SinkEvent::Media("abc.png".to_string()),
            ]
        );
        assert_eq!(
            h.fetcher.fetched(),
            vec![(ContentId::new("abc"), MediaKind::Still)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_video_with_gif() {
        let h = harness(
            vec![complete_video("v1")],
            MonitorConfig::default().with_animated_variant(true),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert_eq!(h.transcoder.calls(), 1);
        assert_eq!(
            h.fetcher.fetched(),
            vec![(ContentId::new("v1"), MediaKind::Video)]
        );
        assert_eq!(
            h.sink.events(),
            vec![
                SinkEvent::Text(String::new()),
                SinkEvent::Text(MAKING_GIF_TEXT.to_string()),
                SinkEvent::Text(String::new()),
                SinkEvent::Media("v1.gif".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_without_gif_attaches_raw_clip() {
        let h = harness(vec![complete_video("v1")], MonitorConfig::default());

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert_eq!(h.transcoder.calls(), 0);
        assert_eq!(h.sink.media_pushes(), vec!["v1.mp4".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_identity_fetched_once() {
        let h = harness(
            vec![
                running(10, Some("p1")),
                running(20, Some("p1")),
                running(55, Some("p2")),
                complete_still("s9"),
            ],
            MonitorConfig::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        // p1 appears twice in the script but is fetched exactly once.
        assert_eq!(
            h.fetcher.fetched(),
            vec![
                (ContentId::new("p1"), MediaKind::Still),
                (ContentId::new("p2"), MediaKind::Still),
                (ContentId::new("s9"), MediaKind::Still),
            ]
        );
        assert_eq!(
            h.sink.media_pushes(),
            vec!["p1.png", "p2.png", "s9.png"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_identity_matching_preview_not_refetched() {
        let h = harness(
            vec![running(90, Some("p7")), complete_still("p7")],
            MonitorConfig::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert_eq!(h.fetcher.fetched().len(), 1);
        assert_eq!(h.sink.media_pushes(), vec!["p7.png".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_task_terminates_without_media_activity() {
        let h = harness(vec![Step::Snapshot(None)], MonitorConfig::default());

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::UnknownTask);
        assert_eq!(h.source.polls(), 1);
        assert!(h.fetcher.fetched().is_empty());
        assert_eq!(
            h.sink.events(),
            vec![SinkEvent::Text("Server error: task ID not found".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_is_fatal_for_the_run() {
        let h = harness(
            vec![
                Step::Snapshot(Some(JobSnapshot::Pending { preview: None })),
                Step::RequestError("internal server error".to_string()),
            ],
            MonitorConfig::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::ServerError);
        assert_eq!(h.source.polls(), 2);
        assert_eq!(
            h.sink.events().last(),
            Some(&SinkEvent::Text(
                "Server error: internal server error".to_string()
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_snapshot_is_fatal() {
        let h = harness(
            vec![Step::Malformed("running record without status_code".to_string())],
            MonitorConfig::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::ServerError);
        assert_eq!(
            h.sink.events(),
            vec![SinkEvent::Text("Server error: malformed status".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_reports_and_stops() {
        let h = harness(
            vec![Step::Snapshot(Some(JobSnapshot::Failed))],
            MonitorConfig::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Failed);
        assert_eq!(h.source.polls(), 1);
        assert_eq!(
            h.sink.events(),
            vec![SinkEvent::Text("Server error: Eden task failed".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_degrades_cycle_but_run_survives() {
        let h = harness_with(
            vec![running(10, Some("p1")), complete_still("s1")],
            MonitorConfig::default(),
            StubFetcher::failing_for(vec![ContentId::new("p1")]),
            StubTranscoder::default(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert_eq!(
            h.sink.events(),
            vec![
                SinkEvent::Text("Creation is 10% complete".to_string()),
                SinkEvent::Text("fetch failed".to_string()),
                SinkEvent::Text(String::new()),
                SinkEvent::Media("s1.png".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcode_failure_notes_and_finishes() {
        let h = harness_with(
            vec![complete_video("v1")],
            MonitorConfig::default().with_animated_variant(true),
            StubFetcher::default(),
            StubTranscoder::failing(),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert!(h.sink.media_pushes().is_empty());
        assert_eq!(
            h.sink.events().last(),
            Some(&SinkEvent::Text("GIF attachment failed... :(".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_snapshot_stops_polling() {
        // Repeat-last would happily serve more Complete snapshots; the
        // loop must not come back for them.
        let h = harness(vec![complete_still("abc")], MonitorConfig::default());

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::Completed);
        assert_eq!(h.source.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_the_run() {
        let h = harness(
            vec![running(50, None)],
            MonitorConfig::default()
                .with_poll_interval(Duration::from_secs(2))
                .with_max_run_duration(Duration::from_secs(5)),
        );

        let outcome = run(&h).await;

        assert_eq!(outcome, TerminalOutcome::TimedOut);
        assert_eq!(h.source.polls(), 3);
        assert_eq!(
            h.sink.events().last(),
            Some(&SinkEvent::Text(
                "Server error: timed out waiting for creation".to_string()
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_cancelled_run_pushes_nothing() {
        let h = harness(vec![running(10, None)], MonitorConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = h
            .monitor
            .run(&TaskId::new("task-1"), &MessageRef::new("msg-1"), cancel)
            .await;

        assert_eq!(outcome, TerminalOutcome::Cancelled);
        assert_eq!(h.source.polls(), 0);
        assert!(h.sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_during_sleep() {
        let h = harness(
            vec![running(10, None)],
            MonitorConfig::default().with_poll_interval(Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();

        let monitor = h.monitor.clone();
        let child = cancel.clone();
        let handle = tokio::spawn(async move {
            monitor
                .run(&TaskId::new("task-1"), &MessageRef::new("msg-1"), child)
                .await
        });

        // Let the first cycle land, then cancel mid-sleep.
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        let outcome = handle.await.expect("monitor task panicked");

        assert_eq!(outcome, TerminalOutcome::Cancelled);
        assert_eq!(h.source.polls(), 1);
        assert_eq!(
            h.sink.events(),
            vec![SinkEvent::Text("Creation is 10% complete".to_string())]
        );
    }
}
