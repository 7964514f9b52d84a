//! HTTP client for the Eden gateway.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use eden_core::{GeneratorConfig, GeneratorKind, JobSnapshot, SourceContext, TaskId, TaskReceipt};
use eden_monitor::{PollError, StatusSource};

use crate::error::ClientError;
use crate::wire::CreationRecord;

/// Client for the gateway's creation endpoints.
///
/// Owns its `reqwest::Client`; cloning is cheap and shares the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    inner: reqwest::Client,
    base_url: String,
}

/// Body of a successful `POST /request_creation` response.
#[derive(Debug, serde::Deserialize)]
struct SubmissionResponse {
    task_id: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a creation request; returns the receipt to poll under.
    pub async fn submit(
        &self,
        source: &SourceContext,
        config: &GeneratorConfig,
    ) -> Result<TaskReceipt, ClientError> {
        let kind = config.kind();
        let url = format!("{}/request_creation", self.base_url);
        debug!(url = %url, generator = %kind, "Submitting creation request");

        let body = json!({
            "source": source,
            "generator_name": kind.wire_name(),
            "config": config,
        });

        let response = self.inner.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Submission(decode_error_body(response).await));
        }

        let submission: SubmissionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        Ok(TaskReceipt::new(TaskId::new(submission.task_id), kind))
    }

    /// Poll the current snapshot of a task.
    ///
    /// `Ok(None)` means the gateway has no record of the task id (it
    /// answers with an empty result list).
    pub async fn poll(
        &self,
        task: &TaskId,
        kind: GeneratorKind,
    ) -> Result<Option<JobSnapshot>, ClientError> {
        let url = format!("{}/get_creations", self.base_url);
        debug!(url = %url, task_id = %task, "Polling creation status");

        let body = json!({ "task": task.as_str() });

        let response = self.inner.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Poll(decode_error_body(response).await));
        }

        let mut records: Vec<CreationRecord> = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        if records.is_empty() {
            return Ok(None);
        }
        records.remove(0).into_snapshot(kind).map(Some)
    }

    /// A [`StatusSource`] polling this gateway under one generator kind.
    pub fn status_source(&self, kind: GeneratorKind) -> GatewayStatusSource {
        GatewayStatusSource {
            client: self.clone(),
            kind,
        }
    }
}

/// Decode an error response body for the user-visible failure line.
async fn decode_error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.is_empty() => body,
        _ => format!("HTTP {}", status),
    }
}

/// [`GatewayClient`] bound to one generator kind, usable as the monitor's
/// snapshot source.
#[derive(Debug, Clone)]
pub struct GatewayStatusSource {
    client: GatewayClient,
    kind: GeneratorKind,
}

#[async_trait]
impl StatusSource for GatewayStatusSource {
    async fn poll(&self, task: &TaskId) -> Result<Option<JobSnapshot>, PollError> {
        self.client
            .poll(task, self.kind)
            .await
            .map_err(poll_error)
    }
}

/// Map a client error onto the monitor's poll taxonomy.
fn poll_error(err: ClientError) -> PollError {
    match err {
        ClientError::Malformed(detail) => PollError::Malformed(detail),
        other => PollError::Request(other.to_string()),
    }
}
