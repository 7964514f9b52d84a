//! Gateway wire format.
//!
//! The gateway reports creations as loosely-typed JSON records. This
//! module deserializes them and performs the checked conversion into the
//! strongly-typed [`JobSnapshot`], using the generator kind to decide
//! which fields are legitimate. Anything the kind cannot produce, or a
//! required field that is missing, is a malformation - never a guess.

use serde::Deserialize;

use eden_core::{ContentId, FinalContent, GeneratorKind, JobSnapshot};

use crate::error::ClientError;

/// One creation record as returned by `POST /get_creations`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreationRecord {
    /// Status name: `pending`, `queued`, `running`, `complete`, `failed`.
    pub status: String,

    /// Queue position for `queued`, percent complete for `running`.
    #[serde(default)]
    pub status_code: Option<i64>,

    /// Final still identity, present on `complete`.
    #[serde(default)]
    pub sha: Option<String>,

    /// Final video identity, present on `complete` for video results.
    #[serde(default)]
    pub video_sha: Option<String>,

    /// Intermediate preview identities, newest last.
    #[serde(default)]
    pub intermediate_sha: Vec<String>,
}

impl CreationRecord {
    /// Convert the record into a snapshot under a generator kind's rules.
    pub(crate) fn into_snapshot(self, kind: GeneratorKind) -> Result<JobSnapshot, ClientError> {
        let preview = self.preview_for(kind)?;

        match self.status.as_str() {
            "pending" => Ok(JobSnapshot::Pending { preview }),
            "queued" => {
                let position = match self.status_code {
                    Some(code) if code >= 0 => code as u32,
                    _ => {
                        return Err(ClientError::Malformed(
                            "queued record without a queue position".to_string(),
                        ))
                    }
                };
                Ok(JobSnapshot::Queued { position, preview })
            }
            "running" => {
                let percent = match self.status_code {
                    Some(code) if (0..=100).contains(&code) => code as u8,
                    _ => {
                        return Err(ClientError::Malformed(
                            "running record without a percent in 0-100".to_string(),
                        ))
                    }
                };
                Ok(JobSnapshot::Running { percent, preview })
            }
            "complete" => {
                if let Some(video) = self.video_sha {
                    if !kind.may_produce_video() {
                        return Err(ClientError::Malformed(format!(
                            "video result from generator {}",
                            kind
                        )));
                    }
                    return Ok(JobSnapshot::Complete {
                        result: FinalContent::Video(ContentId::new(video)),
                    });
                }
                match self.sha {
                    Some(sha) => Ok(JobSnapshot::Complete {
                        result: FinalContent::Still(ContentId::new(sha)),
                    }),
                    None => Err(ClientError::Malformed(
                        "complete record without a result identity".to_string(),
                    )),
                }
            }
            "failed" => Ok(JobSnapshot::Failed),
            other => Err(ClientError::Malformed(format!("unknown status '{}'", other))),
        }
    }

    /// The newest intermediate preview, validated against the kind.
    fn preview_for(&self, kind: GeneratorKind) -> Result<Option<ContentId>, ClientError> {
        if self.intermediate_sha.is_empty() {
            return Ok(None);
        }
        if !kind.reports_previews() {
            return Err(ClientError::Malformed(format!(
                "intermediate previews from generator {}",
                kind
            )));
        }
        Ok(self.intermediate_sha.last().map(ContentId::new))
    }
}
