//! Submission receipts.

use crate::generator::GeneratorKind;
use crate::ids::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the gateway hands back for an accepted creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReceipt {
    /// The id to poll the task under.
    pub task_id: TaskId,

    /// Which generator the task was submitted to.
    pub generator: GeneratorKind,

    /// When the submission was accepted.
    pub created_at: DateTime<Utc>,
}

impl TaskReceipt {
    /// Create a receipt for a task accepted now.
    pub fn new(task_id: TaskId, generator: GeneratorKind) -> Self {
        Self {
            task_id,
            generator,
            created_at: Utc::now(),
        }
    }
}
