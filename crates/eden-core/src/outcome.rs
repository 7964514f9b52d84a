//! Terminal outcomes of a monitor run.

use std::fmt;

/// How a monitor run ended.
///
/// Every run ends in exactly one of these; fatal errors are outcomes, not
/// panics, so callers can report them and decide on an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalOutcome {
    /// The creation finished and its final media was delivered.
    Completed,
    /// The gateway reported the task as failed.
    Failed,
    /// The gateway has no record of the task id.
    UnknownTask,
    /// A poll or submission request failed, or a snapshot was malformed.
    ServerError,
    /// The configured maximum run duration elapsed before a terminal status.
    TimedOut,
    /// The caller cancelled the run.
    Cancelled,
}

impl TerminalOutcome {
    /// True only for a successful completion.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::UnknownTask => "unknown task",
            Self::ServerError => "server error",
            Self::TimedOut => "timed out",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}
