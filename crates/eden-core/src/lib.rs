//! Eden Bridge Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Subprocesses
//! - Runtime specifics
//!
//! All types here represent the core business domain of the Eden bridge:
//! creation tasks, polled job snapshots, generator kinds, and media assets.

pub mod asset;
pub mod generator;
pub mod ids;
pub mod outcome;
pub mod snapshot;
pub mod task;

// Re-export commonly used types
pub use asset::{MediaAsset, MediaKind};
pub use generator::{
    EdenClipXSettings, GeneratorConfig, GeneratorKind, OracleSettings, SourceContext,
    StableDiffusionSettings,
};
pub use ids::{ContentId, TaskId};
pub use outcome::TerminalOutcome;
pub use snapshot::{FinalContent, JobSnapshot, MediaCandidate};
pub use task::TaskReceipt;
