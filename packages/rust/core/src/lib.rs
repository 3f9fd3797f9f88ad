//! Editor session and publish pipeline for folio.
//!
//! This crate ties the document model, content encoding, artifact generation,
//! storage and version control together into the two user-triggered
//! workflows: `save` (local persist) and `push` (remote publish).

pub mod pipeline;
pub mod push;
pub mod save;
pub mod session;

pub use pipeline::{
    PipelineReport, ProgressReporter, Severity, SilentProgress, StepRecord, StepStatus,
};
pub use push::{AcceptDefaultIdentity, IdentityPrompt, commit_message, push};
pub use save::{GiscusSettings, SaveInput, SaveReport, save};
pub use session::{EditSession, Unreadable};
