//! Notes/Summary/Video stage handlers (SPEC_FULL.md §4.6): each is a
//! [`lecture_queue::Job`] that fetches its inputs, calls out to an external
//! collaborator, publishes an artifact, and flips a registry flag. All three
//! share one [`StageContext`] so they can run off the same worker pool.

pub mod collaborators;
pub mod context;
pub mod error;
pub mod notes;
pub mod summary;
pub mod video;

pub use collaborators::{EmailSender, LlmClient, TranscriptFetcher};
pub use context::{StageContext, StageQueueAdapter};
pub use error::{StageError, StageResult};
pub use notes::NotesJob;
pub use summary::SummaryJob;
pub use video::VideoJob;
