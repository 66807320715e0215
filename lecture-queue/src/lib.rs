//! # lecture-queue
//!
//! Priority job queue for the pipeline's stage handlers (notes, summary,
//! video). Lease-based dequeue with an expiry reaper, cancel-wins
//! acknowledgement, and tenant-scoped idempotency so a retried admission
//! request never double-enqueues a stage.
//!
//! ## Quick start
//!
//! ```rust
//! use lecture_queue::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct NotesJob {
//!     entry_id: String,
//! }
//!
//! #[async_trait::async_trait]
//! impl Job for NotesJob {
//!     type Context = ();
//!     type Result = ();
//!     type Error = anyhow::Error;
//!
//!     async fn execute(&self, _ctx: Self::Context) -> Result<Self::Result, Self::Error> {
//!         Ok(())
//!     }
//!
//!     const JOB_TYPE: &'static str = "notes";
//!     const PRIORITY: JobPriority = JobPriority::Default;
//! }
//! ```

pub mod types;
pub mod error;
pub mod codec;
pub mod job;
pub mod backend;
pub mod adapter;
pub mod observability;

// Core API exports
pub use adapter::QueueAdapter;
pub use types::{
    JobId, LeaseToken, QueueCtx, JobPriority, JobStatus, JobMessage, JobRecord,
    LeasedJob, QueueCapabilities, JobEvent, TaskState
};
pub use error::{QueueError, QueueResult, JobError};
pub use codec::{JobCodec, CodecRegistry};
pub use codec::json::JsonCodec;
pub use job::{Job, JobRegistry};
pub use backend::QueueBackend;
pub use adapter::{WorkerHandle, QueueConfig};

// Observability exports
pub use observability::{ObservabilityLayer, LiveMetrics, MetricsCollector};

/// Prelude for job definitions and worker setup.
pub mod prelude {
    pub use crate::{
        QueueAdapter, Job, QueueBackend
    };

    pub use crate::{
        QueueCtx, JobId, JobPriority, JobStatus, JobError, QueueResult
    };

    pub use crate::{
        JobCodec, JsonCodec, CodecRegistry
    };

    pub use crate::JobRegistry;

    pub use crate::{ObservabilityLayer, LiveMetrics};

    pub use async_trait::async_trait;
}
