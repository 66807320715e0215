//! lecture-core: framework-agnostic core shared by every crate in the pipeline.
//!
//! Config, the error taxonomy, the in-process event hub, and the
//! per-request identity type all live here so the rest of the pipeline can
//! stay free of cross-cutting plumbing.

pub mod config;
pub mod errors;
pub mod events;
pub mod pipeline_config;
pub mod tenant;

pub use config::{DogConfig, DogConfigSnapshot};
pub use errors::{ErrorKind, PipelineError, PipelineResult};
pub use events::{EventFut, EventHub, EventListener, ListenerId, TopicPattern};
pub use pipeline_config::PipelineConfig;
pub use tenant::{EntryContext, UserId, QUEUE_TENANT};
