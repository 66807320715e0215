//! `SchedulerError`: the admission-path failure modes from SPEC_FULL.md §4.7/§7.
//! `ValidationError`/`QuotaExceeded` surface to the HTTP layer as 400s;
//! `AlreadyExists`/`DuplicateTask` never reach this type at all — both are
//! swallowed as benign success at the call sites that can hit them.

use lecture_core::errors::{ErrorKind, PipelineError};
use lecture_queue::QueueError;
use lecture_registry::RegistryError;
use thiserror::Error;

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid {field}: {value}")]
    Validation { field: &'static str, value: String },

    #[error("quota exceeded for user {user}: {scheduled}/{limit}")]
    QuotaExceeded { user: String, scheduled: u32, limit: u32 },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl From<SchedulerError> for PipelineError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Validation { field, value } => {
                PipelineError::bad_request(format!("invalid {field}: {value}"))
            }
            SchedulerError::QuotaExceeded { user, scheduled, limit } => PipelineError::new(
                ErrorKind::QuotaExceeded,
                format!("user {user} has {scheduled} scheduled jobs against a limit of {limit}"),
            ),
            SchedulerError::Registry(err) => err.into(),
            SchedulerError::Queue(err) => PipelineError::general_error(err.to_string()),
        }
    }
}
