//! `RegistryError` mirrors the conditional-write outcomes of SPEC_FULL.md
//! §4.2 at the type level, and converts into the shared [`PipelineError`]
//! taxonomy at the crate boundary (§10.2).

use lecture_core::errors::{ErrorKind, PipelineError};
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error, Clone)]
pub enum RegistryError {
    /// `createJobIfAbsent` / `createVideoRequest` found an existing row.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// `getJob` (or any operation requiring a present job) found none.
    #[error("not found: {0}")]
    NotFound(String),

    /// `addScheduledJob` would push `|scheduledJobs|` past `permittedGenerations`.
    #[error("quota exceeded for user {user}: {scheduled}/{limit}")]
    QuotaExceeded {
        user: String,
        scheduled: u32,
        limit: u32,
    },

    #[error("internal registry error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RegistryError::AlreadyExists(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, RegistryError::QuotaExceeded { .. })
    }
}

impl From<RegistryError> for PipelineError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyExists(msg) => PipelineError::already_exists(msg),
            RegistryError::NotFound(msg) => PipelineError::not_found(msg),
            RegistryError::QuotaExceeded { user, scheduled, limit } => PipelineError::new(
                ErrorKind::QuotaExceeded,
                format!("user {user} has {scheduled} scheduled jobs against a limit of {limit}"),
            ),
            RegistryError::Internal(msg) => PipelineError::general_error(msg),
        }
    }
}
