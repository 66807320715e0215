//! `StageError` mirrors SPEC_FULL.md §7's `StageFailed`/`Transient` split at
//! the type level: a handler surfaces one of these, and the queue runtime
//! (not the handler) decides retry vs archive from the task's retry cap.

use lecture_artifacts::ArtifactError;
use lecture_core::errors::{ErrorKind, PipelineError};
use lecture_queue::JobError;
use lecture_registry::RegistryError;
use lecture_speech::SpeechError;
use thiserror::Error;

pub type StageResult<T> = Result<T, StageError>;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("subprocess {program} exited with status {status}: {stderr}")]
    Subprocess {
        program: &'static str,
        status: i32,
        stderr: String,
    },

    #[error("invalid {what}: {value}")]
    InvalidInput { what: &'static str, value: String },

    #[error("email dispatch failed: {0}")]
    Email(String),

    #[error("stage failed: {0}")]
    Other(String),
}

impl StageError {
    /// SPEC_FULL.md §7: every non-artifact/registry/speech failure a stage
    /// handler can hit is treated as `StageFailed` — there is no
    /// transcript-fetch-specific retry policy distinct from the queue's own
    /// retry cap.
    pub fn into_job_error(self) -> JobError {
        JobError::retryable(self.to_string())
    }
}

impl From<StageError> for PipelineError {
    fn from(err: StageError) -> Self {
        match &err {
            StageError::Registry(RegistryError::NotFound(_)) => PipelineError::not_found(err.to_string()),
            StageError::Registry(RegistryError::AlreadyExists(_)) => PipelineError::already_exists(err.to_string()),
            StageError::Registry(RegistryError::QuotaExceeded { .. }) => {
                PipelineError::new(ErrorKind::QuotaExceeded, err.to_string())
            }
            _ => PipelineError::general_error(err.to_string()),
        }
    }
}
