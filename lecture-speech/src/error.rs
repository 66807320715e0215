use lecture_artifacts::ArtifactError;
use lecture_core::errors::{ErrorKind, PipelineError};
use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

/// SPEC_FULL.md §4.4/§7: a synthesis task either completes, reports a
/// non-`Completed` terminal state, or is still running when the deadline
/// passes. There is no "retry forever" outcome by design — the stage
/// handler that called us decides whether to retry the whole task.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("speech synthesis timed out after {elapsed_secs}s (deadline {deadline_secs}s)")]
    SynthesisTimeout { elapsed_secs: u64, deadline_secs: u64 },

    #[error("synthesis provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl From<SpeechError> for PipelineError {
    fn from(err: SpeechError) -> Self {
        match &err {
            SpeechError::SynthesisTimeout { .. } => PipelineError::timeout(err.to_string()),
            SpeechError::SynthesisFailed(_) | SpeechError::Provider(_) => {
                PipelineError::new(ErrorKind::BadGateway, err.to_string())
            }
            SpeechError::Artifact(_) => PipelineError::general_error(err.to_string()),
        }
    }
}
