use thiserror::Error;

/// Result type for artifact store operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// The three-member taxonomy SPEC_FULL.md §4.1 names, with the teacher's
/// richer backend-error texture kept as constructors rather than flattened away.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact not found: {key}")]
    NotFound { key: String },

    #[error("transient store failure: {message}")]
    Transient { message: String },

    #[error("fatal store failure: {message}")]
    Fatal { message: String },
}

impl ArtifactError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::NotFound { .. })
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self, ArtifactError::Transient { .. })
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound {
                key: err.to_string(),
            }
        } else {
            ArtifactError::fatal(err.to_string())
        }
    }
}
