use lecture_core::errors::PipelineError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token present")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

impl From<AuthError> for PipelineError {
    fn from(err: AuthError) -> Self {
        PipelineError::not_authenticated(err.to_string())
    }
}
