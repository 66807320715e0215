use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lecture_core::errors::PipelineError;

/// Wraps any crate's error on the boundary into this crate's single
/// `IntoResponse` impl. Every downstream crate's error type converts into
/// [`PipelineError`] already (SPEC_FULL.md §10.2), so this is a thin shell.
#[derive(Debug)]
pub struct HttpError(pub anyhow::Error);

impl From<anyhow::Error> for HttpError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<PipelineError> for HttpError {
    fn from(e: PipelineError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<lecture_scheduler::SchedulerError> for HttpError {
    fn from(e: lecture_scheduler::SchedulerError) -> Self {
        Self(PipelineError::from(e).into_anyhow())
    }
}

impl From<lecture_registry::RegistryError> for HttpError {
    fn from(e: lecture_registry::RegistryError) -> Self {
        Self(PipelineError::from(e).into_anyhow())
    }
}

impl From<lecture_auth::AuthError> for HttpError {
    fn from(e: lecture_auth::AuthError) -> Self {
        Self(PipelineError::from(e).into_anyhow())
    }
}

/// `lecture-queue` is kept infrastructure-only and doesn't depend on
/// `lecture-core` (see its own `Cargo.toml`), so the conversion to
/// `PipelineError` lives here at the boundary instead of on `QueueError` itself.
impl From<lecture_queue::QueueError> for HttpError {
    fn from(e: lecture_queue::QueueError) -> Self {
        Self(PipelineError::general_error(e.to_string()).into_anyhow())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        // Preserve Feathers-ish fields if a PipelineError is anywhere in the chain.
        if let Some(pipeline) = self.0.chain().find_map(|e| e.downcast_ref::<PipelineError>()) {
            let safe = pipeline.sanitize_for_client();
            let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(safe.to_json())).into_response();
        }

        let pipeline = PipelineError::general_error(self.0.to_string());
        let safe = pipeline.sanitize_for_client();
        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
