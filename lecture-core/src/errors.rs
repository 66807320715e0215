//! # Errors (Feathers-style)
//!
//! A structured error taxonomy shared across every crate in the pipeline.
//! Core goals:
//! - consistent status codes + class names for the HTTP layer
//! - can be carried through `anyhow::Error` so internal code can use `?` freely
//! - transport-agnostic (the HTTP crate decides how to serialize)
//!
//! If you enable feature `serde`, you also get:
//! - `data` / `errors` as `serde_json::Value`
//! - `to_json()` helper
//!
//! The variants below are the taxonomy from SPEC_FULL.md §7, not a generic
//! CRUD error set: `QuotaExceeded`, `AlreadyExists`, and `DuplicateTask` are
//! swallowed as benign success at specific call sites rather than surfaced,
//! so callers match on `kind()` rather than just checking `is_err()`.

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for pipeline APIs.
pub type PipelineResult<T> = std::result::Result<T, AnyError>;

/// Feathers-ish error class names + status codes, extended with the
/// pipeline-specific signals from SPEC_FULL.md §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400 - ValidationError
    NotAuthenticated, // 401 - AuthError
    Forbidden,        // 403
    NotFound,         // 404 - NotFound (control signal, not always user-visible)
    Conflict,         // 409 - AlreadyExists when it does surface
    QuotaExceeded,    // 400 - admission rejects after compensation
    DuplicateTask,    // 409 - swallowed as benign at the scheduler/bridge
    Timeout,          // 408 - SynthesisTimeout
    TooManyRequests,  // 429
    GeneralError,     // 500 - StageFailed / internal
    BadGateway,       // 502 - Transient upstream failure
    Unavailable,      // 503 - Fatal config/auth error at startup
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::QuotaExceeded => 400,
            ErrorKind::DuplicateTask => 409,
            ErrorKind::Timeout => 408,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::GeneralError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::Unavailable => 503,
        }
    }

    /// Feathers error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::QuotaExceeded => "QuotaExceeded",
            ErrorKind::DuplicateTask => "DuplicateTask",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::TooManyRequests => "TooManyRequests",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::BadGateway => "BadGateway",
            ErrorKind::Unavailable => "Unavailable",
        }
    }

    /// Feathers error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::QuotaExceeded => "quota-exceeded",
            ErrorKind::DuplicateTask => "duplicate-task",
            ErrorKind::Timeout => "timeout",
            ErrorKind::TooManyRequests => "too-many-requests",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::BadGateway => "bad-gateway",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

#[cfg(feature = "serde")]
pub type ErrorValue = serde_json::Value;

#[cfg(not(feature = "serde"))]
pub type ErrorValue = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// A structured pipeline error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<ErrorValue>,
    pub errors: Option<ErrorValue>,
    pub source: Option<AnyError>,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            errors: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: ErrorValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: ErrorValue) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    pub fn from_anyhow(err: &AnyError) -> Option<&PipelineError> {
        err.downcast_ref::<PipelineError>()
    }

    /// Turn any error into a PipelineError: keep it if it already is one,
    /// otherwise wrap it as `GeneralError`.
    pub fn normalize(err: AnyError) -> PipelineError {
        match err.downcast::<PipelineError>() {
            Ok(pe) => pe,
            Err(other) => {
                PipelineError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A client-safe copy: keep kind/message/code/class_name/data/errors, drop `source`.
    pub fn sanitize_for_client(&self) -> PipelineError {
        PipelineError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self.kind, ErrorKind::QuotaExceeded)
    }

    pub fn is_duplicate_task(&self) -> bool {
        matches!(self.kind, ErrorKind::DuplicateTask)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self.kind, ErrorKind::Conflict)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }

    // ---- Constructors (Feathers-style + pipeline-specific) ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn quota_exceeded(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, msg)
    }
    pub fn duplicate_task(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateTask, msg)
    }
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, msg)
    }
    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooManyRequests, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadGateway, msg)
    }
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "serde")]
impl PipelineError {
    /// Feathers-ish JSON payload, exactly matching SPEC_FULL.md §10.2.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }
}

/// Convenience helper for "bail with PipelineError".
#[macro_export]
macro_rules! bail_pipeline {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::PipelineError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::PipelineError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}
