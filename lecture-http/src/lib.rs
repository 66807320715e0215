//! Admission/status HTTP surface and Google OAuth login (SPEC_FULL.md §6):
//! the five routes, their request/response shapes, and the axum plumbing
//! (request-id, tracing, error envelope) that wraps them.

pub mod app;
mod collaborators;
mod error;
mod oauth;
pub mod routes;
pub mod state;

pub use collaborators::{MintedToken, TokenMinter};
pub use error::HttpError;
pub use oauth::{GoogleOAuthClient, GoogleProfile};
pub use state::AppState;
