//! lecture-auth: verifies the Bearer token the admission/status routes
//! require (SPEC_FULL.md §6). Minting tokens and the OAuth redirect dance
//! live outside this crate's contract (§1 Out of scope) — `lecture-http`'s
//! `/login` and `/callback` handlers talk to the identity provider
//! directly and only hand this crate a token to check.

pub mod bearer;
pub mod error;
pub mod verifier;

pub use bearer::extract_bearer_token;
pub use error::{AuthError, AuthResult};
pub use verifier::{Claims, JwtVerifier};
