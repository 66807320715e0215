//! JWT minting is an external collaborator here the same way the LLM and
//! transcript host are collaborators for `lecture-stages` (SPEC_FULL.md §1
//! Out of scope: `lecture-auth` only verifies tokens it's handed, never
//! signs one). `/callback` needs to hand a caller a usable token once their
//! Google profile clears the domain check, so this crate depends on a
//! minting trait instead of a concrete signing implementation.

use async_trait::async_trait;

use crate::error::HttpError;

/// One minted token plus the metadata `/callback`'s JSON body carries
/// alongside it (SPEC_FULL.md §6: `{token, email, expiry}`).
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub expiry: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
pub trait TokenMinter: Send + Sync {
    /// Mint a bearer token for `subject` (the verified profile email),
    /// valid for the stated lifetime.
    async fn mint(&self, subject: &str, ttl: std::time::Duration) -> Result<MintedToken, HttpError>;
}
