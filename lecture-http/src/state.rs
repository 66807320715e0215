use std::sync::Arc;

use lecture_auth::JwtVerifier;
use lecture_queue::backend::memory::MemoryBackend;
use lecture_queue::QueueAdapter;
use lecture_registry::RegistryBackend;
use lecture_scheduler::JobScheduler;

use crate::collaborators::TokenMinter;
use crate::oauth::GoogleOAuthClient;

/// Everything a route handler needs, concrete (no generic service
/// dispatch — the teacher's `DogAxumState<R, P>` existed to carry an
/// arbitrary `DogApp`; this crate only ever serves the five routes
/// SPEC_FULL.md §6 names, so the handler dependencies are named directly).
pub struct AppState {
    pub scheduler: Arc<JobScheduler>,
    pub registry: Arc<dyn RegistryBackend>,
    pub queue: Arc<QueueAdapter<MemoryBackend>>,
    pub verifier: Arc<JwtVerifier>,
    pub google: Arc<GoogleOAuthClient>,
    pub token_minter: Arc<dyn TokenMinter>,
    /// `/callback`'s org whitelist (SPEC_FULL.md §6; `None` = no restriction).
    pub allowed_email_domain: Option<String>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            registry: self.registry.clone(),
            queue: self.queue.clone(),
            verifier: self.verifier.clone(),
            google: self.google.clone(),
            token_minter: self.token_minter.clone(),
            allowed_email_domain: self.allowed_email_domain.clone(),
        }
    }
}
