//! In-memory `RegistryBackend`, the default test double (§10.4) and a
//! perfectly serviceable backend for a single-process deployment — the
//! queue crate's `MemoryBackend` is the model: `parking_lot::RwLock` guards
//! plain maps, no lock is ever held across an `.await`, and event emission
//! happens strictly after the mutation's lock has been released.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lecture_core::{EventHub, EventListener, TopicPattern, UserId};
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::backend::RegistryBackend;
use crate::error::{RegistryError, RegistryResult};
use crate::events::RegistryEvent;
use crate::model::{Job, User, VideoRequest};

#[derive(Default)]
struct State {
    jobs: HashMap<String, Job>,
    users: HashMap<UserId, User>,
    video_requests: HashMap<(String, String), VideoRequest>,
}

pub struct InMemoryRegistry {
    state: Arc<RwLock<State>>,
    hub: AsyncMutex<EventHub<RegistryEvent>>,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            hub: AsyncMutex::new(EventHub::new()),
        }
    }

    /// Register a listener on the registry's change stream (§4.8). Returns
    /// the id so the Event Bridge (or a test) can unsubscribe later.
    pub async fn subscribe(
        &self,
        pattern: TopicPattern,
        listener: EventListener<RegistryEvent>,
    ) -> lecture_core::ListenerId {
        self.hub.lock().await.on_pattern(pattern, listener)
    }

    async fn publish(&self, event: RegistryEvent) {
        let topic = event.topic().to_string();
        let mut hub = self.hub.lock().await;
        if let Err(err) = hub.emit_async(&topic, &event).await {
            debug!(%topic, error = %err, "registry event listener returned an error");
        }
    }
}

#[async_trait]
impl RegistryBackend for InMemoryRegistry {
    async fn create_job_if_absent(&self, entry_id: &str, title: &str, owner: &UserId) -> RegistryResult<Job> {
        let mut state = self.state.write();
        if let Some(existing) = state.jobs.get(entry_id) {
            return Err(RegistryError::AlreadyExists(existing.entry_id.clone()));
        }
        let job = Job::new(entry_id, title, owner.clone());
        state.jobs.insert(entry_id.to_string(), job.clone());
        Ok(job)
    }

    async fn get_job(&self, entry_id: &str) -> RegistryResult<Job> {
        self.state
            .read()
            .jobs
            .get(entry_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(entry_id.to_string()))
    }

    async fn delete_job(&self, entry_id: &str) -> RegistryResult<()> {
        self.state.write().jobs.remove(entry_id);
        Ok(())
    }

    async fn ensure_user(&self, user: &UserId, display_name: &str, default_quota: u32) -> RegistryResult<User> {
        let mut state = self.state.write();
        if let Some(existing) = state.users.get(user) {
            return Ok(existing.clone());
        }
        let row = User::new(user.clone(), display_name, default_quota);
        state.users.insert(user.clone(), row.clone());
        Ok(row)
    }

    async fn get_user(&self, user: &UserId) -> RegistryResult<User> {
        self.state
            .read()
            .users
            .get(user)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(user.0.clone()))
    }

    async fn add_scheduled_job(&self, user: &UserId, entry_id: &str) -> RegistryResult<()> {
        let mut state = self.state.write();
        let row = state
            .users
            .get(user)
            .cloned()
            .unwrap_or_else(|| User::new(user.clone(), user.0.clone(), 0));
        let scheduled = row.scheduled_jobs.len() as u32;
        if row.scheduled_jobs.contains(entry_id) {
            // Already scheduled: idempotent, no quota impact.
            state.users.entry(user.clone()).or_insert(row);
            return Ok(());
        }
        if scheduled >= row.permitted_generations {
            return Err(RegistryError::QuotaExceeded {
                user: user.0.clone(),
                scheduled,
                limit: row.permitted_generations,
            });
        }
        let entry = state.users.entry(user.clone()).or_insert(row);
        entry.scheduled_jobs.insert(entry_id.to_string());
        Ok(())
    }

    async fn remove_scheduled_job(&self, user: &UserId, entry_id: &str) -> RegistryResult<()> {
        if let Some(row) = self.state.write().users.get_mut(user) {
            row.scheduled_jobs.remove(entry_id);
        }
        Ok(())
    }

    async fn set_notes_generated(&self, entry_id: &str) -> RegistryResult<Job> {
        let mut state = self.state.write();
        let job = state
            .jobs
            .get_mut(entry_id)
            .ok_or_else(|| RegistryError::NotFound(entry_id.to_string()))?;
        job.notes_generated = true;
        Ok(job.clone())
    }

    async fn set_summary_generated(&self, entry_id: &str) -> RegistryResult<Job> {
        let mut state = self.state.write();
        let job = state
            .jobs
            .get_mut(entry_id)
            .ok_or_else(|| RegistryError::NotFound(entry_id.to_string()))?;
        job.summary_generated = true;
        Ok(job.clone())
    }

    async fn set_subtitles_generated(&self, entry_id: &str) -> RegistryResult<Job> {
        let mut state = self.state.write();
        let job = state
            .jobs
            .get_mut(entry_id)
            .ok_or_else(|| RegistryError::NotFound(entry_id.to_string()))?;
        job.subtitles_generated = true;
        Ok(job.clone())
    }

    async fn add_video_available(&self, entry_id: &str, theme: &str) -> RegistryResult<Job> {
        let (owner, before, after, job) = {
            let mut state = self.state.write();
            let job = state
                .jobs
                .get_mut(entry_id)
                .ok_or_else(|| RegistryError::NotFound(entry_id.to_string()))?;
            let before = job.videos_available.clone();
            job.videos_available.insert(theme.to_string());
            let after = job.videos_available.clone();
            (job.owner.clone(), before, after, job.clone())
        };

        if before != after {
            self.publish(RegistryEvent::VideosAvailableChanged {
                entry_id: entry_id.to_string(),
                owner,
                before,
                after,
            })
            .await;
        }

        Ok(job)
    }

    async fn create_video_request(
        &self,
        entry_id: &str,
        theme: &str,
        requester: &UserId,
        ttl: Duration,
    ) -> RegistryResult<VideoRequest> {
        let request = {
            let mut state = self.state.write();
            let key = (entry_id.to_string(), theme.to_string());
            if state.video_requests.contains_key(&key) {
                return Err(RegistryError::AlreadyExists(format!("{entry_id}:{theme}")));
            }
            let request = VideoRequest {
                entry_id: entry_id.to_string(),
                theme: theme.to_string(),
                requester: requester.clone(),
                created_at: chrono::Utc::now(),
                ttl,
            };
            state.video_requests.insert(key, request.clone());
            request
        };

        self.publish(RegistryEvent::VideoRequestCreated(request.clone())).await;

        Ok(request)
    }
}
