//! `RegistryBackend`: the single-row conditional-write contract of
//! SPEC_FULL.md §4.2. Every mutation here is atomic with its own presence
//! predicate — there are no cross-row transactions, so callers that need to
//! compose two of these (Job row + scheduled-set membership) compensate
//! explicitly on partial failure, exactly as the Job Scheduler does (§4.7).

use std::time::Duration;

use async_trait::async_trait;
use lecture_core::UserId;

use crate::error::RegistryResult;
use crate::model::{Job, User, VideoRequest};

#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// `createJobIfAbsent`: fails `AlreadyExists` if `entry_id` is already present.
    async fn create_job_if_absent(&self, entry_id: &str, title: &str, owner: &UserId) -> RegistryResult<Job>;

    /// `getJob`: fails `NotFound` if absent.
    async fn get_job(&self, entry_id: &str) -> RegistryResult<Job>;

    /// Deletes a job row outright. Used only by the Scheduler's own
    /// compensation path when `add_scheduled_job` fails after a successful
    /// `create_job_if_absent` (§4.7 step 2) — never called by a stage handler.
    async fn delete_job(&self, entry_id: &str) -> RegistryResult<()>;

    /// Gets the user row, creating one with `default_quota` permitted
    /// generations if this is the first time the subject has been seen.
    async fn ensure_user(&self, user: &UserId, display_name: &str, default_quota: u32) -> RegistryResult<User>;

    async fn get_user(&self, user: &UserId) -> RegistryResult<User>;

    /// `addScheduledJob`: fails `QuotaExceeded` if the insert would push
    /// `|scheduledJobs|` past `permittedGenerations`.
    async fn add_scheduled_job(&self, user: &UserId, entry_id: &str) -> RegistryResult<()>;

    /// `removeScheduledJob`: idempotent, succeeds even if already absent.
    async fn remove_scheduled_job(&self, user: &UserId, entry_id: &str) -> RegistryResult<()>;

    /// `setNotesGenerated`: rewrite-on-present-only, monotonic (never unsets).
    async fn set_notes_generated(&self, entry_id: &str) -> RegistryResult<Job>;

    /// `setSummaryGenerated`.
    async fn set_summary_generated(&self, entry_id: &str) -> RegistryResult<Job>;

    /// `setSubtitlesGenerated`.
    async fn set_subtitles_generated(&self, entry_id: &str) -> RegistryResult<Job>;

    /// `addVideoAvailable`: set-union semantics, returns the post-update row.
    /// Publishes `RegistryEvent::VideosAvailableChanged` on success.
    async fn add_video_available(&self, entry_id: &str, theme: &str) -> RegistryResult<Job>;

    /// `createVideoRequest`: fails `AlreadyExists` if `(entry_id, theme)` is
    /// already present. Publishes `RegistryEvent::VideoRequestCreated` on success.
    async fn create_video_request(
        &self,
        entry_id: &str,
        theme: &str,
        requester: &UserId,
        ttl: Duration,
    ) -> RegistryResult<VideoRequest>;
}
