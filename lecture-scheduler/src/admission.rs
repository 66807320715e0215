//! Job Scheduler / admission gateway (SPEC_FULL.md §4.7): validate a
//! submission, load-or-create the Job row, compensate on partial failure,
//! and plan-then-enqueue the earliest unfinished stage. Grounded on
//! `job-scheduler-service.go`'s `QueueJob`-then-enqueue shape, generalized
//! into the validate → create → plan → enqueue sequence the spec names.

use std::sync::Arc;

use lecture_core::UserId;
use lecture_queue::QueueCtx;
use lecture_registry::{Job, RegistryBackend};
use lecture_stages::{NotesJob, StageQueueAdapter, SummaryJob, VideoJob};
use tracing::{info, warn};

use crate::error::{SchedulerError, SchedulerResult};

/// The closed set of background themes SPEC_FULL.md §4.7 step 1 allows.
pub const THEMES: &[&str] = &["subway", "minecraft"];

/// `submit`'s input. `requester`/`requester_email` are derived from the
/// verified bearer token upstream (SPEC_FULL.md §1 — JWT verification
/// itself is out of scope for this crate), not carried in the request body.
#[derive(Debug, Clone)]
pub struct Submission {
    pub entry_id: String,
    pub title: String,
    pub transcript_url: String,
    pub notes: bool,
    pub summarize: bool,
    /// `""` means no video was requested.
    pub background_video: String,
    pub requester: UserId,
    pub requester_email: String,
}

/// Outcome handed back to the HTTP layer: which stage (if any) this call
/// actually enqueued. Scenario 4/6 in SPEC_FULL.md §8 — a duplicate or
/// already-satisfied submission enqueues nothing and that's still success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Planned {
    Notes,
    Summary,
    Video,
    NothingToDo,
}

pub struct JobScheduler {
    registry: Arc<dyn RegistryBackend>,
    queue: Arc<StageQueueAdapter>,
    default_quota: u32,
    transcript_host_allowlist: Vec<String>,
}

impl JobScheduler {
    pub fn new(
        registry: Arc<dyn RegistryBackend>,
        queue: Arc<StageQueueAdapter>,
        default_quota: u32,
        transcript_host_allowlist: Vec<String>,
    ) -> Self {
        Self {
            registry,
            queue,
            default_quota,
            transcript_host_allowlist,
        }
    }

    /// SPEC_FULL.md §4.7: validate → load-or-create (with compensation) →
    /// plan-then-enqueue the earliest unfinished stage.
    pub async fn submit(&self, submission: Submission) -> SchedulerResult<Planned> {
        let submission = self.validate(submission)?;

        self.registry
            .ensure_user(&submission.requester, &submission.requester.0, self.default_quota)
            .await?;

        let job = match self
            .registry
            .create_job_if_absent(&submission.entry_id, &submission.title, &submission.requester)
            .await
        {
            Ok(job) => {
                // Freshly created: the row and the scheduled-set membership
                // are two separate conditional writes with no shared
                // transaction (SPEC_FULL.md §4.7 step 2/§9). If the second
                // fails, compensate by deleting the first rather than
                // leaving an orphan the owner never scheduled.
                if let Err(err) = self
                    .registry
                    .add_scheduled_job(&submission.requester, &submission.entry_id)
                    .await
                {
                    self.registry.delete_job(&submission.entry_id).await.ok();
                    return Err(err.into());
                }
                job
            }
            Err(err) if err.is_already_exists() => {
                // Another caller (or this same caller, retried) already
                // created this row — reuse it. Scenario 4 in SPEC_FULL.md §8.
                self.registry.get_job(&submission.entry_id).await?
            }
            Err(err) => return Err(err.into()),
        };

        self.plan_and_enqueue(&submission, &job).await
    }

    fn validate(&self, submission: Submission) -> SchedulerResult<Submission> {
        let url = url::Url::parse(&submission.transcript_url).map_err(|_| SchedulerError::Validation {
            field: "transcript",
            value: submission.transcript_url.clone(),
        })?;
        let host = url.host_str().unwrap_or("");
        if !self.transcript_host_allowlist.iter().any(|allowed| allowed == host) {
            return Err(SchedulerError::Validation {
                field: "transcript",
                value: submission.transcript_url.clone(),
            });
        }

        if !submission.background_video.is_empty() && !THEMES.contains(&submission.background_video.as_str()) {
            return Err(SchedulerError::Validation {
                field: "backgroundVideo",
                value: submission.background_video.clone(),
            });
        }

        // §4.7 step 1: requesting a background video forces `summarize`.
        let summarize = submission.summarize || !submission.background_video.is_empty();

        Ok(Submission { summarize, ..submission })
    }

    /// §4.7 step 3: start the earliest unfinished stage this submission
    /// asked for. Each stage's own success path enqueues the next, so the
    /// scheduler never needs to plan more than one hop ahead.
    async fn plan_and_enqueue(&self, submission: &Submission, job: &Job) -> SchedulerResult<Planned> {
        if submission.notes && !job.notes_generated {
            let enqueue = NotesJob {
                entry_id: submission.entry_id.clone(),
                transcript_url: submission.transcript_url.clone(),
            };
            self.enqueue_or_treat_duplicate_as_success(enqueue).await?;
            return Ok(Planned::Notes);
        }

        if submission.summarize && !job.summary_generated {
            let enqueue = SummaryJob {
                entry_id: submission.entry_id.clone(),
                transcript_url: submission.transcript_url.clone(),
                background_video: submission.background_video.clone(),
                requester_email: submission.requester_email.clone(),
            };
            self.enqueue_or_treat_duplicate_as_success(enqueue).await?;
            return Ok(Planned::Summary);
        }

        if !submission.background_video.is_empty() && !job.videos_available.contains(&submission.background_video) {
            let enqueue = VideoJob {
                entry_id: submission.entry_id.clone(),
                background_video: submission.background_video.clone(),
                generate_subtitles: !job.subtitles_generated,
                requester_email: submission.requester_email.clone(),
            };
            self.enqueue_or_treat_duplicate_as_success(enqueue).await?;
            return Ok(Planned::Video);
        }

        info!(entry_id = %submission.entry_id, "submission satisfied by existing job state, nothing to enqueue");
        Ok(Planned::NothingToDo)
    }

    async fn enqueue_or_treat_duplicate_as_success<J: lecture_queue::Job>(&self, job: J) -> SchedulerResult<()> {
        let ctx = QueueCtx::new(lecture_core::QUEUE_TENANT.to_string());
        match self.queue.enqueue(ctx, job).await {
            Ok(_) => Ok(()),
            // The memory backend's idempotency map already resolves a
            // dedup-key collision to the live job id rather than an error
            // (SPEC_FULL.md §4.3/§7's `DuplicateTask` is swallowed here),
            // so this arm only fires for a genuine backend failure.
            Err(err) => {
                warn!(error = %err, "enqueue failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lecture_queue::backend::memory::MemoryBackend;
    use lecture_queue::QueueAdapter;
    use lecture_registry::InMemoryRegistry;

    fn scheduler() -> (JobScheduler, Arc<InMemoryRegistry>, Arc<StageQueueAdapter>) {
        let registry = Arc::new(InMemoryRegistry::new());
        let queue = Arc::new(QueueAdapter::new(MemoryBackend::new()));
        let scheduler = JobScheduler::new(
            registry.clone(),
            queue.clone(),
            5,
            vec!["cdnapi.kaltura.com".to_string()],
        );
        (scheduler, registry, queue)
    }

    fn submission(entry_id: &str) -> Submission {
        Submission {
            entry_id: entry_id.to_string(),
            title: "T".to_string(),
            transcript_url: "https://cdnapi.kaltura.com/x".to_string(),
            notes: true,
            summarize: true,
            background_video: "subway".to_string(),
            requester: UserId("u1".to_string()),
            requester_email: "student@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn happy_path_creates_job_schedules_user_and_enqueues_notes() {
        let (scheduler, registry, queue) = scheduler();
        queue.register_job::<NotesJob>().await.unwrap();

        let planned = scheduler.submit(submission("E1")).await.unwrap();
        assert_eq!(planned, Planned::Notes);

        let job = registry.get_job("E1").await.unwrap();
        assert!(!job.notes_generated);
        let user = registry.get_user(&UserId("u1".to_string())).await.unwrap();
        assert!(user.scheduled_jobs.contains("E1"));

        let record = queue
            .backend()
            .dequeue(QueueCtx::new(lecture_core::QUEUE_TENANT.to_string()), &["default"])
            .await
            .unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn rejects_unwhitelisted_transcript_host() {
        let (scheduler, registry, _queue) = scheduler();
        let mut sub = submission("E2");
        sub.transcript_url = "https://evil.example/x".to_string();

        let err = scheduler.submit(sub).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Validation { field: "transcript", .. }));
        assert!(registry.get_job("E2").await.is_err());
    }

    #[tokio::test]
    async fn rejects_unknown_background_video() {
        let (scheduler, _registry, _queue) = scheduler();
        let mut sub = submission("E3");
        sub.background_video = "not-a-theme".to_string();

        let err = scheduler.submit(sub).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Validation { field: "backgroundVideo", .. }));
    }

    #[tokio::test]
    async fn quota_exceeded_leaves_no_job_row() {
        let (scheduler, registry, queue) = scheduler();
        queue.register_job::<NotesJob>().await.unwrap();
        registry.ensure_user(&UserId("u1".to_string()), "u1", 1).await.unwrap();
        registry.add_scheduled_job(&UserId("u1".to_string()), "OLD").await.unwrap();

        let err = scheduler.submit(submission("E4")).await.unwrap_err();
        assert!(matches!(err, SchedulerError::QuotaExceeded { .. }));
        assert!(registry.get_job("E4").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_submit_is_idempotent() {
        let (scheduler, _registry, queue) = scheduler();
        queue.register_job::<NotesJob>().await.unwrap();

        scheduler.submit(submission("E5")).await.unwrap();
        let planned = scheduler.submit(submission("E5")).await.unwrap();
        assert_eq!(planned, Planned::Notes);

        let mut count = 0;
        while queue
            .backend()
            .dequeue(QueueCtx::new(lecture_core::QUEUE_TENANT.to_string()), &["default"])
            .await
            .unwrap()
            .is_some()
        {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn background_video_forces_summarize() {
        let (scheduler, registry, queue) = scheduler();
        queue.register_job::<SummaryJob>().await.unwrap();

        let mut sub = submission("E6");
        sub.notes = false;
        sub.summarize = false;
        let planned = scheduler.submit(sub).await.unwrap();
        assert_eq!(planned, Planned::Summary);
        registry.get_job("E6").await.unwrap();

        let record = queue
            .backend()
            .dequeue(QueueCtx::new(lecture_core::QUEUE_TENANT.to_string()), &["default"])
            .await
            .unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn theme_already_available_skips_video_enqueue() {
        let (scheduler, registry, queue) = scheduler();
        queue.register_job::<VideoJob>().await.unwrap();

        registry
            .create_job_if_absent("E7", "T", &UserId("u1".to_string()))
            .await
            .unwrap();
        registry.set_summary_generated("E7").await.unwrap();
        registry.add_video_available("E7", "subway").await.unwrap();
        registry.ensure_user(&UserId("u1".to_string()), "u1", 5).await.unwrap();

        let mut sub = submission("E7");
        sub.notes = false;
        let planned = scheduler.submit(sub).await.unwrap();
        assert_eq!(planned, Planned::NothingToDo);

        let record = queue
            .backend()
            .dequeue(QueueCtx::new(lecture_core::QUEUE_TENANT.to_string()), &["low"])
            .await
            .unwrap();
        assert!(record.is_none());
    }
}
