//! Event Bridge (SPEC_FULL.md §4.8): subscribes to `lecture-registry`'s
//! change stream and reacts to two triggers — a new `VideoRequest` row, and
//! a `videosAvailable` set mutation. Grounded on `lecture-core`'s
//! `EventHub::on_pattern`/`emit_async` split, the same subscription shape
//! `InMemoryRegistry` itself documents.

use std::sync::Arc;

use lecture_queue::{JobPriority, QueueCtx};
use lecture_registry::{InMemoryRegistry, RegistryBackend, RegistryEvent};
use lecture_stages::{StageQueueAdapter, VideoJob};
use tracing::{error, warn};

/// One failed enqueue from a batch of registry events, so the caller can
/// redeliver only the bad ones (SPEC_FULL.md §4.8: "both triggers emit a
/// per-event failure list").
#[derive(Debug)]
pub struct BridgeFailure {
    pub entry_id: String,
    pub theme: String,
    pub error: String,
}

pub struct EventBridge {
    registry: Arc<InMemoryRegistry>,
    queue: Arc<StageQueueAdapter>,
    /// Looked up per event since a `VideoRequest`'s own row carries no
    /// `generateSubtitles` flag — §4.8 derives it from the current Job row.
    requester_email_for: Arc<dyn Fn(&lecture_core::UserId) -> String + Send + Sync>,
}

impl EventBridge {
    pub fn new(
        registry: Arc<InMemoryRegistry>,
        queue: Arc<StageQueueAdapter>,
        requester_email_for: Arc<dyn Fn(&lecture_core::UserId) -> String + Send + Sync>,
    ) -> Self {
        Self {
            registry,
            queue,
            requester_email_for,
        }
    }

    /// Subscribes this bridge to the registry's change stream. Returns the
    /// listener id so a caller (or a test) can unsubscribe later.
    pub async fn attach(self: &Arc<Self>) -> lecture_core::ListenerId {
        let this = self.clone();
        self.registry
            .subscribe(
                lecture_core::TopicPattern::Any,
                Arc::new(move |_topic: &str, event: &RegistryEvent| {
                    let this = this.clone();
                    let event = event.clone();
                    Box::pin(async move {
                        if let Err(failure) = this.handle(event).await {
                            warn!(entry_id = %failure.entry_id, theme = %failure.theme, error = %failure.error, "event bridge failed to enqueue video task");
                        }
                        Ok(())
                    }) as lecture_core::EventFut<'static>
                }),
            )
            .await
    }

    /// Dispatches one registry event to the matching trigger. Exposed
    /// directly (not just through [`Self::attach`]) so a caller driving a
    /// batch of redelivered events can build the failure list SPEC_FULL.md
    /// §4.8 asks for.
    pub async fn handle(&self, event: RegistryEvent) -> Result<(), BridgeFailure> {
        match event {
            RegistryEvent::VideoRequestCreated(request) => {
                self.on_video_request_created(&request.entry_id, &request.theme, &request.requester)
                    .await
            }
            RegistryEvent::VideosAvailableChanged {
                entry_id,
                owner,
                before,
                after,
            } => self.on_videos_available_changed(&entry_id, &owner, &before, &after).await,
        }
    }

    /// §4.8 trigger 1: a new `(entryID, theme)` row always enqueues at `low`
    /// priority; `generateSubtitles` is derived from the job's current
    /// `subtitlesGenerated` flag at dispatch time.
    async fn on_video_request_created(
        &self,
        entry_id: &str,
        theme: &str,
        requester: &lecture_core::UserId,
    ) -> Result<(), BridgeFailure> {
        let job = self.registry.get_job(entry_id).await.map_err(|e| BridgeFailure {
            entry_id: entry_id.to_string(),
            theme: theme.to_string(),
            error: e.to_string(),
        })?;

        self.enqueue_video(entry_id, theme, !job.subtitles_generated, requester, JobPriority::Low)
            .await
    }

    /// §4.8 trigger 2: the first theme the owner wants is `high` priority,
    /// every subsequent addition is `low`. Computed by set-difference
    /// between the event's before/after images, exactly as the spec says —
    /// preserved even though it re-requests a theme the Video stage just
    /// finished building (see the open question recorded in DESIGN.md).
    async fn on_videos_available_changed(
        &self,
        entry_id: &str,
        owner: &lecture_core::UserId,
        before: &std::collections::HashSet<String>,
        after: &std::collections::HashSet<String>,
    ) -> Result<(), BridgeFailure> {
        let first_addition = before.is_empty();
        let job = self.registry.get_job(entry_id).await.map_err(|e| BridgeFailure {
            entry_id: entry_id.to_string(),
            theme: String::new(),
            error: e.to_string(),
        })?;

        for theme in after.difference(before) {
            let priority = if first_addition { JobPriority::High } else { JobPriority::Low };
            self.enqueue_video(entry_id, theme, !job.subtitles_generated, owner, priority).await?;
        }

        Ok(())
    }

    async fn enqueue_video(
        &self,
        entry_id: &str,
        theme: &str,
        generate_subtitles: bool,
        requester: &lecture_core::UserId,
        priority: JobPriority,
    ) -> Result<(), BridgeFailure> {
        let job = VideoJob {
            entry_id: entry_id.to_string(),
            background_video: theme.to_string(),
            generate_subtitles,
            requester_email: (self.requester_email_for)(requester),
        };

        let ctx = QueueCtx::new(lecture_core::QUEUE_TENANT.to_string());
        self.queue.enqueue_with_priority(ctx, job, priority).await.map_err(|e| {
            error!(entry_id, theme, error = %e, "event bridge enqueue failed");
            BridgeFailure {
                entry_id: entry_id.to_string(),
                theme: theme.to_string(),
                error: e.to_string(),
            }
        })?;
        Ok(())
    }
}
