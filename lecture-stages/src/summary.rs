//! Summary handler (SPEC_FULL.md §4.6 "Summary handler"): fetch transcript,
//! ask the LLM for a plain-text spoken summary, publish `Summary.txt`, flip
//! `summaryGenerated`, and — if a background theme was requested —
//! kick off the Video stage. Grounded on the original's
//! `generateSummary.go`, including its exact video-task-on-completion
//! enqueue (`asynq.Queue("low")`, dedup `video:{entryID}`).

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lecture_artifacts::keys;
use lecture_queue::{Job, JobError, JobPriority, QueueCtx};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::StageContext;
use crate::video::VideoJob;

const SUMMARY_SYSTEM_PROMPT: &str = "Imagine you are a university instructor preparing to summarize a lecture. \
Your goal is to explain concepts in great detail, ensuring everything is clear and accessible, even abstract \
ideas. Approach the explanation as if you're speaking directly to a student, weaving simple relatable examples \
into your teaching. Do NOT include bullet points, code, images, or structured sections. Dive into each concept \
thoroughly, breaking it down step-by-step, using approachable analogies to make even the most complex ideas \
easy to understand. Always provide enough context for your examples to make them meaningful. Do not include a \
preface to your response.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryJob {
    pub entry_id: String,
    pub transcript_url: String,
    /// `""` means no video was requested alongside this summary.
    pub background_video: String,
    /// Recipient for the eventual video-ready email, carried through so the
    /// Video job enqueued below doesn't need a separate registry lookup.
    pub requester_email: String,
}

#[async_trait]
impl Job for SummaryJob {
    type Context = Arc<StageContext>;
    type Result = ();

    const JOB_TYPE: &'static str = "summary";
    const PRIORITY: JobPriority = JobPriority::Default;
    const MAX_RETRIES: u32 = 0;

    fn idempotency_key(&self) -> Option<String> {
        Some(format!("summary:{}", self.entry_id))
    }

    async fn execute(&self, ctx: Self::Context) -> Result<Self::Result, JobError> {
        info!(entry_id = %self.entry_id, "generating summary");

        let transcript = ctx
            .transcripts
            .fetch(&self.transcript_url)
            .await
            .map_err(|e| e.into_job_error())?;

        let summary = ctx
            .llm
            .complete(SUMMARY_SYSTEM_PROMPT, &transcript)
            .await
            .map_err(|e| e.into_job_error())?;

        let key = keys::summary_key(&self.entry_id);
        ctx.artifacts
            .put(&key, Some("text/plain"), Bytes::from(summary))
            .await
            .map_err(|e| JobError::retryable(e.to_string()))?;
        debug!(entry_id = %self.entry_id, key, "wrote Summary.txt");

        ctx.registry
            .set_summary_generated(&self.entry_id)
            .await
            .map_err(|e| JobError::retryable(e.to_string()))?;

        if !self.background_video.is_empty() {
            let video_job = VideoJob {
                entry_id: self.entry_id.clone(),
                background_video: self.background_video.clone(),
                generate_subtitles: true,
                requester_email: self.requester_email.clone(),
            };
            let queue_ctx = QueueCtx::new(lecture_core::QUEUE_TENANT.to_string());
            // The backend treats a dedup-key collision as a no-op success, not
            // an error, so a failure here is a genuine enqueue problem.
            if let Err(err) = ctx.queue.enqueue(queue_ctx, video_job).await {
                warn!(entry_id = %self.entry_id, error = %err, "failed to enqueue video task after summary");
            }
        }

        info!(entry_id = %self.entry_id, "summary generated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{EmailSender, LlmClient, TranscriptFetcher};
    use crate::error::StageResult;
    use lecture_artifacts::{ArtifactAdapter, InMemoryArtifactStore};
    use lecture_core::UserId;
    use lecture_queue::backend::memory::MemoryBackend;
    use lecture_queue::QueueAdapter;
    use lecture_registry::InMemoryRegistry;
    use lecture_speech::{PollingPolicy, SpeechSynthesisDriver, SynthesisFormat, SynthesisProvider, SynthesisStatus, SynthesisTaskId};
    use std::time::Duration;

    struct FixedLlm;

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _system_prompt: &str, _transcript: &str) -> StageResult<String> {
            Ok("a plain-text summary".to_string())
        }
    }

    struct FixedTranscript;

    #[async_trait]
    impl TranscriptFetcher for FixedTranscript {
        async fn fetch(&self, _transcript_url: &str) -> StageResult<String> {
            Ok("a lecture transcript".to_string())
        }
    }

    struct NoopEmail;

    #[async_trait]
    impl EmailSender for NoopEmail {
        async fn send_video_ready(&self, _to: &str, _title: &str, _theme: &str) -> StageResult<()> {
            Ok(())
        }
    }

    struct NoopProvider;

    #[async_trait]
    impl SynthesisProvider for NoopProvider {
        async fn submit(
            &self,
            _text: &str,
            _format: SynthesisFormat,
            _voice: &str,
            _key_prefix: &str,
        ) -> lecture_speech::SpeechResult<SynthesisTaskId> {
            Ok(SynthesisTaskId("unused".to_string()))
        }

        async fn poll(&self, _task_id: &SynthesisTaskId) -> lecture_speech::SpeechResult<SynthesisStatus> {
            Ok(SynthesisStatus::Pending)
        }
    }

    fn test_context() -> Arc<StageContext> {
        let artifacts = ArtifactAdapter::new(InMemoryArtifactStore::new());
        Arc::new(StageContext {
            artifacts: artifacts.clone(),
            registry: Arc::new(InMemoryRegistry::new()),
            queue: Arc::new(QueueAdapter::new(MemoryBackend::new())),
            speech: Arc::new(SpeechSynthesisDriver::new(
                Arc::new(NoopProvider),
                artifacts,
                PollingPolicy::new(Duration::from_millis(1), Duration::from_millis(10)),
                "Joey",
                "standard",
            )),
            llm: Arc::new(FixedLlm),
            transcripts: Arc::new(FixedTranscript),
            email: Arc::new(NoopEmail),
            themes_dir: std::env::temp_dir(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            logo_path: None,
        })
    }

    #[tokio::test]
    async fn writes_summary_and_flips_flag_without_video() {
        let ctx = test_context();
        ctx.registry
            .create_job_if_absent("E1", "Title", &UserId("u1".to_string()))
            .await
            .unwrap();

        let job = SummaryJob {
            entry_id: "E1".to_string(),
            transcript_url: "https://example.com/t".to_string(),
            background_video: String::new(),
            requester_email: "student@example.com".to_string(),
        };
        job.execute(ctx.clone()).await.unwrap();

        assert!(ctx.artifacts.exists("assets/E1/Summary.txt").await.unwrap());
        let row = ctx.registry.get_job("E1").await.unwrap();
        assert!(row.summary_generated);
    }

    #[tokio::test]
    async fn enqueues_video_task_when_background_video_requested() {
        let ctx = test_context();
        ctx.registry
            .create_job_if_absent("E2", "Title", &UserId("u1".to_string()))
            .await
            .unwrap();
        ctx.queue.register_job::<VideoJob>().await.unwrap();

        let job = SummaryJob {
            entry_id: "E2".to_string(),
            transcript_url: "https://example.com/t".to_string(),
            background_video: "minecraft".to_string(),
            requester_email: "student@example.com".to_string(),
        };
        job.execute(ctx.clone()).await.unwrap();

        let record = ctx
            .queue
            .backend()
            .dequeue(QueueCtx::new(lecture_core::QUEUE_TENANT.to_string()), &["low"])
            .await
            .unwrap();
        assert!(record.is_some());
    }
}
