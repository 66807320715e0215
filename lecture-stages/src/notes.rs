//! Notes handler (SPEC_FULL.md §4.6 "Notes handler"): fetch transcript, ask
//! the LLM for markdown notes, publish `Notes.md`, flip `notesGenerated`.
//! Grounded on the original's `generateNotes.go`, with the S3 PutObject +
//! DynamoDB flag-flip replaced by [`lecture_artifacts::ArtifactAdapter`] and
//! [`lecture_registry::RegistryBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lecture_artifacts::keys;
use lecture_queue::{Job, JobError, JobPriority};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::StageContext;

/// Fixed system prompt from SPEC_FULL.md §4.6: markdown only, no
/// images/links/checklists/diagrams/math, fenced code carries a language tag.
const NOTES_SYSTEM_PROMPT: &str = "You are an assistant that generates notes for a lecture from a transcript.\n\
\n\
GOALS:\n\
- Explain content in detail.\n\
- Use simple language.\n\
- Express abstract ideas in an accessible manner.\n\
\n\
IMPORTANT: Exclusively generate notes in markdown format using paragraphs, headings, lists, fenced code blocks, and tables.\n\
IMPORTANT: Do NOT include images, links, checklists, diagrams, or LaTeX.\n\
IMPORTANT: Always indicate the language in fenced code blocks.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesJob {
    pub entry_id: String,
    pub transcript_url: String,
}

#[async_trait]
impl Job for NotesJob {
    type Context = Arc<StageContext>;
    type Result = ();

    const JOB_TYPE: &'static str = "notes";
    const PRIORITY: JobPriority = JobPriority::Default;
    const MAX_RETRIES: u32 = 0;

    fn idempotency_key(&self) -> Option<String> {
        Some(format!("note:{}", self.entry_id))
    }

    async fn execute(&self, ctx: Self::Context) -> Result<Self::Result, JobError> {
        info!(entry_id = %self.entry_id, "generating notes");

        let transcript = ctx
            .transcripts
            .fetch(&self.transcript_url)
            .await
            .map_err(|e| e.into_job_error())?;

        let notes = ctx
            .llm
            .complete(NOTES_SYSTEM_PROMPT, &transcript)
            .await
            .map_err(|e| e.into_job_error())?;

        let key = keys::notes_key(&self.entry_id);
        ctx.artifacts
            .put(&key, Some("text/markdown"), Bytes::from(notes))
            .await
            .map_err(|e| JobError::retryable(e.to_string()))?;
        debug!(entry_id = %self.entry_id, key, "wrote Notes.md");

        ctx.registry
            .set_notes_generated(&self.entry_id)
            .await
            .map_err(|e| JobError::retryable(e.to_string()))?;

        info!(entry_id = %self.entry_id, "notes generated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{EmailSender, LlmClient, TranscriptFetcher};
    use crate::error::StageResult;
    use lecture_artifacts::{ArtifactAdapter, InMemoryArtifactStore};
    use lecture_queue::backend::memory::MemoryBackend;
    use lecture_queue::QueueAdapter;
    use lecture_registry::InMemoryRegistry;
    use lecture_speech::{PollingPolicy, SpeechSynthesisDriver, SynthesisFormat, SynthesisProvider, SynthesisStatus, SynthesisTaskId};
    use std::time::Duration;

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _system_prompt: &str, _transcript: &str) -> StageResult<String> {
            Ok(self.0.to_string())
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
            llm: Arc::new(FixedLlm("# Notes\n\nBody.")),
            transcripts: Arc::new(FixedTranscript),
            email: Arc::new(NoopEmail),
            themes_dir: std::env::temp_dir(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            logo_path: None,
        })
    }

    #[tokio::test]
    async fn writes_notes_and_flips_flag() {
        let ctx = test_context();
        ctx.registry
            .create_job_if_absent("E1", "Title", &lecture_core::UserId("u1".to_string()))
            .await
            .unwrap();

        let job = NotesJob {
            entry_id: "E1".to_string(),
            transcript_url: "https://example.com/t".to_string(),
        };
        job.execute(ctx.clone()).await.unwrap();

        assert!(ctx.artifacts.exists("assets/E1/Notes.md").await.unwrap());
        let row = ctx.registry.get_job("E1").await.unwrap();
        assert!(row.notes_generated);
    }

    #[tokio::test]
    async fn idempotency_key_is_scoped_to_entry() {
        let job = NotesJob {
            entry_id: "E1".to_string(),
            transcript_url: "https://example.com/t".to_string(),
        };
        assert_eq!(job.idempotency_key(), Some("note:E1".to_string()));
    }
}
