//! External collaborator traits (SPEC_FULL.md §1/§6): the lecture host, the
//! LLM endpoint, and the transactional-email sender are out of scope for
//! this pipeline — only their contracts are specified. Stage handlers
//! depend on these traits, never on a concrete SDK, the same way
//! `lecture-speech` depends on [`lecture_speech::SynthesisProvider`] instead
//! of an AWS Polly client.

use async_trait::async_trait;

use crate::error::StageResult;

/// What a stage handler asks the LLM to do with a transcript. The prompt
/// text itself lives in the Notes/Summary handlers (SPEC_FULL.md §4.6);
/// this trait only carries the finished request across the collaborator
/// boundary.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, transcript: &str) -> StageResult<String>;
}

/// Fetches a transcript's raw text from the lecture host named in a
/// submission's `transcriptURL` (SPEC_FULL.md §4.6/§4.7). The host
/// whitelist check happens at admission (§4.7 step 1); this trait is
/// handed an already-validated URL.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, transcript_url: &str) -> StageResult<String>;
}

/// Dispatches the completion email the Video handler sends once a themed
/// render is published (SPEC_FULL.md §4.6 step 4).
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_video_ready(
        &self,
        to: &str,
        lecture_title: &str,
        theme: &str,
    ) -> StageResult<()>;
}
