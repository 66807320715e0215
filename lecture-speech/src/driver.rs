use std::sync::Arc;
use std::time::Duration;

use lecture_artifacts::ArtifactAdapter;
use tracing::{debug, warn};

use crate::error::{SpeechError, SpeechResult};
use crate::provider::{SynthesisFormat, SynthesisProvider, SynthesisStatus};

/// Polling policy bounds from SPEC_FULL.md §4.4: a fixed tick somewhere in
/// [5s, 10s] and an overall deadline somewhere in [2min, 5min].
#[derive(Debug, Clone, Copy)]
pub struct PollingPolicy {
    pub tick: Duration,
    pub deadline: Duration,
}

impl PollingPolicy {
    pub fn new(tick: Duration, deadline: Duration) -> Self {
        Self { tick, deadline }
    }
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(7),
            deadline: Duration::from_secs(180),
        }
    }
}

/// Drives a [`SynthesisProvider`] through submit, poll-to-completion, and the
/// provisional-to-canonical rename, per SPEC_FULL.md §4.4. Side-effectful
/// only through the artifact store; never touches registry state.
pub struct SpeechSynthesisDriver {
    provider: Arc<dyn SynthesisProvider>,
    artifacts: ArtifactAdapter,
    policy: PollingPolicy,
    default_voice: String,
    default_engine: String,
}

impl SpeechSynthesisDriver {
    /// `default_voice`/`default_engine` mirror the original source's
    /// hardcoded "Joey"/"standard" — exposed here as constructor parameters
    /// rather than literals so a caller can point at a different voice.
    pub fn new(
        provider: Arc<dyn SynthesisProvider>,
        artifacts: ArtifactAdapter,
        policy: PollingPolicy,
        default_voice: impl Into<String>,
        default_engine: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            artifacts,
            policy,
            default_voice: default_voice.into(),
            default_engine: default_engine.into(),
        }
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }

    /// Submit `text` for synthesis and poll until the provider reports a
    /// terminal state or the deadline passes, then rename the provisional
    /// artifact into `final_key`. Returns once the canonical key exists.
    pub async fn synthesize_to(
        &self,
        text: &str,
        format: SynthesisFormat,
        key_prefix: &str,
        final_key: &str,
    ) -> SpeechResult<()> {
        let task_id = self
            .provider
            .submit(text, format, &self.default_voice, key_prefix)
            .await?;
        debug!(task_id = %task_id, key_prefix, "submitted synthesis task");

        let started = tokio::time::Instant::now();
        loop {
            if started.elapsed() >= self.policy.deadline {
                return Err(SpeechError::SynthesisTimeout {
                    elapsed_secs: started.elapsed().as_secs(),
                    deadline_secs: self.policy.deadline.as_secs(),
                });
            }

            match self.provider.poll(&task_id).await? {
                SynthesisStatus::Pending => {
                    tokio::time::sleep(self.policy.tick).await;
                    continue;
                }
                SynthesisStatus::Completed { provisional_key } => {
                    self.artifacts.finalize(&provisional_key, final_key).await?;
                    debug!(task_id = %task_id, final_key, "synthesis task finalized");
                    return Ok(());
                }
                SynthesisStatus::Failed { reason } => {
                    warn!(task_id = %task_id, reason = %reason, "synthesis task failed");
                    return Err(SpeechError::SynthesisFailed(reason));
                }
            }
        }
    }
}
