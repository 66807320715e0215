use async_trait::async_trait;

use crate::error::SpeechResult;

/// What kind of output a synthesis task should produce (SPEC_FULL.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisFormat {
    Mp3,
    SpeechMarks,
}

/// Handle returned by a provider on submission; opaque to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SynthesisTaskId(pub String);

impl SynthesisTaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SynthesisTaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a polled task currently stands. `Completed` carries the provisional
/// artifact key the provider wrote its output to — the driver is the one
/// that renames it into the canonical key, per §4.4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisStatus {
    Pending,
    Completed { provisional_key: String },
    Failed { reason: String },
}

/// Abstracts the external text-to-speech service (the original source's AWS
/// Polly client). A driver is generic over this trait so tests can swap in a
/// fake that completes immediately or on a scripted schedule.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    async fn submit(
        &self,
        text: &str,
        format: SynthesisFormat,
        voice: &str,
        key_prefix: &str,
    ) -> SpeechResult<SynthesisTaskId>;

    async fn poll(&self, task_id: &SynthesisTaskId) -> SpeechResult<SynthesisStatus>;
}
