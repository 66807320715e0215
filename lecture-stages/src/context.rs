//! Shared execution context every stage handler receives (this crate's
//! analogue of the teacher's per-service dependency bundle). All three job
//! types in this crate are registered against the same [`lecture_queue::JobRegistry`]
//! and therefore must share one concrete `Job::Context` type — see
//! SPEC_FULL.md §4.3's worker-pool model and `lecture-queue`'s
//! `ConcreteJobHandler` downcast.

use std::path::PathBuf;
use std::sync::Arc;

use lecture_artifacts::ArtifactAdapter;
use lecture_queue::backend::memory::MemoryBackend;
use lecture_queue::QueueAdapter;
use lecture_registry::RegistryBackend;
use lecture_speech::SpeechSynthesisDriver;

use crate::collaborators::{EmailSender, LlmClient, TranscriptFetcher};

/// The queue adapter concrete type every stage handler enqueues through.
/// `lecture-queue` ships exactly one working [`lecture_queue::QueueBackend`]
/// (`MemoryBackend` — the others are feature-gated stubs with no
/// implementation behind them yet), so there is nothing to be generic over.
pub type StageQueueAdapter = QueueAdapter<MemoryBackend>;

/// Everything a Notes/Summary/Video handler needs beyond its own payload.
pub struct StageContext {
    pub artifacts: ArtifactAdapter,
    pub registry: Arc<dyn RegistryBackend>,
    pub queue: Arc<StageQueueAdapter>,
    pub speech: Arc<SpeechSynthesisDriver>,
    pub llm: Arc<dyn LlmClient>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
    pub email: Arc<dyn EmailSender>,
    /// Root directory holding the closed set of theme background clips,
    /// `{themes_dir}/{backgroundVideo}.mp4` (SPEC_FULL.md §4.6 step 3).
    pub themes_dir: PathBuf,
    /// `FFMPEG_BIN`/`FFPROBE_BIN` (SPEC_FULL.md §6), defaulting to the bare
    /// names so `PATH` resolution applies.
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    /// Optional semi-transparent top-right overlay (SPEC_FULL.md §4.6 step
    /// 3). `None` skips the overlay filter entirely.
    pub logo_path: Option<PathBuf>,
}

impl Clone for StageContext {
    fn clone(&self) -> Self {
        Self {
            artifacts: self.artifacts.clone(),
            registry: self.registry.clone(),
            queue: self.queue.clone(),
            speech: self.speech.clone(),
            llm: self.llm.clone(),
            transcripts: self.transcripts.clone(),
            email: self.email.clone(),
            themes_dir: self.themes_dir.clone(),
            ffmpeg_bin: self.ffmpeg_bin.clone(),
            ffprobe_bin: self.ffprobe_bin.clone(),
            logo_path: self.logo_path.clone(),
        }
    }
}
