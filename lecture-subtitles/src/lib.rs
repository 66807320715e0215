//! Subtitle Assembler (SPEC_FULL.md §4.5): turns a speech provider's
//! word-marks stream into an animated ASS subtitle document on the
//! post-tempo clock.

pub mod ass;
pub mod line;
pub mod time_format;
pub mod word;

pub use ass::assemble;
pub use line::{pack_lines, SubtitleLine, CHARS_PER_LINE, LINE_GAP_MS};
pub use time_format::{format_ass_time, TEMPO_SPEED};
pub use word::{parse_word_marks, to_word_marks, SubtitleWord};

/// Run the full pipeline from a word-marks NDJSON blob to a finished ASS
/// document: parse, pack into lines, render.
pub fn assemble_from_word_marks(ndjson: &[u8], max_duration_ms: u64) -> Result<String, serde_json::Error> {
    let words = parse_word_marks(ndjson)?;
    let lines = pack_lines(&words, max_duration_ms);
    Ok(assemble(&lines))
}
