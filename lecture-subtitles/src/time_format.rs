//! Post-tempo clock formatting (SPEC_FULL.md §4.5/§8).
//!
//! The final mux speeds the narration track up with `atempo=1.25`, so every
//! timestamp burned into the subtitle track has to be divided by the same
//! factor before it's formatted, or the subtitles drift out of sync with the
//! sped-up audio.

/// Playback speedup applied to the narration track during the video mux.
pub const TEMPO_SPEED: f64 = 1.25;

/// Convert a pre-tempo millisecond offset into an ASS `H:MM:SS.CC` timestamp
/// on the post-tempo clock. Matches the original's integer-division
/// decomposition: the tempo division happens first (as a float), then
/// everything after is truncating integer math.
pub fn format_ass_time(ms: u64) -> String {
    let scaled = (ms as f64 / TEMPO_SPEED) as u64;

    let hours = scaled / 3_600_000;
    let rem = scaled % 3_600_000;

    let minutes = rem / 60_000;
    let rem = rem % 60_000;

    let seconds = rem / 1_000;
    let rem = rem % 1_000;

    let hundredths = rem / 10;

    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, hundredths)
}
