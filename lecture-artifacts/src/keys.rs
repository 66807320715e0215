//! The deterministic key scheme SPEC_FULL.md §3/§4.1/§6 names: derived
//! artifacts live at `assets/{entryID}/{name}`, and a synthesis provider's
//! in-flight output lands at a provisional key until the driver renames it
//! into place.

/// Key for a finished derived artifact belonging to a transcript entry.
pub fn asset_key(entry_id: &str, name: &str) -> String {
    format!("assets/{entry_id}/{name}")
}

pub fn notes_key(entry_id: &str) -> String {
    asset_key(entry_id, "Notes.md")
}

pub fn summary_key(entry_id: &str) -> String {
    asset_key(entry_id, "Summary.txt")
}

pub fn audio_key(entry_id: &str) -> String {
    asset_key(entry_id, "Audio.mp3")
}

pub fn words_key(entry_id: &str) -> String {
    asset_key(entry_id, "Words.marks")
}

pub fn subtitles_key(entry_id: &str) -> String {
    asset_key(entry_id, "Subtitles.ass")
}

/// `{theme}.mp4`, scoped under the entry's own prefix (SPEC_FULL.md §3/§6).
pub fn video_key(entry_id: &str, theme: &str) -> String {
    asset_key(entry_id, &format!("{theme}.mp4"))
}

/// Provisional key a synthesis task writes its audio to before the result is
/// known good. Named after the task rather than the entry so concurrent
/// retries of the same entry never collide.
pub fn provisional_audio_key(task_id: &str) -> String {
    format!("Audio-.{task_id}.mp3")
}

/// Provisional key for a word-marks synthesis output (SPEC_FULL.md §6).
pub fn provisional_words_key(task_id: &str) -> String {
    format!("Words-.{task_id}.marks")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_keys_are_scoped_by_entry() {
        assert_eq!(notes_key("E1"), "assets/E1/Notes.md");
        assert_eq!(summary_key("E1"), "assets/E1/Summary.txt");
        assert_eq!(audio_key("E1"), "assets/E1/Audio.mp3");
        assert_eq!(words_key("E1"), "assets/E1/Words.marks");
        assert_eq!(subtitles_key("E1"), "assets/E1/Subtitles.ass");
        assert_eq!(video_key("E1", "subway"), "assets/E1/subway.mp4");
    }

    #[test]
    fn provisional_keys_are_not_entry_scoped() {
        assert_eq!(provisional_audio_key("task-123"), "Audio-.task-123.mp3");
        assert_eq!(provisional_words_key("task-123"), "Words-.task-123.marks");
    }
}
