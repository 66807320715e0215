use crate::word::SubtitleWord;

/// Max combined character count (words + inter-word spaces) per subtitle
/// line (SPEC_FULL.md §4.5).
pub const CHARS_PER_LINE: usize = 27;

/// Gap left between a line's close and the next line's open when a word
/// forces a line break (SPEC_FULL.md §4.5).
pub const LINE_GAP_MS: u64 = 10;

/// A packed subtitle line: a start/end span on the pre-tempo clock and the
/// words it contains, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleLine {
    pub start: u64,
    pub end: u64,
    pub words: Vec<SubtitleWord>,
}

impl SubtitleLine {
    fn starting_with(word: SubtitleWord, start: u64) -> Self {
        Self {
            start,
            end: 0,
            words: vec![word],
        }
    }

    /// Words joined with a single space, matching the character budget used
    /// while packing.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn char_count(&self) -> usize {
        self.words.iter().map(|w| w.value.chars().count()).sum::<usize>()
            + self.words.len().saturating_sub(1)
    }
}

/// Pack an ordered word list into lines no wider than [`CHARS_PER_LINE`]
/// characters, per SPEC_FULL.md §4.5's line-packing algorithm. `max_duration_ms`
/// closes the final line. Returns an empty list for an empty `words`.
pub fn pack_lines(words: &[SubtitleWord], max_duration_ms: u64) -> Vec<SubtitleLine> {
    let mut lines = Vec::new();
    let mut iter = words.iter();

    let Some(first) = iter.next() else {
        return lines;
    };
    let mut current = SubtitleLine::starting_with(first.clone(), first.time);

    for word in iter {
        let candidate_len = word.value.chars().count();
        if current.char_count() + candidate_len + 1 <= CHARS_PER_LINE {
            current.words.push(word.clone());
        } else {
            current.end = word.time.saturating_sub(LINE_GAP_MS);
            lines.push(current);
            current = SubtitleLine::starting_with(word.clone(), word.time + LINE_GAP_MS);
        }
    }

    current.end = max_duration_ms;
    lines.push(current);
    lines
}
