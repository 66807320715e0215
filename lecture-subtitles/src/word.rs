use serde::{Deserialize, Serialize};

/// A single word-level timing mark from the speech provider's word-marks
/// stream (SPEC_FULL.md §3/§6): `{ "time": <ms>, "value": <string> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleWord {
    pub time: u64,
    pub value: String,
}

/// Parse `Words.marks` — NDJSON, one [`SubtitleWord`] per line — without
/// buffering the stream as a single JSON array (SPEC_FULL.md §10.5).
/// Blank lines are skipped so a trailing newline doesn't error.
pub fn parse_word_marks(ndjson: &[u8]) -> Result<Vec<SubtitleWord>, serde_json::Error> {
    let text = String::from_utf8_lossy(ndjson);
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str::<SubtitleWord>)
        .collect()
}

/// Re-serialize as NDJSON, the inverse of [`parse_word_marks`].
pub fn to_word_marks(words: &[SubtitleWord]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    for word in words {
        out.extend_from_slice(serde_json::to_string(word)?.as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_object_per_line() {
        let ndjson = b"{\"time\":0,\"value\":\"Hello\"}\n{\"time\":250,\"value\":\"world\"}\n";
        let words = parse_word_marks(ndjson).unwrap();
        assert_eq!(
            words,
            vec![
                SubtitleWord { time: 0, value: "Hello".to_string() },
                SubtitleWord { time: 250, value: "world".to_string() },
            ]
        );
    }

    #[test]
    fn skips_trailing_blank_line() {
        let ndjson = b"{\"time\":0,\"value\":\"Hi\"}\n\n";
        assert_eq!(parse_word_marks(ndjson).unwrap().len(), 1);
    }

    #[test]
    fn round_trips_through_ndjson() {
        let words = vec![
            SubtitleWord { time: 0, value: "Hello".to_string() },
            SubtitleWord { time: 250, value: "world".to_string() },
        ];
        let bytes = to_word_marks(&words).unwrap();
        let reparsed = parse_word_marks(&bytes).unwrap();
        assert_eq!(words, reparsed);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert_eq!(parse_word_marks(b"").unwrap(), Vec::new());
    }
}
