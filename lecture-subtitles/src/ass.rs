//! ASS subtitle document assembly (SPEC_FULL.md §4.5/§6).

use crate::line::SubtitleLine;
use crate::time_format::format_ass_time;

/// Active-word highlight color. Written verbatim per SPEC_FULL.md §4.5; not
/// derived from any palette.
const HIGHLIGHT_COLOR: &str = "&HF755A8&";
const WHITE: &str = "&HFFFFFF&";

const SCRIPT_INFO: &str = "[Script Info]\nPlayResX: 1080\nPlayResY: 1920\nWrapStyle: 0\n\n";

const STYLES_HEADER: &str =
    "[V4+ Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\nStyle: Default,Berlin Sans FB,50,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,4,4,2,10,10,10,1\n\n";

const EVENTS_HEADER: &str = "[Events]\nFormat: Layer, Start, End, Style, Text\n";

/// Render a full ASS document for `lines`. An empty `lines` list still
/// produces a valid, parsable document with zero `Dialogue` events.
pub fn assemble(lines: &[SubtitleLine]) -> String {
    let mut out = String::new();
    out.push_str(SCRIPT_INFO);
    out.push_str(STYLES_HEADER);
    out.push_str(EVENTS_HEADER);

    for line in lines {
        out.push_str(&render_dialogue(line));
        out.push('\n');
    }

    out
}

/// One `Dialogue:` line: an anchored scale/fade intro, then a per-word
/// karaoke highlight toggle offset from `line.start`.
fn render_dialogue(line: &SubtitleLine) -> String {
    let start = format_ass_time(line.start);
    let end = format_ass_time(line.end);

    let intro = "\\an5\\pos(540,960)\\fscx160\\fscy160\\alpha&HFF&\
\\t(0,35,\\alpha&H00&)\\t(0,35,\\fscx220\\fscy220)\\t(35,75,\\fscx200\\fscy200)";

    let mut text = String::new();
    let word_count = line.words.len();
    for (idx, word) in line.words.iter().enumerate() {
        let on = word.time.saturating_sub(line.start);
        let off = if idx + 1 < word_count {
            line.words[idx + 1].time.saturating_sub(line.start)
        } else {
            line.end.saturating_sub(line.start)
        };

        text.push_str(&format!(
            "{{\\t({on},{on},\\1c{HIGHLIGHT_COLOR})\\t({off},{off},\\1c{WHITE})}}{value}",
            on = on,
            off = off,
            value = word.value,
        ));
        if idx + 1 < word_count {
            text.push(' ');
        }
    }

    format!("Dialogue: 0,{start},{end},Default,{{{intro}}}{text}")
}
