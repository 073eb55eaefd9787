//! # WebVTT-style transcript parsing
//!
//! Turns raw subtitle text into a flat, ordered list of [`Cue`]s: one record
//! per timestamp block, carrying the display timestamp, the speaker label
//! (verbatim, unresolved) and the concatenated caption text.
//!
//! The parser is deliberately infallible. Caption files in the wild are
//! sloppy (mixed timestamp shapes, missing attributions, auto-caption
//! boilerplate), so malformed lines degrade (empty timestamp, empty label)
//! instead of aborting the whole import.

mod time;

use std::sync::LazyLock;

use regex::Regex;

pub use time::normalize_timestamp;

/// One raw cue from the source file, before sentence re-segmentation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, specta::Type)]
pub struct Cue {
    /// Concatenated caption text for this cue.
    pub text: String,
    /// Display timestamp (`hh:mm:ss.mmm`, zero hours dropped), or empty if
    /// the cue line carried no parseable timestamp.
    pub time: String,
    /// Raw speaker label, or empty for unattributed lines.
    pub speaker: String,
}

/// Auto-caption credit lines that leak into community-subtitled tracks.
/// They are boilerplate, not speech, so they parse to empty text.
const DISCLAIMERS: [&str; 2] = [
    "Subtitles by the Amara.org community",
    "Untertitel der Amara.org-Community",
];

static TIMESTAMP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d\d:\d\d").expect("valid regex"));

static SPEAKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]+): (.*)$").expect("valid regex"));

/// Number of preamble lines before the first cue (`WEBVTT` magic + blank).
const HEADER_LINES: usize = 2;

/// Parse raw subtitle text into an ordered cue list.
///
/// Each line after the fixed header is classified, in priority order, as a
/// timestamp line (starts a new cue), a speaker-prefixed line (`Label: text`,
/// label colon-free), or a continuation line (appended to the current cue).
/// Cues with no accumulated text are dropped at flush time.
pub fn parse(input: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut current = Cue::default();

    for line in input.lines().skip(HEADER_LINES) {
        if TIMESTAMP_LINE.is_match(line) {
            flush(&mut cues, &mut current);
            let raw = line.split_whitespace().next().unwrap_or(line);
            current.time = normalize_timestamp(raw);
        } else if let Some(caps) = SPEAKER_LINE.captures(line) {
            current.speaker = caps[1].to_string();
            append_text(&mut current, &caps[2]);
        } else {
            append_text(&mut current, line);
        }
    }

    flush(&mut cues, &mut current);
    cues
}

fn append_text(cue: &mut Cue, text: &str) {
    if DISCLAIMERS.contains(&text) {
        return;
    }
    if !cue.text.is_empty() && !text.is_empty() {
        cue.text.push(' ');
    }
    cue.text.push_str(text);
}

fn flush(cues: &mut Vec<Cue>, current: &mut Cue) {
    let cue = std::mem::take(current);
    if !cue.text.is_empty() {
        cues.push(cue);
    }
}
