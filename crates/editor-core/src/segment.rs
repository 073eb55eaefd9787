//! Sentence re-segmentation.
//!
//! Source cues follow caption timing, not grammar: a cue may hold several
//! sentences, or stop mid-sentence and continue in the next cue. This pass
//! rewrites the cue list so each record holds at most one complete sentence,
//! stitching incomplete tails onto the head of the following cue.

use scriv_vtt::Cue;

/// Titles that end with a period without ending the sentence.
const ABBREVIATIONS: [&str; 3] = ["Mr", "Ms", "Mrs"];

const TERMINALS: [char; 3] = ['.', '?', '!'];

/// Re-segment parsed cues into sentence-level cues.
///
/// Each output cue inherits its source cue's speaker label. Only the first
/// sentence emitted from a cue keeps the cue's timestamp, and only when it
/// was not stitched onto the previous cue's unfinished sentence; a stitched
/// continuation already lives in a timestamped record.
pub fn sentences(cues: &[Cue]) -> Vec<Cue> {
    let mut out: Vec<Cue> = Vec::new();
    let mut prev_complete = true;

    for cue in cues {
        let mut candidates = split_sentences(&cue.text);
        let mut stitched = false;

        if !prev_complete && !candidates.is_empty() {
            if let Some(last) = out.last_mut() {
                let head = candidates.remove(0);
                last.text = format!("{} {}", last.text.trim(), head.trim())
                    .trim()
                    .to_string();
                stitched = true;
            }
        }

        for (i, text) in candidates.into_iter().enumerate() {
            let time = if i == 0 && !stitched {
                cue.time.clone()
            } else {
                String::new()
            };
            out.push(Cue {
                text,
                time,
                speaker: cue.speaker.clone(),
            });
        }

        if let Some(last) = out.last() {
            prev_complete = last.text.contains(TERMINALS);
        }
    }

    out
}

/// Split text at terminal punctuation (`.?!`) followed by whitespace and an
/// upper-case letter, keeping the punctuation with the left side.
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut start = 0;

    for (k, &(i, c)) in chars.iter().enumerate() {
        if !TERMINALS.contains(&c) {
            continue;
        }

        let mut j = k + 1;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        let followed_by_upper = j > k + 1 && j < chars.len() && chars[j].1.is_uppercase();
        if !followed_by_upper {
            continue;
        }

        if c == '.' && ends_with_abbreviation(&text[start..i]) {
            continue;
        }

        let sentence = text[start..i + c.len_utf8()].trim();
        if !sentence.is_empty() {
            out.push(sentence.to_string());
        }
        start = chars[j].0;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }

    out
}

fn ends_with_abbreviation(prefix: &str) -> bool {
    let last_word = prefix
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("");
    ABBREVIATIONS.contains(&last_word)
}
