//! Speaker roster derivation.
//!
//! Raw speaker labels are free-form strings; the editing model wants a
//! stable integer identity per speaker. The roster is the ordered list of
//! distinct labels in first-occurrence order, and that order *is* the id.

use std::sync::LazyLock;

use regex::Regex;
use scriv_vtt::Cue;

use crate::types::{Cell, Speaker};

/// Display colors cycled over roster positions. Tokens are opaque to the
/// core; these happen to be hex so the demo can print them.
pub const PALETTE: [&str; 8] = [
    "#e06c75", "#61afef", "#98c379", "#e5c07b", "#c678dd", "#56b6c2", "#d19a66", "#abb2bf",
];

/// Machine-diarization labels like `[SPEAKER_01]`.
static DIARIZED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[SPEAKER_0(\d)\]$").expect("valid regex"));

/// Rewrite a diarized `[SPEAKER_0<d>]` label to `Speaker_<d>`, so it can
/// merge with an equivalent hand-written label appearing elsewhere in the
/// same transcript. All other labels pass through unchanged.
pub fn canonicalize_label(label: &str) -> String {
    match DIARIZED_LABEL.captures(label) {
        Some(caps) => format!("Speaker_{}", &caps[1]),
        None => label.to_string(),
    }
}

pub fn palette_color(index: usize) -> String {
    PALETTE[index % PALETTE.len()].to_string()
}

/// The roster a cleared session starts with.
pub fn default_roster() -> Vec<Speaker> {
    vec![
        Speaker {
            name: "Speaker 1".to_string(),
            color: palette_color(0),
        },
        Speaker {
            name: "Speaker 2".to_string(),
            color: palette_color(1),
        },
    ]
}

/// Resolve sentence-level cues into `(roster, cells)`.
///
/// Distinct (canonicalized) labels get ids in first-occurrence order and a
/// palette color by position. Empty labels become unassigned cells. Cached
/// display fields are filled from the roster.
pub fn resolve(sentences: &[Cue]) -> (Vec<Speaker>, Vec<Cell>) {
    let mut roster: Vec<Speaker> = Vec::new();
    let mut cells = Vec::with_capacity(sentences.len());

    for sentence in sentences {
        let label = canonicalize_label(&sentence.speaker);

        let speaker_id = if label.is_empty() {
            None
        } else {
            Some(intern(&mut roster, label))
        };

        let mut cell = Cell {
            text: sentence.text.clone(),
            time: sentence.time.clone(),
            speaker_id,
            ..Default::default()
        };
        cell.refresh_cache(&roster);
        cells.push(cell);
    }

    (roster, cells)
}

fn intern(roster: &mut Vec<Speaker>, name: String) -> usize {
    match roster.iter().position(|s| s.name == name) {
        Some(id) => id,
        None => {
            roster.push(Speaker {
                color: palette_color(roster.len()),
                name,
            });
            roster.len() - 1
        }
    }
}
