/// One editable sentence-level transcript row.
///
/// `speaker_name` / `speaker_color` are read caches over the roster entry at
/// `speaker_id`. They exist so renderers never index the roster themselves,
/// and they must only ever be rebuilt via [`Cell::refresh_cache`], never
/// edited independently.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, specta::Type)]
pub struct Cell {
    pub text: String,
    /// Display timestamp (`hh:mm:ss.mmm`, zero hours dropped). Only the
    /// first cell produced from a source cue carries one; the rest are empty.
    pub time: String,
    /// Index into [`SessionState::roster`], or `None` for unattributed text.
    pub speaker_id: Option<usize>,
    pub speaker_name: String,
    pub speaker_color: String,
    /// Externally computed semantic-search score in `[0, 1]`. The core only
    /// stores it; see `EditAction::AttachSimilarities`.
    pub similarity: Option<f64>,
}

impl Cell {
    /// Rebuild the cached display fields from the roster. A `speaker_id`
    /// that no longer resolves clears the cache rather than leaving stale
    /// text behind.
    pub fn refresh_cache(&mut self, roster: &[Speaker]) {
        match self.speaker_id.and_then(|id| roster.get(id)) {
            Some(speaker) => {
                self.speaker_name = speaker.name.clone();
                self.speaker_color = speaker.color.clone();
            }
            None => {
                self.speaker_name.clear();
                self.speaker_color.clear();
            }
        }
    }
}

/// One entry of the speaker roster.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, specta::Type)]
pub struct Speaker {
    pub name: String,
    /// Display color token. Opaque to the core; renderers decide what it
    /// means.
    pub color: String,
}

/// The whole editing session: the single source of truth the reducer owns.
///
/// Every edit produces a new value; a state handed out to a reader is never
/// mutated afterwards. Readers derive ([`crate::view::compact`]), they do
/// not write.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, specta::Type)]
pub struct SessionState {
    pub cells: Vec<Cell>,
    pub roster: Vec<Speaker>,
    /// Single-slot clipboard for cut/copy/paste. Holds at most one cell.
    pub clipboard: Option<Cell>,
    /// Position of the cell currently targeted for editing, if any.
    pub focus: Option<usize>,
}

impl SessionState {
    /// Build the initial session from parsed cues: re-segment into
    /// sentences, then resolve speaker labels into the roster.
    pub fn from_cues(cues: &[scriv_vtt::Cue]) -> Self {
        let sentences = crate::segment::sentences(cues);
        let (roster, cells) = crate::speakers::resolve(&sentences);
        Self {
            cells,
            roster,
            clipboard: None,
            focus: None,
        }
    }

    /// Convenience for the full load path: parse raw subtitle text and
    /// build the session in one step.
    pub fn from_vtt(input: &str) -> Self {
        Self::from_cues(&scriv_vtt::parse(input))
    }
}

/// Derived paragraph-merged projection of the cell list. Recomputed on
/// demand by [`crate::view::compact`]; never the source of truth.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, specta::Type)]
pub struct CompactView {
    pub cells: Vec<Cell>,
    /// [`SessionState::focus`] translated into block coordinates.
    pub focus: Option<usize>,
}
