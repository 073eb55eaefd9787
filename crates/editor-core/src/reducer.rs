//! The session state machine.
//!
//! One action in, one new state out. The input state is never mutated, so a
//! snapshot handed to a reader stays valid across any number of later edits.
//! Every returned state upholds the structural invariants: each assigned
//! `speaker_id` resolves to a roster entry, cached display fields match the
//! roster, and roster removals cascade through the cell list.

use crate::speakers;
use crate::types::{Cell, SessionState, Speaker};

/// The closed set of edits the reducer accepts.
///
/// Serialized form is tagged so the host application can forward actions
/// from the presentation layer as plain JSON.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, specta::Type)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditAction {
    /// Point the cell at `index` to roster entry `speaker` (or unassign).
    AssignSpeaker {
        index: usize,
        speaker: Option<usize>,
    },
    /// Replace the text of the cell at `index`; no other field changes.
    UpdateText { index: usize, text: String },
    /// Insert an empty, unassigned cell before `index` (`index == len`
    /// appends).
    AddCell { index: usize },
    /// Remove the cell at `index` and splice in zero or more replacements.
    /// Used when a sub-span of a cell gets its own speaker: the caller
    /// splits the text into up to three fragments and decides which
    /// fragment, if any, keeps the removed cell's timestamp.
    ReplaceCell { index: usize, cells: Vec<Cell> },
    /// Move the cell at `index` into the clipboard, overwriting whatever
    /// the clipboard held.
    CutCell { index: usize },
    /// Copy the cell at `index` into the clipboard without removing it.
    CopyCell { index: usize },
    /// Insert a copy of the clipboard cell before `index`. No-op while the
    /// clipboard is empty.
    PasteCell { index: usize },
    /// Replace the roster wholesale for in-place rename/recolor. The new
    /// roster must have the same length; shrinking or reordering through
    /// this action would dangle cell references; use [`Self::DeleteSpeaker`]
    /// to shrink.
    SetRoster { roster: Vec<Speaker> },
    /// Remove roster entry `id`. Cells pointing at it are reassigned to
    /// `replacement` (or unassigned); cells pointing above it shift down by
    /// one so ids stay contiguous. When collapsing several entries at once,
    /// delete the highest-indexed entries first.
    DeleteSpeaker {
        id: usize,
        replacement: Option<usize>,
    },
    /// For every set of roster entries sharing a name, keep the
    /// lowest-indexed one and fold the others into it.
    CollapseRosterByName,
    /// Replace the whole session with externally supplied content (import,
    /// persisted state). Cells whose `speaker_id` falls outside `roster`
    /// either grow the roster with placeholder entries (`pad_roster`) or
    /// are force-unassigned.
    LoadTranscript {
        cells: Vec<Cell>,
        roster: Vec<Speaker>,
        pad_roster: bool,
    },
    /// Reset to an empty cell list and the default two-speaker roster.
    Clear,
    /// Record which cell should receive editing focus.
    SetFocus { focus: Option<usize> },
    /// Attach externally computed similarity scores, one per cell in order.
    AttachSimilarities { scores: Vec<f64> },
}

/// Contract violations in reducer actions. These are programmer errors on
/// the caller's side: the state is returned unchanged and the caller
/// should treat the error as a bug, not retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("cell index {index} out of range (len {len})")]
    CellOutOfRange { index: usize, len: usize },
    #[error("speaker id {id} out of range (roster len {len})")]
    SpeakerOutOfRange { id: usize, len: usize },
    #[error("replacement speaker {id} is the entry being deleted")]
    ReplacementIsDeleted { id: usize },
    #[error("roster replacement must keep length {expected}, got {got}")]
    RosterLengthMismatch { expected: usize, got: usize },
    #[error("got {got} similarity scores for {expected} cells")]
    SimilarityLengthMismatch { expected: usize, got: usize },
}

impl SessionState {
    /// Apply one action, producing the next state. `self` is untouched.
    pub fn apply(&self, action: EditAction) -> Result<SessionState, EditError> {
        let mut next = self.clone();

        match action {
            EditAction::AssignSpeaker { index, speaker } => {
                check_cell(&next.cells, index)?;
                if let Some(id) = speaker {
                    check_speaker(&next.roster, id)?;
                }
                next.cells[index].speaker_id = speaker;
                next.cells[index].refresh_cache(&next.roster);
            }

            EditAction::UpdateText { index, text } => {
                check_cell(&next.cells, index)?;
                next.cells[index].text = text;
            }

            EditAction::AddCell { index } => {
                check_insert(&next.cells, index)?;
                next.cells.insert(index, Cell::default());
            }

            EditAction::ReplaceCell { index, mut cells } => {
                check_cell(&next.cells, index)?;
                for cell in &mut cells {
                    if let Some(id) = cell.speaker_id {
                        check_speaker(&next.roster, id)?;
                    }
                    cell.refresh_cache(&next.roster);
                }
                next.cells.splice(index..=index, cells);
            }

            EditAction::CutCell { index } => {
                check_cell(&next.cells, index)?;
                next.clipboard = Some(next.cells.remove(index));
            }

            EditAction::CopyCell { index } => {
                check_cell(&next.cells, index)?;
                next.clipboard = Some(next.cells[index].clone());
            }

            EditAction::PasteCell { index } => {
                check_insert(&next.cells, index)?;
                if let Some(cell) = next.clipboard.clone() {
                    next.cells.insert(index, cell);
                }
            }

            EditAction::SetRoster { roster } => {
                if roster.len() != next.roster.len() {
                    return Err(EditError::RosterLengthMismatch {
                        expected: next.roster.len(),
                        got: roster.len(),
                    });
                }
                next.roster = roster;
                refresh_all(&mut next);
            }

            EditAction::DeleteSpeaker { id, replacement } => {
                check_speaker(&next.roster, id)?;
                if let Some(r) = replacement {
                    check_speaker(&next.roster, r)?;
                    if r == id {
                        return Err(EditError::ReplacementIsDeleted { id });
                    }
                }
                delete_speaker(&mut next, id, replacement);
            }

            EditAction::CollapseRosterByName => {
                collapse_by_name(&mut next);
            }

            EditAction::LoadTranscript {
                cells,
                roster,
                pad_roster,
            } => {
                next = load(cells, roster, pad_roster);
            }

            EditAction::Clear => {
                next = SessionState {
                    cells: Vec::new(),
                    roster: speakers::default_roster(),
                    clipboard: None,
                    focus: None,
                };
            }

            EditAction::SetFocus { focus } => {
                if let Some(index) = focus {
                    check_cell(&next.cells, index)?;
                }
                next.focus = focus;
            }

            EditAction::AttachSimilarities { scores } => {
                if scores.len() != next.cells.len() {
                    return Err(EditError::SimilarityLengthMismatch {
                        expected: next.cells.len(),
                        got: scores.len(),
                    });
                }
                for (cell, score) in next.cells.iter_mut().zip(scores) {
                    cell.similarity = Some(score);
                }
            }
        }

        // removals can orphan the focus; drop it rather than let it point
        // past the end
        if next.focus.is_some_and(|f| f >= next.cells.len()) {
            next.focus = None;
        }

        Ok(next)
    }
}

fn check_cell(cells: &[Cell], index: usize) -> Result<(), EditError> {
    if index < cells.len() {
        Ok(())
    } else {
        Err(EditError::CellOutOfRange {
            index,
            len: cells.len(),
        })
    }
}

/// Insertion positions include one-past-the-end.
fn check_insert(cells: &[Cell], index: usize) -> Result<(), EditError> {
    if index <= cells.len() {
        Ok(())
    } else {
        Err(EditError::CellOutOfRange {
            index,
            len: cells.len(),
        })
    }
}

fn check_speaker(roster: &[Speaker], id: usize) -> Result<(), EditError> {
    if id < roster.len() {
        Ok(())
    } else {
        Err(EditError::SpeakerOutOfRange {
            id,
            len: roster.len(),
        })
    }
}

fn refresh_all(state: &mut SessionState) {
    for cell in &mut state.cells {
        cell.refresh_cache(&state.roster);
    }
    if let Some(clipboard) = &mut state.clipboard {
        clipboard.refresh_cache(&state.roster);
    }
}

/// Remove roster entry `id` and cascade through every cell: reassign exact
/// matches to `replacement`, shift higher ids down, then rebuild caches.
/// `replacement` is interpreted against the roster *before* removal.
fn delete_speaker(state: &mut SessionState, id: usize, replacement: Option<usize>) {
    let clipboard = state.clipboard.iter_mut();
    for cell in state.cells.iter_mut().chain(clipboard) {
        match cell.speaker_id {
            Some(s) if s == id => cell.speaker_id = replacement,
            _ => {}
        }
        if let Some(s) = cell.speaker_id {
            if s > id {
                cell.speaker_id = Some(s - 1);
            }
        }
    }

    state.roster.remove(id);
    refresh_all(state);
}

/// Fold duplicate-named roster entries into their lowest-indexed twin,
/// walking from the top so earlier removals cannot shift the indices still
/// to be processed.
fn collapse_by_name(state: &mut SessionState) {
    let mut i = state.roster.len();
    while i > 0 {
        i -= 1;
        let twin = state.roster[..i]
            .iter()
            .position(|s| s.name == state.roster[i].name);
        if let Some(keep) = twin {
            delete_speaker(state, i, Some(keep));
        }
    }
}

/// Install externally supplied session content, recovering from a roster
/// that drifted out of sync with the cells (forward-compatibility for
/// persisted states).
fn load(mut cells: Vec<Cell>, mut roster: Vec<Speaker>, pad_roster: bool) -> SessionState {
    let highest = cells.iter().filter_map(|c| c.speaker_id).max();

    if let Some(max_id) = highest {
        if max_id >= roster.len() {
            if pad_roster {
                tracing::warn!(
                    max_id,
                    roster_len = roster.len(),
                    "roster_padded_on_load"
                );
                while roster.len() <= max_id {
                    roster.push(Speaker {
                        name: format!("Speaker {}", roster.len() + 1),
                        color: speakers::palette_color(roster.len()),
                    });
                }
            } else {
                tracing::warn!(
                    max_id,
                    roster_len = roster.len(),
                    "out_of_range_speakers_unassigned_on_load"
                );
                for cell in &mut cells {
                    if cell.speaker_id.is_some_and(|id| id >= roster.len()) {
                        cell.speaker_id = None;
                    }
                }
            }
        }
    }

    for cell in &mut cells {
        cell.refresh_cache(&roster);
    }

    SessionState {
        cells,
        roster,
        clipboard: None,
        focus: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker(name: &str) -> Speaker {
        Speaker {
            name: name.to_string(),
            color: speakers::palette_color(0),
        }
    }

    fn cell(text: &str, speaker_id: Option<usize>) -> Cell {
        Cell {
            text: text.to_string(),
            speaker_id,
            ..Default::default()
        }
    }

    /// Three cells over a two-entry roster, caches filled.
    fn state() -> SessionState {
        let mut state = SessionState {
            cells: vec![
                cell("one", Some(0)),
                cell("two", Some(1)),
                cell("three", None),
            ],
            roster: vec![speaker("Alice"), speaker("Bob")],
            clipboard: None,
            focus: None,
        };
        for cell in &mut state.cells {
            cell.refresh_cache(&state.roster);
        }
        state
    }

    fn assert_valid_state(state: &SessionState) {
        for cell in state.cells.iter().chain(state.clipboard.iter()) {
            match cell.speaker_id {
                Some(id) => {
                    assert!(id < state.roster.len(), "dangling speaker id {id}");
                    assert_eq!(cell.speaker_name, state.roster[id].name, "stale name cache");
                    assert_eq!(
                        cell.speaker_color, state.roster[id].color,
                        "stale color cache"
                    );
                }
                None => {
                    assert_eq!(cell.speaker_name, "");
                    assert_eq!(cell.speaker_color, "");
                }
            }
        }
        if let Some(focus) = state.focus {
            assert!(focus < state.cells.len(), "focus out of range");
        }
    }

    #[test]
    fn apply_leaves_the_input_state_untouched() {
        let before = state();
        let snapshot = before.clone();

        before
            .apply(EditAction::UpdateText {
                index: 0,
                text: "changed".into(),
            })
            .unwrap();

        assert_eq!(before, snapshot);
    }

    #[test]
    fn assign_speaker_rebuilds_cache() {
        let next = state()
            .apply(EditAction::AssignSpeaker {
                index: 2,
                speaker: Some(1),
            })
            .unwrap();

        assert_eq!(next.cells[2].speaker_id, Some(1));
        assert_eq!(next.cells[2].speaker_name, "Bob");
        assert_valid_state(&next);
    }

    #[test]
    fn assign_speaker_none_unassigns() {
        let next = state()
            .apply(EditAction::AssignSpeaker {
                index: 0,
                speaker: None,
            })
            .unwrap();

        assert_eq!(next.cells[0].speaker_id, None);
        assert_eq!(next.cells[0].speaker_name, "");
        assert_valid_state(&next);
    }

    #[test]
    fn assign_speaker_rejects_bad_indices() {
        assert_eq!(
            state().apply(EditAction::AssignSpeaker {
                index: 9,
                speaker: None
            }),
            Err(EditError::CellOutOfRange { index: 9, len: 3 })
        );
        assert_eq!(
            state().apply(EditAction::AssignSpeaker {
                index: 0,
                speaker: Some(7)
            }),
            Err(EditError::SpeakerOutOfRange { id: 7, len: 2 })
        );
    }

    #[test]
    fn update_text_changes_nothing_else() {
        let next = state()
            .apply(EditAction::UpdateText {
                index: 1,
                text: "rewritten".into(),
            })
            .unwrap();

        assert_eq!(next.cells[1].text, "rewritten");
        assert_eq!(next.cells[1].speaker_id, Some(1));
        assert_eq!(next.cells[1].speaker_name, "Bob");
        assert_valid_state(&next);
    }

    #[test]
    fn add_cell_at_len_appends() {
        let next = state().apply(EditAction::AddCell { index: 3 }).unwrap();

        assert_eq!(next.cells.len(), 4);
        assert_eq!(next.cells[3], Cell::default());
        assert_valid_state(&next);
    }

    #[test]
    fn add_cell_past_len_is_an_error() {
        assert_eq!(
            state().apply(EditAction::AddCell { index: 4 }),
            Err(EditError::CellOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn replace_cell_splices_fragments() {
        let next = state()
            .apply(EditAction::ReplaceCell {
                index: 1,
                cells: vec![cell("before", Some(1)), cell("selection", Some(0))],
            })
            .unwrap();

        let texts: Vec<_> = next.cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["one", "before", "selection", "three"]);
        // fragment caches are rebuilt on the way in
        assert_eq!(next.cells[1].speaker_name, "Bob");
        assert_eq!(next.cells[2].speaker_name, "Alice");
        assert_valid_state(&next);
    }

    #[test]
    fn replace_cell_with_nothing_deletes() {
        let next = state()
            .apply(EditAction::ReplaceCell {
                index: 1,
                cells: vec![],
            })
            .unwrap();

        assert_eq!(next.cells.len(), 2);
    }

    #[test]
    fn cut_then_paste_moves_a_cell() {
        let next = state().apply(EditAction::CutCell { index: 0 }).unwrap();
        assert_eq!(next.cells.len(), 2);
        assert_eq!(next.clipboard.as_ref().map(|c| c.text.as_str()), Some("one"));

        let next = next.apply(EditAction::PasteCell { index: 2 }).unwrap();
        let texts: Vec<_> = next.cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["two", "three", "one"]);
        // paste copies; the clipboard still holds the cell
        assert!(next.clipboard.is_some());
        assert_valid_state(&next);
    }

    #[test]
    fn cut_overwrites_previous_clipboard() {
        let next = state()
            .apply(EditAction::CopyCell { index: 0 })
            .unwrap()
            .apply(EditAction::CutCell { index: 1 })
            .unwrap();

        assert_eq!(next.clipboard.as_ref().map(|c| c.text.as_str()), Some("two"));
    }

    #[test]
    fn paste_with_empty_clipboard_is_a_no_op() {
        let next = state().apply(EditAction::PasteCell { index: 0 }).unwrap();

        assert_eq!(next, state());
    }

    #[test]
    fn set_roster_renames_and_refreshes_caches() {
        let next = state()
            .apply(EditAction::SetRoster {
                roster: vec![speaker("Alicia"), speaker("Bob")],
            })
            .unwrap();

        assert_eq!(next.cells[0].speaker_name, "Alicia");
        assert_valid_state(&next);
    }

    #[test]
    fn set_roster_rejects_length_changes() {
        assert_eq!(
            state().apply(EditAction::SetRoster {
                roster: vec![speaker("only")]
            }),
            Err(EditError::RosterLengthMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn delete_speaker_reassigns_and_decrements() {
        let mut state = state();
        state.roster.push(speaker("Carol"));
        state.cells.push(cell("four", Some(2)));
        state.cells[3].refresh_cache(&state.roster);

        let next = state
            .apply(EditAction::DeleteSpeaker {
                id: 0,
                replacement: Some(1),
            })
            .unwrap();

        // nobody points at the removed id; previously-higher ids dropped by one
        assert_eq!(next.roster.len(), 2);
        let ids: Vec<_> = next.cells.iter().map(|c| c.speaker_id).collect();
        assert_eq!(ids, [Some(0), Some(0), None, Some(1)]);
        assert_eq!(next.cells[0].speaker_name, "Bob");
        assert_eq!(next.cells[3].speaker_name, "Carol");
        assert_valid_state(&next);
    }

    #[test]
    fn delete_speaker_without_replacement_unassigns() {
        let next = state()
            .apply(EditAction::DeleteSpeaker {
                id: 1,
                replacement: None,
            })
            .unwrap();

        assert_eq!(next.roster.len(), 1);
        let ids: Vec<_> = next.cells.iter().map(|c| c.speaker_id).collect();
        assert_eq!(ids, [Some(0), None, None]);
        assert_valid_state(&next);
    }

    #[test]
    fn delete_speaker_cascades_into_the_clipboard() {
        let next = state()
            .apply(EditAction::CutCell { index: 1 })
            .unwrap()
            .apply(EditAction::DeleteSpeaker {
                id: 1,
                replacement: Some(0),
            })
            .unwrap();

        assert_eq!(next.clipboard.as_ref().and_then(|c| c.speaker_id), Some(0));
        assert_valid_state(&next);
    }

    #[test]
    fn delete_speaker_rejects_self_replacement() {
        assert_eq!(
            state().apply(EditAction::DeleteSpeaker {
                id: 1,
                replacement: Some(1)
            }),
            Err(EditError::ReplacementIsDeleted { id: 1 })
        );
    }

    #[test]
    fn collapse_roster_by_name_keeps_lowest_index() {
        let mut state = state();
        state.roster.push(speaker("Alice")); // duplicate of id 0
        state.roster.push(speaker("Bob")); // duplicate of id 1
        state.cells.push(cell("four", Some(2)));
        state.cells.push(cell("five", Some(3)));
        for cell in &mut state.cells {
            cell.refresh_cache(&state.roster);
        }

        let next = state.apply(EditAction::CollapseRosterByName).unwrap();

        let names: Vec<_> = next.roster.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
        let ids: Vec<_> = next.cells.iter().map(|c| c.speaker_id).collect();
        assert_eq!(ids, [Some(0), Some(1), None, Some(0), Some(1)]);
        assert_valid_state(&next);
    }

    #[test]
    fn load_pads_a_short_roster() {
        let next = state()
            .apply(EditAction::LoadTranscript {
                cells: vec![cell("a", Some(0)), cell("b", Some(3))],
                roster: vec![speaker("Alice")],
                pad_roster: true,
            })
            .unwrap();

        assert_eq!(next.roster.len(), 4);
        assert_eq!(next.roster[3].name, "Speaker 4");
        assert_eq!(next.cells[1].speaker_name, "Speaker 4");
        assert_valid_state(&next);
    }

    #[test]
    fn load_without_padding_force_unassigns() {
        let next = state()
            .apply(EditAction::LoadTranscript {
                cells: vec![cell("a", Some(0)), cell("b", Some(3))],
                roster: vec![speaker("Alice")],
                pad_roster: false,
            })
            .unwrap();

        assert_eq!(next.roster.len(), 1);
        assert_eq!(next.cells[1].speaker_id, None);
        assert_valid_state(&next);
    }

    #[test]
    fn load_resets_clipboard_and_focus() {
        let next = state()
            .apply(EditAction::CopyCell { index: 0 })
            .unwrap()
            .apply(EditAction::SetFocus { focus: Some(1) })
            .unwrap()
            .apply(EditAction::LoadTranscript {
                cells: vec![cell("a", None)],
                roster: vec![],
                pad_roster: true,
            })
            .unwrap();

        assert_eq!(next.clipboard, None);
        assert_eq!(next.focus, None);
    }

    #[test]
    fn clear_installs_the_default_roster() {
        let next = state().apply(EditAction::Clear).unwrap();

        assert!(next.cells.is_empty());
        let names: Vec<_> = next.roster.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Speaker 1", "Speaker 2"]);
    }

    #[test]
    fn set_focus_validates_the_index() {
        let next = state()
            .apply(EditAction::SetFocus { focus: Some(2) })
            .unwrap();
        assert_eq!(next.focus, Some(2));

        assert_eq!(
            state().apply(EditAction::SetFocus { focus: Some(3) }),
            Err(EditError::CellOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn removing_the_focused_cell_clears_focus() {
        let next = state()
            .apply(EditAction::SetFocus { focus: Some(2) })
            .unwrap()
            .apply(EditAction::CutCell { index: 2 })
            .unwrap();

        assert_eq!(next.focus, None);
        assert_valid_state(&next);
    }

    #[test]
    fn attach_similarities_zips_positionally() {
        let next = state()
            .apply(EditAction::AttachSimilarities {
                scores: vec![0.1, 0.9, 0.4],
            })
            .unwrap();

        let scores: Vec<_> = next.cells.iter().map(|c| c.similarity).collect();
        assert_eq!(scores, [Some(0.1), Some(0.9), Some(0.4)]);
    }

    #[test]
    fn attach_similarities_rejects_length_mismatch() {
        assert_eq!(
            state().apply(EditAction::AttachSimilarities {
                scores: vec![0.1]
            }),
            Err(EditError::SimilarityLengthMismatch {
                expected: 3,
                got: 1
            })
        );
    }

    #[test]
    fn action_round_trips_through_json() {
        let action = EditAction::AssignSpeaker {
            index: 2,
            speaker: Some(1),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"type\":\"assignSpeaker\""));

        let back: EditAction = serde_json::from_str(&json).unwrap();
        match back {
            EditAction::AssignSpeaker { index, speaker } => {
                assert_eq!((index, speaker), (2, Some(1)));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
