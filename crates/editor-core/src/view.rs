//! Compact read view.
//!
//! Merges consecutive same-speaker cells into paragraph-like blocks for a
//! read-focused display. Pure and re-derivable: callers recompute it when
//! entering the view and cache the result until re-entry; it is never the
//! source of truth.

use crate::types::{Cell, CompactView};

/// Soft cap on a block paragraph. Once the current paragraph plus the
/// incoming sentence would pass this, the sentence starts a new paragraph
/// instead of extending the line.
const PARAGRAPH_LIMIT: usize = 300;

/// Project the full cell list into merged blocks, translating `focus` into
/// block coordinates.
///
/// A cell starts a new block when it is unassigned, first overall, or
/// attributed to a different speaker than the previous block. Otherwise its
/// text joins the current block with a space, or with a paragraph break when
/// the block's last paragraph plus the new text would exceed
/// [`PARAGRAPH_LIMIT`] characters. A merged block keeps the first cell's
/// timestamp and cached display fields.
pub fn compact(cells: &[Cell], focus: Option<usize>) -> CompactView {
    let mut blocks: Vec<Cell> = Vec::new();
    let mut block_focus = None;

    for (i, cell) in cells.iter().enumerate() {
        let same_speaker =
            cell.speaker_id.is_some() && blocks.last().map(|b| b.speaker_id) == Some(cell.speaker_id);

        match blocks.last_mut() {
            Some(block) if same_speaker => {
                if last_paragraph_len(&block.text) + cell.text.len() > PARAGRAPH_LIMIT {
                    block.text.push_str("\n\n");
                } else {
                    block.text.push(' ');
                }
                block.text.push_str(&cell.text);
            }
            _ => blocks.push(cell.clone()),
        }

        if focus == Some(i) {
            block_focus = Some(blocks.len() - 1);
        }
    }

    CompactView {
        cells: blocks,
        focus: block_focus,
    }
}

fn last_paragraph_len(text: &str) -> usize {
    text.rsplit("\n\n").next().unwrap_or(text).len()
}
