//! Selection/offset resolver - pure functions over a block snapshot
//!
//! Maps identity-addressed selection points (leaf run index + offset
//! inside the leaf) to block-level character offsets, without touching
//! any live rendering state. Backward selections normalize so the start
//! never exceeds the end.
//!
//! When leaf identity cannot be resolved (the tree mutated under the
//! selection), [`resolve_by_text`] re-anchors by searching for the
//! selected text, preferring the occurrence closest to a hint offset;
//! with repeated text this is a heuristic and can mis-anchor, which
//! surfaces only as a misplaced highlight.

use doc_model::{closest_occurrence, Block, LeafPoint, SelectionData, TextRun};

/// Resolve a selection span to block-level offsets and the covered text.
///
/// Returns `None` when either point does not resolve against the block's
/// current leaf sequence - wrong block, leaf index out of range, or an
/// offset beyond the leaf's text.
pub fn resolve_selection(
    block: &Block,
    anchor: &LeafPoint,
    focus: &LeafPoint,
) -> Option<SelectionData> {
    let abs_anchor = absolute_offset(block, anchor)?;
    let abs_focus = absolute_offset(block, focus)?;

    // normalize backward selections
    let (start_offset, end_offset) = if abs_anchor <= abs_focus {
        (abs_anchor, abs_focus)
    } else {
        (abs_focus, abs_anchor)
    };

    let text = block.plain_text();
    let selected_text: String = text
        .chars()
        .skip(start_offset)
        .take(end_offset - start_offset)
        .collect();

    Some(SelectionData {
        block_id: block.id.clone(),
        start_offset,
        end_offset,
        selected_text,
    })
}

/// Re-anchor a selection by its text when leaf identity is gone.
///
/// `hint` is the best available guess for the start offset - the live
/// cursor position when known, otherwise the stale recorded start. The
/// occurrence closest to the hint wins; `None` when the text no longer
/// exists in the block.
pub fn resolve_by_text(block: &Block, selected_text: &str, hint: usize) -> Option<SelectionData> {
    let text = block.plain_text();
    let (start_offset, end_offset) = closest_occurrence(&text, selected_text, hint)?;
    Some(SelectionData {
        block_id: block.id.clone(),
        start_offset,
        end_offset,
        selected_text: selected_text.to_string(),
    })
}

fn absolute_offset(block: &Block, point: &LeafPoint) -> Option<usize> {
    if point.block_id != block.id {
        return None;
    }
    let leaves: Vec<&TextRun> = block.run_groups().into_iter().flatten().collect();
    let leaf = leaves.get(point.leaf_index)?;
    if point.offset > leaf.char_len() {
        return None;
    }
    let preceding: usize = leaves[..point.leaf_index]
        .iter()
        .map(|r| r.char_len())
        .sum();
    Some(preceding + point.offset)
}
