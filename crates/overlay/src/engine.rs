//! Overlay operations over the document state
//!
//! Range resolution policy: recorded offsets are used when they still fit
//! the block's current text; offsets that no longer fit fall back to a
//! text search that picks the occurrence closest to the recorded start.
//! A highlight that can be located neither way is reported as an error,
//! which the full re-apply pass downgrades to a warning and a skip.

use annotations::{AiSuggestion, CommentStore, SuggestionStatus, SuggestionStore};
use doc_model::{
    closest_occurrence, decorate_range, splice_range, total_char_len, AiMark, AiMarkStatus, Block,
    BlockId, CommentId, DocState, SuggestionId,
};

use crate::{OverlayError, Result};

/// Tag the characters of `[start_offset, end_offset)` with a comment ID.
///
/// For a multi-block selection, `multi_block_ids` lists the covered
/// blocks in document order and the offsets address the concatenation of
/// their texts. One span of text may carry several comment IDs at once.
/// Applying the same highlight twice yields a single mark.
pub fn apply_comment_highlight(
    doc: &mut DocState,
    comment_id: &CommentId,
    block_id: &BlockId,
    selected_text: &str,
    start_offset: usize,
    end_offset: usize,
    multi_block_ids: Option<&[BlockId]>,
) -> Result<()> {
    let single = std::slice::from_ref(block_id);
    let block_ids = match multi_block_ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => single,
    };

    // total length across the listed blocks, in order
    let mut total = 0;
    for id in block_ids {
        let block = doc
            .block(id)
            .ok_or_else(|| OverlayError::BlockNotFound(id.to_string()))?;
        total += block.char_len();
    }

    let (start, end) = if end_offset <= total && start_offset <= end_offset {
        (start_offset, end_offset)
    } else {
        let text: String = block_ids
            .iter()
            .filter_map(|id| doc.plain_text_of(id))
            .collect();
        closest_occurrence(&text, selected_text, start_offset).ok_or_else(|| {
            OverlayError::TextNotFound {
                block_id: block_id.to_string(),
                text: selected_text.to_string(),
            }
        })?
    };

    let mut acc = 0;
    for id in block_ids {
        let Some(block) = doc.block_mut(id) else {
            continue;
        };
        let len = block.char_len();
        let local_start = start.max(acc).min(acc + len) - acc;
        let local_end = end.max(acc).min(acc + len) - acc;
        if local_start < local_end {
            decorate_block_range(block, local_start, local_end, |run| {
                run.comment_ids.insert(comment_id.clone());
            })?;
            block.normalize_runs();
        }
        acc += len;
    }
    Ok(())
}

/// Remove a comment ID from every run in the document; runs whose ID set
/// empties out revert to unmarked. Safe to call for an unknown ID.
pub fn remove_comment_highlight(doc: &mut DocState, comment_id: &CommentId) {
    for block in &mut doc.blocks {
        let mut touched = false;
        for group in block.run_groups_mut() {
            for run in group.iter_mut() {
                touched |= run.comment_ids.remove(comment_id);
            }
        }
        if touched {
            block.normalize_runs();
        }
    }
}

/// Mark a text range with an AI-suggestion state.
///
/// Update-or-insert: any existing mark carrying the same suggestion ID is
/// cleared first, so re-invoking with a changed status moves the mark
/// instead of duplicating it. Offsets are optional; missing or stale
/// offsets fall back to locating `text`.
pub fn apply_ai_suggestion_highlight(
    doc: &mut DocState,
    suggestion_id: &SuggestionId,
    block_id: &BlockId,
    text: &str,
    status: AiMarkStatus,
    start_offset: Option<usize>,
    end_offset: Option<usize>,
) -> Result<()> {
    remove_ai_suggestion_highlight(doc, suggestion_id);

    let block = doc
        .block(block_id)
        .ok_or_else(|| OverlayError::BlockNotFound(block_id.to_string()))?;
    let len = block.char_len();
    let (start, end) = match (start_offset, end_offset) {
        (Some(s), Some(e)) if s <= e && e <= len => (s, e),
        _ => closest_occurrence(&block.plain_text(), text, start_offset.unwrap_or(0)).ok_or_else(
            || OverlayError::TextNotFound {
                block_id: block_id.to_string(),
                text: text.to_string(),
            },
        )?,
    };

    let Some(block) = doc.block_mut(block_id) else {
        return Err(OverlayError::BlockNotFound(block_id.to_string()));
    };
    decorate_block_range(block, start, end, |run| {
        run.ai_mark = Some(AiMark::new(suggestion_id.clone(), status));
    })?;
    block.normalize_runs();
    Ok(())
}

/// Clear the mark carrying a suggestion ID. Safe for an unknown ID.
pub fn remove_ai_suggestion_highlight(doc: &mut DocState, suggestion_id: &SuggestionId) {
    for block in &mut doc.blocks {
        let mut touched = false;
        for group in block.run_groups_mut() {
            for run in group.iter_mut() {
                if run
                    .ai_mark
                    .as_ref()
                    .is_some_and(|m| &m.suggestion_id == suggestion_id)
                {
                    run.ai_mark = None;
                    touched = true;
                }
            }
        }
        if touched {
            block.normalize_runs();
        }
    }
}

/// Perform the real content mutation for an accepted suggestion: splice
/// the recorded range (or the located `selection_text`) with `new_text`,
/// preserving surrounding runs and their decorations. The inserted text
/// is marked as an applied AI edit and the document version bumps.
pub fn replace_text_by_suggestion_id(
    doc: &mut DocState,
    suggestion_id: &SuggestionId,
    block_id: &BlockId,
    selection_text: &str,
    new_text: &str,
    start_offset: Option<usize>,
    end_offset: Option<usize>,
) -> Result<()> {
    let block = doc
        .block(block_id)
        .ok_or_else(|| OverlayError::BlockNotFound(block_id.to_string()))?;
    let len = block.char_len();
    let (start, end) = match (start_offset, end_offset) {
        (Some(s), Some(e)) if s <= e && e <= len => (s, e),
        _ => closest_occurrence(&block.plain_text(), selection_text, start_offset.unwrap_or(0))
            .ok_or_else(|| OverlayError::TextNotFound {
                block_id: block_id.to_string(),
                text: selection_text.to_string(),
            })?,
    };

    let Some(block) = doc.block_mut(block_id) else {
        return Err(OverlayError::BlockNotFound(block_id.to_string()));
    };
    let mut acc = 0;
    let mut replaced = false;
    for group in block.run_groups_mut() {
        let group_len = total_char_len(group);
        if start >= acc && end <= acc + group_len {
            if let Some(index) = splice_range(group, start - acc, end - acc, new_text)? {
                group[index].ai_mark =
                    Some(AiMark::new(suggestion_id.clone(), AiMarkStatus::Applied));
            }
            replaced = true;
            break;
        }
        acc += group_len;
    }
    if !replaced {
        // the range straddles two list items; no sane splice exists
        return Err(OverlayError::CrossItemRange {
            block_id: block_id.to_string(),
            start,
            end,
        });
    }
    block.normalize_runs();
    doc.bump_version();
    Ok(())
}

/// The set of comment IDs covering a character position, for
/// click-to-select. Returns every ID on the clicked span, in stable
/// (sorted) order, never just the first.
pub fn comment_ids_at(doc: &DocState, block_id: &BlockId, offset: usize) -> Vec<CommentId> {
    let Some(block) = doc.block(block_id) else {
        return Vec::new();
    };
    let mut acc = 0;
    for group in block.run_groups() {
        for run in group {
            let len = run.char_len();
            if offset >= acc && offset < acc + len {
                return run.comment_ids.iter().cloned().collect();
            }
            acc += len;
        }
    }
    Vec::new()
}

/// Strip every decoration from the document (marks only, never text).
pub fn clear_all_marks(doc: &mut DocState) {
    for block in &mut doc.blocks {
        for group in block.run_groups_mut() {
            for run in group.iter_mut() {
                run.comment_ids.clear();
                run.ai_mark = None;
            }
        }
        block.normalize_runs();
    }
}

/// Re-apply the full current highlight set.
///
/// Called after every committed mutation: clears all marks, then applies
/// every unresolved range-anchored comment and every pending or accepted
/// suggestion. Rejected suggestions and resolved comments simply stop
/// appearing. Items that can no longer be located are skipped with a
/// warning so one bad anchor never blocks the rest of the pass.
pub fn reapply_highlights(
    doc: &mut DocState,
    comments: &CommentStore,
    suggestions: &SuggestionStore,
) {
    clear_all_marks(doc);

    for comment in comments.all().filter(|c| !c.resolved) {
        let (Some(text), Some((start, end))) = (comment.selection_text.as_deref(), comment.anchor())
        else {
            // block-level comment with no text range: nothing to mark
            continue;
        };
        if let Err(err) = apply_comment_highlight(
            doc,
            &comment.id,
            &comment.block_id,
            text,
            start,
            end,
            None,
        ) {
            tracing::warn!(comment_id = %comment.id, %err, "skipping stale comment highlight");
        }
    }

    for suggestion in suggestions.all() {
        if suggestion.status == SuggestionStatus::Rejected {
            continue;
        }
        if let Err(err) = reapply_suggestion(doc, suggestion) {
            tracing::warn!(suggestion_id = %suggestion.id, %err, "skipping stale suggestion highlight");
        }
    }
}

fn reapply_suggestion(doc: &mut DocState, suggestion: &AiSuggestion) -> Result<()> {
    match suggestion.status {
        // pending marks sit on the original selection at its recorded range
        SuggestionStatus::Pending => apply_ai_suggestion_highlight(
            doc,
            &suggestion.id,
            &suggestion.block_id,
            &suggestion.selection_text,
            AiMarkStatus::Suggested,
            suggestion.start_offset,
            suggestion.end_offset,
        ),
        // accepted suggestions already replaced the text, so the recorded
        // offsets are stale; locate the improved text instead
        SuggestionStatus::Accepted => apply_ai_suggestion_highlight(
            doc,
            &suggestion.id,
            &suggestion.block_id,
            &suggestion.improved_text,
            AiMarkStatus::Applied,
            None,
            None,
        ),
        SuggestionStatus::Rejected => Ok(()),
    }
}

/// Split the range across a block's run groups and decorate the covered
/// runs. The whole range is validated before any group is touched.
fn decorate_block_range<F>(block: &mut Block, start: usize, end: usize, mut f: F) -> Result<()>
where
    F: FnMut(&mut doc_model::TextRun),
{
    let len = block.char_len();
    if start > end || end > len {
        return Err(OverlayError::RangeOutOfBounds {
            block_id: block.id.to_string(),
            start,
            end,
        });
    }
    let mut acc = 0;
    for group in block.run_groups_mut() {
        let group_len = total_char_len(group);
        let local_start = start.max(acc).min(acc + group_len) - acc;
        let local_end = end.max(acc).min(acc + group_len) - acc;
        if local_start < local_end {
            decorate_range(group, local_start, local_end, &mut f)?;
        }
        acc += group_len;
    }
    Ok(())
}
