//! Text run node - a contiguous span of text with one decoration state
//!
//! A run's decoration state is its inline formatting plus the overlay
//! marks riding on it: the set of comment IDs covering the text and an
//! optional AI-suggestion mark. Two adjacent runs merge only when every
//! part of that state is equal; merging across differing comment sets
//! would destroy per-character comment membership.

use crate::{CommentId, DocModelError, Result, SuggestionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inline formatting flags for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormat {
    /// Bold text
    #[serde(default)]
    pub bold: bool,
    /// Italic text
    #[serde(default)]
    pub italic: bool,
    /// Underlined text
    #[serde(default)]
    pub underline: bool,
    /// Inline code
    #[serde(default)]
    pub code: bool,
}

impl RunFormat {
    /// Check whether no formatting flag is set.
    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.underline || self.code)
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set the underline flag.
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Set the code flag.
    pub fn with_code(mut self, code: bool) -> Self {
        self.code = code;
        self
    }
}

/// Run-level display state of an AI suggestion mark.
///
/// This is the decoration vocabulary, distinct from the suggestion
/// lifecycle (`pending`/`accepted`/`rejected`): a pending suggestion shows
/// as `Suggested`, an accepted one stays visible as `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMarkStatus {
    /// Suggestion proposed, awaiting a decision
    Suggested,
    /// Suggestion accepted and applied to the text
    Applied,
    /// Suggestion rejected by the reviewer
    Rejected,
}

/// An AI-suggestion mark carried by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMark {
    /// The suggestion this mark belongs to
    pub suggestion_id: SuggestionId,
    /// Display state of the mark
    pub status: AiMarkStatus,
}

impl AiMark {
    /// Create a new mark.
    pub fn new(suggestion_id: SuggestionId, status: AiMarkStatus) -> Self {
        Self {
            suggestion_id,
            status,
        }
    }
}

/// A text run - contiguous text sharing one decoration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content of this run
    pub text: String,
    /// Inline formatting flags
    #[serde(default)]
    pub format: RunFormat,
    /// AI-suggestion mark, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_mark: Option<AiMark>,
    /// IDs of the comments whose highlight covers this run
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub comment_ids: BTreeSet<CommentId>,
}

impl TextRun {
    /// Create an unformatted run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
            ai_mark: None,
            comment_ids: BTreeSet::new(),
        }
    }

    /// Create a formatted run.
    pub fn formatted(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
            ai_mark: None,
            comment_ids: BTreeSet::new(),
        }
    }

    /// Create an empty unformatted run.
    ///
    /// Empty content is always represented by exactly one of these, never
    /// by an empty run vector.
    pub fn empty() -> Self {
        Self::plain("")
    }

    /// Length of the run text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the run text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of grapheme clusters in this run.
    pub fn grapheme_count(&self) -> usize {
        use unicode_segmentation::UnicodeSegmentation;
        self.text.graphemes(true).count()
    }

    /// Check whether two runs carry the same decoration state.
    pub fn same_decoration(&self, other: &TextRun) -> bool {
        self.format == other.format
            && self.ai_mark == other.ai_mark
            && self.comment_ids == other.comment_ids
    }

    /// Split this run at a character offset, cloning the decoration state
    /// onto both halves.
    pub fn split_at_char(&self, offset: usize) -> (TextRun, TextRun) {
        let byte = self
            .text
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        let (head, tail) = self.text.split_at(byte);
        let mut left = self.clone();
        left.text = head.to_string();
        let mut right = self.clone();
        right.text = tail.to_string();
        (left, right)
    }
}

/// Total character length of a run sequence.
pub fn total_char_len(runs: &[TextRun]) -> usize {
    runs.iter().map(TextRun::char_len).sum()
}

/// Concatenated text of a run sequence.
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Merge adjacent runs with identical decoration state and drop empty
/// runs, keeping a single empty run when nothing remains.
///
/// Idempotent: merging an already-merged sequence yields the same result.
pub fn merge_text_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut merged: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.same_decoration(&run) => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    if merged.is_empty() {
        merged.push(TextRun::empty());
    }
    merged
}

/// Find `needle` in `haystack`, in the character-offset domain,
/// preferring the occurrence whose start is closest to `hint`; ties
/// prefer the earlier occurrence.
///
/// This is the shared policy for re-anchoring stale offsets: when a
/// recorded range no longer fits the current text, the selected text is
/// searched for and the repeated-text ambiguity resolves toward the
/// hint position.
pub fn closest_occurrence(haystack: &str, needle: &str, hint: usize) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let needle_chars = needle.chars().count();
    let mut best: Option<(usize, usize)> = None;
    for (byte_idx, _) in haystack.match_indices(needle) {
        let char_idx = haystack[..byte_idx].chars().count();
        let distance = char_idx.abs_diff(hint);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((char_idx, distance)),
        }
    }
    best.map(|(start, _)| (start, start + needle_chars))
}

/// Ensure a run boundary exists at `offset`.
///
/// Returns the index of the run starting at `offset` (equal to
/// `runs.len()` when `offset` is the total length), splitting a run in two
/// when the offset falls inside it.
fn ensure_boundary(runs: &mut Vec<TextRun>, offset: usize) -> Result<usize> {
    let mut acc = 0;
    for i in 0..runs.len() {
        if acc == offset {
            return Ok(i);
        }
        let len = runs[i].char_len();
        if offset < acc + len {
            let (head, tail) = runs[i].split_at_char(offset - acc);
            runs[i] = head;
            runs.insert(i + 1, tail);
            return Ok(i + 1);
        }
        acc += len;
    }
    if acc == offset {
        Ok(runs.len())
    } else {
        Err(DocModelError::InvalidRange {
            start: offset,
            end: offset,
            len: acc,
        })
    }
}

/// Apply `f` to every run covering `[start, end)`, splitting runs so the
/// range boundaries fall exactly on run boundaries.
pub fn decorate_range<F>(runs: &mut Vec<TextRun>, start: usize, end: usize, mut f: F) -> Result<()>
where
    F: FnMut(&mut TextRun),
{
    let len = total_char_len(runs);
    if start > end || end > len {
        return Err(DocModelError::InvalidRange { start, end, len });
    }
    if start == end {
        return Ok(());
    }
    let first = ensure_boundary(runs, start)?;
    let after = ensure_boundary(runs, end)?;
    for run in &mut runs[first..after] {
        f(run);
    }
    Ok(())
}

/// Replace `[start, end)` with `new_text`, preserving the surrounding runs
/// and their decorations.
///
/// The inserted run starts plain; the caller decorates it as needed.
/// Returns the index of the inserted run, or `None` when `new_text` is
/// empty (a pure deletion).
pub fn splice_range(
    runs: &mut Vec<TextRun>,
    start: usize,
    end: usize,
    new_text: &str,
) -> Result<Option<usize>> {
    let len = total_char_len(runs);
    if start > end || end > len {
        return Err(DocModelError::InvalidRange { start, end, len });
    }
    let first = ensure_boundary(runs, start)?;
    let after = ensure_boundary(runs, end)?;
    runs.drain(first..after);
    if new_text.is_empty() {
        if runs.is_empty() {
            runs.push(TextRun::empty());
        }
        return Ok(None);
    }
    runs.insert(first, TextRun::plain(new_text));
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> TextRun {
        TextRun::formatted(text, RunFormat::default().with_bold(true))
    }

    #[test]
    fn merge_joins_identical_decoration() {
        let runs = vec![
            TextRun::plain("Hello "),
            TextRun::plain("world"),
            bold("!"),
        ];
        let merged = merge_text_runs(runs);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "Hello world");
        assert_eq!(merged[1].text, "!");
    }

    #[test]
    fn merge_is_idempotent() {
        let mut c1 = TextRun::plain("mid");
        c1.comment_ids.insert(CommentId::new("c1"));
        let inputs = vec![
            vec![],
            vec![TextRun::empty()],
            vec![TextRun::plain(""), TextRun::plain("a"), TextRun::plain("b")],
            vec![TextRun::plain("a"), bold("b"), bold("c"), TextRun::plain("")],
            vec![TextRun::plain("a"), c1, TextRun::plain("z")],
        ];
        for runs in inputs {
            let once = merge_text_runs(runs);
            let twice = merge_text_runs(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn merge_keeps_single_empty_run() {
        let merged = merge_text_runs(vec![TextRun::plain(""), TextRun::plain("")]);
        assert_eq!(merged, vec![TextRun::empty()]);
        assert_eq!(merge_text_runs(vec![]), vec![TextRun::empty()]);
    }

    #[test]
    fn merge_respects_comment_sets() {
        let mut marked = TextRun::plain("world");
        marked.comment_ids.insert(CommentId::new("c1"));
        let merged = merge_text_runs(vec![TextRun::plain("Hello "), marked.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], marked);
    }

    #[test]
    fn decorate_range_splits_runs() {
        let mut runs = vec![TextRun::plain("Hello world")];
        decorate_range(&mut runs, 6, 11, |r| {
            r.comment_ids.insert(CommentId::new("c1"));
        })
        .unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Hello ");
        assert!(runs[0].comment_ids.is_empty());
        assert_eq!(runs[1].text, "world");
        assert!(runs[1].comment_ids.contains(&CommentId::new("c1")));
    }

    #[test]
    fn decorate_range_rejects_out_of_range() {
        let mut runs = vec![TextRun::plain("abc")];
        let err = decorate_range(&mut runs, 1, 9, |_| {}).unwrap_err();
        assert!(matches!(err, DocModelError::InvalidRange { .. }));
        // no partial split happened
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn decorate_collapsed_range_is_noop() {
        let mut runs = vec![TextRun::plain("abc")];
        decorate_range(&mut runs, 2, 2, |r| {
            r.format.bold = true;
        })
        .unwrap();
        assert_eq!(runs, vec![TextRun::plain("abc")]);
    }

    #[test]
    fn splice_replaces_text_and_keeps_neighbors() {
        let mut runs = vec![TextRun::plain("Hello world")];
        let inserted = splice_range(&mut runs, 0, 5, "Hi").unwrap();
        assert_eq!(inserted, Some(0));
        assert_eq!(runs_text(&merge_text_runs(runs)), "Hi world");
    }

    #[test]
    fn splice_deletion_leaves_empty_run() {
        let mut runs = vec![TextRun::plain("abc")];
        let inserted = splice_range(&mut runs, 0, 3, "").unwrap();
        assert_eq!(inserted, None);
        assert_eq!(runs, vec![TextRun::empty()]);
    }

    #[test]
    fn closest_occurrence_prefers_the_hint() {
        // "is" occurs at 2 and 5
        assert_eq!(closest_occurrence("this is it", "is", 0), Some((2, 4)));
        assert_eq!(closest_occurrence("this is it", "is", 6), Some((5, 7)));
        // ties go to the earlier occurrence: starts 0 and 4, hint 2
        assert_eq!(closest_occurrence("abxxab", "ab", 2), Some((0, 2)));
        assert_eq!(closest_occurrence("this is it", "zz", 0), None);
        assert_eq!(closest_occurrence("abc", "", 0), None);
    }

    #[test]
    fn split_at_char_handles_multibyte_text() {
        let run = TextRun::plain("héllo");
        let (left, right) = run.split_at_char(2);
        assert_eq!(left.text, "hé");
        assert_eq!(right.text, "llo");
    }
}
