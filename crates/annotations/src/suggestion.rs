//! AI suggestion model - proposed text improvements and their lifecycle
//!
//! A suggestion is created `pending` when the reviewer asks for an
//! improvement. Accepting it performs the real text replacement and keeps
//! the suggestion visible as a historical AI edit; rejecting it removes
//! the highlight on the next overlay pass.

use crate::{AnnotationError, Result};
use chrono::{DateTime, Utc};
use doc_model::{AiMarkStatus, BlockId, SuggestionId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    /// Awaiting a reviewer decision
    Pending,
    /// Accepted and applied to the text
    Accepted,
    /// Rejected by the reviewer
    Rejected,
}

impl SuggestionStatus {
    /// The run-level decoration state this lifecycle status displays as.
    pub fn as_mark(&self) -> AiMarkStatus {
        match self {
            SuggestionStatus::Pending => AiMarkStatus::Suggested,
            SuggestionStatus::Accepted => AiMarkStatus::Applied,
            SuggestionStatus::Rejected => AiMarkStatus::Rejected,
        }
    }
}

/// An AI-suggested text improvement on a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    /// Unique suggestion ID
    pub id: SuggestionId,
    /// The block the suggestion targets
    pub block_id: BlockId,
    /// The original selected text
    pub selection_text: String,
    /// The proposed replacement text
    pub improved_text: String,
    /// Why the AI proposed the change, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Lifecycle status
    pub status: SuggestionStatus,
    /// Character offset where the selection starts in the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    /// Character offset where the selection ends (exclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
    /// When the suggestion was created
    pub timestamp: DateTime<Utc>,
    /// When the status last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AiSuggestion {
    /// Create a pending suggestion.
    pub fn new(
        block_id: BlockId,
        selection_text: impl Into<String>,
        improved_text: impl Into<String>,
    ) -> Self {
        Self {
            id: SuggestionId::generate(),
            block_id,
            selection_text: selection_text.into(),
            improved_text: improved_text.into(),
            reason: None,
            status: SuggestionStatus::Pending,
            start_offset: None,
            end_offset: None,
            timestamp: Utc::now(),
            updated_at: None,
        }
    }

    /// Record the selection offsets the suggestion was made against.
    pub fn with_offsets(mut self, start: usize, end: usize) -> Self {
        self.start_offset = Some(start.min(end));
        self.end_offset = Some(start.max(end));
        self
    }

    /// Attach the AI's stated reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The anchored range, when both offsets are recorded.
    pub fn anchor(&self) -> Option<(usize, usize)> {
        match (self.start_offset, self.end_offset) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Ordered store for a document's AI suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionStore {
    suggestions: Vec<AiSuggestion>,
}

impl SuggestionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a suggestion, replacing any existing one with the same ID.
    pub fn insert(&mut self, suggestion: AiSuggestion) -> SuggestionId {
        let id = suggestion.id.clone();
        match self.suggestions.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = suggestion,
            None => self.suggestions.push(suggestion),
        }
        id
    }

    /// Remove a suggestion by ID.
    pub fn remove(&mut self, id: &SuggestionId) -> Option<AiSuggestion> {
        let index = self.suggestions.iter().position(|s| &s.id == id)?;
        Some(self.suggestions.remove(index))
    }

    /// Get a suggestion by ID.
    pub fn get(&self, id: &SuggestionId) -> Option<&AiSuggestion> {
        self.suggestions.iter().find(|s| &s.id == id)
    }

    /// All suggestions, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &AiSuggestion> {
        self.suggestions.iter()
    }

    /// Number of suggestions.
    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Drop every suggestion.
    pub fn clear(&mut self) {
        self.suggestions.clear();
    }

    /// Suggestions on a specific block.
    pub fn for_block(&self, block_id: &BlockId) -> Vec<&AiSuggestion> {
        self.suggestions
            .iter()
            .filter(|s| &s.block_id == block_id)
            .collect()
    }

    /// Update only the status (and `updated_at`) of a suggestion.
    pub fn update_status(
        &mut self,
        id: &SuggestionId,
        status: SuggestionStatus,
    ) -> Result<&AiSuggestion> {
        let suggestion = self
            .suggestions
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| AnnotationError::SuggestionNotFound(id.to_string()))?;
        suggestion.status = status;
        suggestion.updated_at = Some(Utc::now());
        Ok(&*suggestion)
    }

    /// Suggestions with a given status, in order.
    pub fn with_status(&self, status: SuggestionStatus) -> Vec<&AiSuggestion> {
        self.suggestions
            .iter()
            .filter(|s| s.status == status)
            .collect()
    }

    /// IDs of accepted suggestions, for the save payload.
    pub fn accepted_ids(&self) -> Vec<SuggestionId> {
        self.with_status(SuggestionStatus::Accepted)
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }

    /// IDs of rejected suggestions, for the save payload.
    pub fn rejected_ids(&self) -> Vec<SuggestionId> {
        self.with_status(SuggestionStatus::Rejected)
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: &str, block: &str) -> AiSuggestion {
        let mut s = AiSuggestion::new(BlockId::new(block), "Hello", "Hi");
        s.id = SuggestionId::new(id);
        s
    }

    #[test]
    fn new_suggestions_start_pending() {
        let s = AiSuggestion::new(BlockId::new("b1"), "Hello", "Hi");
        assert_eq!(s.status, SuggestionStatus::Pending);
        assert_eq!(s.status.as_mark(), AiMarkStatus::Suggested);
    }

    #[test]
    fn offsets_normalize_direction() {
        let s = AiSuggestion::new(BlockId::new("b1"), "Hello", "Hi").with_offsets(5, 0);
        assert_eq!(s.anchor(), Some((0, 5)));
    }

    #[test]
    fn update_status_stamps_updated_at() {
        let mut store = SuggestionStore::new();
        store.insert(suggestion("s1", "b1"));

        let updated = store
            .update_status(&SuggestionId::new("s1"), SuggestionStatus::Accepted)
            .unwrap();
        assert_eq!(updated.status, SuggestionStatus::Accepted);
        assert!(updated.updated_at.is_some());

        assert!(store
            .update_status(&SuggestionId::new("nope"), SuggestionStatus::Rejected)
            .is_err());
    }

    #[test]
    fn status_filters_and_id_lists() {
        let mut store = SuggestionStore::new();
        store.insert(suggestion("s1", "b1"));
        store.insert(suggestion("s2", "b1"));
        store.insert(suggestion("s3", "b2"));
        store
            .update_status(&SuggestionId::new("s1"), SuggestionStatus::Accepted)
            .unwrap();
        store
            .update_status(&SuggestionId::new("s3"), SuggestionStatus::Rejected)
            .unwrap();

        assert_eq!(store.with_status(SuggestionStatus::Pending).len(), 1);
        assert_eq!(store.accepted_ids(), vec![SuggestionId::new("s1")]);
        assert_eq!(store.rejected_ids(), vec![SuggestionId::new("s3")]);
        assert_eq!(store.for_block(&BlockId::new("b1")).len(), 2);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SuggestionStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
