//! Save payload assembly

use annotations::SuggestionStore;
use convert::{doc_state_to_block_metadata, doc_state_to_markdown, BlockMetadata};
use doc_model::{DocState, SuggestionId};
use serde::{Deserialize, Serialize};

/// The body of a document save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    /// Full document markdown
    pub markdown: String,
    /// Persisted block records, IDs preserved
    pub block_metadata: Vec<BlockMetadata>,
    /// Suggestions the reviewer accepted since load
    #[serde(default)]
    pub accepted_suggestions: Vec<SuggestionId>,
    /// Suggestions the reviewer rejected since load
    #[serde(default)]
    pub rejected_suggestions: Vec<SuggestionId>,
}

/// Build the save payload from the current editor state.
pub fn build_save_payload(doc: &DocState, suggestions: &SuggestionStore) -> SavePayload {
    SavePayload {
        markdown: doc_state_to_markdown(doc),
        block_metadata: doc_state_to_block_metadata(doc),
        accepted_suggestions: suggestions.accepted_ids(),
        rejected_suggestions: suggestions.rejected_ids(),
    }
}
