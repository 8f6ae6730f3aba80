//! Selection types - identity-addressed points and resolved offsets
//!
//! A live selection is anchored by leaf identity (which text leaf, which
//! offset inside it). The resolver in the editor crate maps those points
//! to block-level character offsets; this module only defines the types.

use crate::BlockId;
use serde::{Deserialize, Serialize};

/// A point inside a block, addressed by leaf-run identity.
///
/// `leaf_index` counts the block's text-bearing leaf runs in document
/// order (the flattening of [`crate::Block::run_groups`]); `offset` is a
/// character offset inside that leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafPoint {
    /// The block containing this point
    pub block_id: BlockId,
    /// Index of the leaf run within the block's flattened leaf sequence
    pub leaf_index: usize,
    /// Character offset within the leaf run
    pub offset: usize,
}

impl LeafPoint {
    /// Create a new leaf point.
    pub fn new(block_id: BlockId, leaf_index: usize, offset: usize) -> Self {
        Self {
            block_id,
            leaf_index,
            offset,
        }
    }
}

/// A resolved selection: block-level character offsets plus the covered
/// text, with `start_offset <= end_offset` regardless of the selection's
/// direction in the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionData {
    /// The block containing the selection
    pub block_id: BlockId,
    /// Start offset into the block's concatenated leaf text
    pub start_offset: usize,
    /// End offset (exclusive)
    pub end_offset: usize,
    /// The selected text
    pub selected_text: String,
}

impl SelectionData {
    /// Check whether this selection is just a caret.
    pub fn is_collapsed(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Length of the selection in characters.
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Check whether the selection covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_selection() {
        let sel = SelectionData {
            block_id: BlockId::new("b1"),
            start_offset: 4,
            end_offset: 4,
            selected_text: String::new(),
        };
        assert!(sel.is_collapsed());
        assert!(sel.is_empty());
    }
}
