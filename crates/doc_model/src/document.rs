//! Whole-document container owned by an editor session

use crate::{Block, BlockId};
use serde::{Deserialize, Serialize};

/// The in-memory document state.
///
/// Owned exclusively by the editor session: mutated only through editor
/// commands and the highlight overlay, persisted on debounce or manual
/// save, dropped when the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocState {
    /// Document ID (the backend file ID)
    pub id: String,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document blocks in order
    pub blocks: Vec<Block>,
    /// Mutation counter; bumps on every committed edit
    #[serde(default)]
    pub version: u64,
}

impl DocState {
    /// Create an empty document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            blocks: Vec::new(),
            version: 0,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Find a block by ID.
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Find a block by ID, mutably.
    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    /// Index of a block in document order.
    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Concatenated plain text of a block, if it exists.
    pub fn plain_text_of(&self, id: &BlockId) -> Option<String> {
        self.block(id).map(Block::plain_text)
    }

    /// Record a committed mutation.
    pub fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Merge adjacent same-decoration runs in every block.
    pub fn normalize_runs(&mut self) {
        for block in &mut self.blocks {
            block.normalize_runs();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextRun;

    #[test]
    fn block_lookup_by_id() {
        let mut doc = DocState::new("doc-1");
        doc.blocks
            .push(Block::paragraph(vec![TextRun::plain("Hello world")]));
        let id = doc.blocks[0].id.clone();

        assert!(doc.block(&id).is_some());
        assert_eq!(doc.block_index(&id), Some(0));
        assert_eq!(doc.plain_text_of(&id).unwrap(), "Hello world");
        assert!(doc.block(&BlockId::new("missing")).is_none());
    }

    #[test]
    fn version_bumps_monotonically() {
        let mut doc = DocState::new("doc-1");
        assert_eq!(doc.version, 0);
        assert_eq!(doc.bump_version(), 1);
        assert_eq!(doc.bump_version(), 2);
    }
}
