//! Error types for overlay operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("text {text:?} not found in block {block_id}")]
    TextNotFound { block_id: String, text: String },

    #[error("range {start}..{end} does not fit block {block_id}")]
    RangeOutOfBounds {
        block_id: String,
        start: usize,
        end: usize,
    },

    #[error("range {start}..{end} crosses list-item boundaries in block {block_id}")]
    CrossItemRange {
        block_id: String,
        start: usize,
        end: usize,
    },

    #[error(transparent)]
    Model(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
