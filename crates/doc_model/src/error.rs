//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("invalid range {start}..{end} for text of length {len}")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("block {0} has no text content")]
    NoTextContent(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
