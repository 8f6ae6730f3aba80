//! Error types for conversion operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed inline markup: {0}")]
    MalformedInline(String),

    #[error("invalid block metadata for {id}: {reason}")]
    InvalidMetadata { id: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
