//! Error types for save-pipeline operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("save failed: {0}")]
    SaveFailed(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
