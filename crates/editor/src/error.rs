//! Error types for editor-session operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown comment: {0}")]
    UnknownComment(String),

    #[error("unknown suggestion: {0}")]
    UnknownSuggestion(String),

    #[error(transparent)]
    Overlay(#[from] overlay::OverlayError),

    #[error(transparent)]
    Annotation(#[from] annotations::AnnotationError),
}

pub type Result<T> = std::result::Result<T, EditorError>;
