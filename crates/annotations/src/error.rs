//! Error types for annotation operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("comment content cannot be empty")]
    EmptyContent,

    #[error("author cannot be empty")]
    EmptyAuthor,

    #[error("comment not found: {0}")]
    CommentNotFound(String),

    #[error("suggestion not found: {0}")]
    SuggestionNotFound(String),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
