//! Error types for template operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {0:?} contains no headings")]
    NoSections(String),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
