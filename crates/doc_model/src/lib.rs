//! Document Model - block/run document structure for the review editor
//!
//! This crate provides the in-memory document model: formatted text runs
//! with decoration state (comment membership, AI-suggestion marks), the
//! block union (headings, paragraphs, lists, tables, ...), and the
//! whole-document container owned by an editor session.

mod block;
mod document;
mod error;
mod ids;
mod run;
mod selection;

pub use block::*;
pub use document::*;
pub use error::*;
pub use ids::*;
pub use run::*;
pub use selection::*;
