//! Highlight Overlay Engine
//!
//! Decorates spans of block text with comment and AI-suggestion marks
//! without permanently mutating semantic content; the one real mutation
//! is the text replacement performed when a suggestion is accepted.
//!
//! Because edits shift or invalidate recorded anchors, consumers re-apply
//! the full current highlight set after every committed mutation. Every
//! operation here is idempotent, and a highlight whose block or text no
//! longer exists is skipped with a warning rather than failing the pass.

mod engine;
mod error;
mod throttle;

pub use engine::*;
pub use error::*;
pub use throttle::*;
