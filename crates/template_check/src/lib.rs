//! Template/Structure Checker
//!
//! Validates a document's heading structure against an ordered section
//! template: required sections must be present, at the expected depth,
//! and in template order. The check is a pure function of the current
//! heading list and runs on every document update when enabled.

mod checker;
mod error;
mod template;

pub use checker::*;
pub use error::*;
pub use template::*;
