//! Shared utilities.

mod position;

pub use position::{LineIndex, SourcePos};
