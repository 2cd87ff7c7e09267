//! Core analysis engine for tracking heap lifetimes.
//!
//! - `lifetime.rs`: per-identifier state machine, the only decision logic
//! - `visitor.rs`: push-based event seam between traversal and tracking
//! - `detector.rs`: projection of final tracker state into violations

mod detector;
mod lifetime;
mod visitor;

pub use detector::{detect, ResolveLine, Violation};
pub use lifetime::{LifetimeState, LifetimeTracker, VariableLifetime};
pub use visitor::MemorySink;

use crate::util::LineIndex;
use crate::walker::{self, AstWalker, ParseError};

/// Run the whole pipeline over one translation unit.
///
/// Parses the source, drives a fresh [`LifetimeTracker`] through a single
/// traversal pass, and projects the final state into violations. Each call
/// is an independent run with its own tracker.
pub fn analyze_source(source: &str) -> Result<Vec<Violation>, ParseError> {
    let tree = walker::parse(source)?;

    let mut tracker = LifetimeTracker::new();
    AstWalker::new(source).walk(&tree, &mut tracker);

    let index = LineIndex::new(source);
    Ok(detect(&tracker, &index))
}
