//! Violation detection: projecting tracker state into reportable records.

use crate::util::{LineIndex, SourcePos};

use super::lifetime::LifetimeTracker;

/// Resolves an opaque source position to a 1-indexed line number.
///
/// Kept as a trait so tests can substitute a resolver without building a
/// real source file.
pub trait ResolveLine {
    /// Line number for `pos`, or `None` if it cannot be resolved.
    fn line_of(&self, pos: SourcePos) -> Option<u32>;
}

impl ResolveLine for LineIndex {
    fn line_of(&self, pos: SourcePos) -> Option<u32> {
        Some(self.line(pos))
    }
}

/// A detected use-after-free, ready for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The offending variable's identifier.
    pub variable: String,
    /// Line of the release that preceded the use, or 0 if unresolvable.
    pub free_line: u32,
    /// Line of the last use observed after the release, or 0 if unresolvable.
    pub use_line: u32,
    /// Human-readable description.
    pub message: String,
}

/// Build violation records from the tracker's final state.
///
/// Output order follows [`LifetimeTracker::violations`], so it is
/// name-lexicographic and stable. A record with `used_after_free` set but
/// no `freed_at` cannot be produced by the state machine, but if one ever
/// shows up its line defaults to 0 rather than failing the run.
pub fn detect(tracker: &LifetimeTracker, lines: &dyn ResolveLine) -> Vec<Violation> {
    tracker
        .violations()
        .into_iter()
        .map(|(name, lifetime)| {
            let free_line = lifetime
                .freed_at
                .and_then(|pos| lines.line_of(pos))
                .unwrap_or(0);
            let use_line = lifetime
                .used_after_free
                .and_then(|pos| lines.line_of(pos))
                .unwrap_or(0);
            Violation {
                variable: name.to_string(),
                free_line,
                use_line,
                message: format!("Use-after-free detected for variable '{}'", name),
            }
        })
        .collect()
}
