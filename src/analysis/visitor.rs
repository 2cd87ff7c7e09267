//! Event-sink seam between syntax traversal and lifetime tracking.
//!
//! The tracker never sees a syntax tree. Whatever walks the source -
//! the tree-sitter walker in this crate, or a hand-rolled scanner in a
//! test - pushes events through this trait in traversal order.

use crate::util::SourcePos;

use super::lifetime::LifetimeTracker;

/// Receiver for memory lifecycle events discovered during traversal.
pub trait MemorySink {
    /// A variable was initialized from an allocation expression.
    fn allocation(&mut self, name: &str, pos: SourcePos);

    /// A variable was released (`free(x)`, `delete x`, `delete[] x`).
    fn release(&mut self, name: &str, pos: SourcePos);

    /// A bare identifier reference. Emitted for every use; filtering by
    /// lifetime state happens inside the sink.
    fn use_of(&mut self, name: &str, pos: SourcePos);
}

impl MemorySink for LifetimeTracker {
    fn allocation(&mut self, name: &str, pos: SourcePos) {
        self.track_allocation(name, pos);
    }

    fn release(&mut self, name: &str, pos: SourcePos) {
        self.track_free(name, pos);
    }

    fn use_of(&mut self, name: &str, pos: SourcePos) {
        self.track_use(name, pos);
    }
}
