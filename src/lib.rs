//! uafcheck: use-after-free lint for C/C++ translation units
//!
//! This library analyzes one source file in a single traversal pass and
//! flags variables that are referenced after being released with `free`
//! or `delete`. Tracking is keyed by textual identifier only: there is no
//! scope, alias, or control-flow modeling, and repeated release is
//! observed but never reported as its own finding.

pub mod analysis;
pub mod output;
pub mod testing;
pub mod util;
pub mod walker;

pub use analysis::{analyze_source, detect, LifetimeTracker, MemorySink, Violation};
pub use output::render_report;
pub use util::{LineIndex, SourcePos};
