//! Report output.

mod report;

pub use report::render_report;
