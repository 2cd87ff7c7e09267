//! Plain-text report rendering.
//!
//! Pure formatting; all decisions were made upstream. The text layout is
//! fixed and tests depend on it byte for byte.

use crate::analysis::Violation;

/// Render the analysis report.
pub fn render_report(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "No memory safety issues found!\n".to_string();
    }

    let mut output = String::new();
    output.push_str("\n=== Memory Safety Analysis Results ===\n\n");

    for violation in violations {
        output.push_str("error: use-after-free detected\n");
        output.push_str(&format!("  Variable: {}\n", violation.variable));
        output.push_str(&format!("  Freed at line: {}\n", violation.free_line));
        output.push_str(&format!("  Used at line: {}\n", violation.use_line));
        output.push_str(&format!("  {}\n\n", violation.message));
    }

    output.push_str(&format!(
        "Found {} memory safety violation(s)\n",
        violations.len()
    ));

    output
}
