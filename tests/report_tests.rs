//! End-to-end report format tests.
//!
//! The report text is part of the tool's contract, so these compare
//! rendered output byte for byte.

use uafcheck::{analyze_source, render_report};

fn report_for(source: &str) -> String {
    let violations = analyze_source(source).expect("source should parse");
    render_report(&violations)
}

#[test]
fn test_use_after_free_scenario() {
    let source = "\
void f() {
    int* ptr = new int(42);
    delete ptr;
    *ptr = 10;
}
";
    let expected = "\n=== Memory Safety Analysis Results ===\n\n\
error: use-after-free detected\n\
\x20 Variable: ptr\n\
\x20 Freed at line: 3\n\
\x20 Used at line: 4\n\
\x20 Use-after-free detected for variable 'ptr'\n\n\
Found 1 memory safety violation(s)\n";
    assert_eq!(report_for(source), expected);
}

#[test]
fn test_use_before_free_scenario_is_clean() {
    let source = "\
void f() {
    int* ptr = new int(42);
    int value = *ptr;
    delete ptr;
}
";
    assert_eq!(report_for(source), "No memory safety issues found!\n");
}

#[test]
fn test_mixed_scenario_reports_only_the_violator() {
    let source = "\
void f() {
    int* arr = new int[8];
    int* safe = new int(1);
    delete[] arr;
    arr[0] = 7;
    *safe = 2;
    delete safe;
}
";
    let report = report_for(source);
    assert_eq!(report.matches("error: use-after-free detected").count(), 1);
    assert!(report.contains("  Variable: arr\n"));
    assert!(!report.contains("Variable: safe"));
    assert!(report.ends_with("Found 1 memory safety violation(s)\n"));
}

#[test]
fn test_double_free_scenario_is_clean() {
    let source = "\
void f() {
    int* p = new int(5);
    delete p;
    delete p;
}
";
    assert_eq!(report_for(source), "No memory safety issues found!\n");
}

#[test]
fn test_multiple_violations_are_ordered_by_name() {
    let source = "\
void f() {
    int* zeta = new int;
    int* alpha = new int;
    delete zeta;
    delete alpha;
    *zeta = 1;
    *alpha = 2;
}
";
    let report = report_for(source);
    let alpha_at = report.find("Variable: alpha").expect("alpha reported");
    let zeta_at = report.find("Variable: zeta").expect("zeta reported");
    assert!(alpha_at < zeta_at);
    assert!(report.ends_with("Found 2 memory safety violation(s)\n"));
}
