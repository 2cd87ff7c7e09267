//! Test infrastructure for analysis fixtures.
//!
//! Fixture files are real C/C++ sources under `test-fixtures/` with the
//! expected findings embedded as `//~` trailing comments:
//!
//! ```cpp
//! void simple_uaf() {
//!     int* ptr = new int(42);
//!     delete ptr;   //~ freed: ptr
//!     *ptr = 10;    //~ uaf: ptr
//! }
//! ```
//!
//! A fixture with no markers asserts a clean report. Verification runs the
//! full pipeline (walker, tracker, detector) and diffs the violations
//! against the markers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use uafcheck::testing::verify_file;
//!
//! let result = verify_file(&path)?;
//! if !result.passed() {
//!     panic!("{}", result);
//! }
//! ```

pub mod error;
pub mod expectation;

pub use error::{ExpectationFailure, FixtureResult, VerificationError};
pub use expectation::{Expectation, ExpectationKind, ExpectationParseError, ExpectationSet};

use std::path::Path;

use crate::analysis::{analyze_source, Violation};

/// Verify the expectations embedded in a fixture file.
pub fn verify_file(path: &Path) -> Result<FixtureResult, VerificationError> {
    let source = std::fs::read_to_string(path)?;
    verify_source(path, &source)
}

/// Verify expectations against in-memory source.
pub fn verify_source(path: &Path, source: &str) -> Result<FixtureResult, VerificationError> {
    let expectations =
        ExpectationSet::parse(source).map_err(VerificationError::BadExpectations)?;
    let violations = analyze_source(source)?;

    Ok(FixtureResult {
        path: path.to_path_buf(),
        failures: diff(&expectations, &violations),
    })
}

/// Compare expected findings against actual violations.
fn diff(expectations: &ExpectationSet, violations: &[Violation]) -> Vec<ExpectationFailure> {
    let mut failures = Vec::new();

    for violation in violations {
        match expectations.use_sites.get(&violation.variable) {
            None => failures.push(ExpectationFailure::UnexpectedViolation {
                var: violation.variable.clone(),
                free_line: violation.free_line,
                use_line: violation.use_line,
            }),
            Some(&expected_use) if expected_use != violation.use_line => {
                failures.push(ExpectationFailure::WrongUseLine {
                    var: violation.variable.clone(),
                    expected: expected_use,
                    actual: violation.use_line,
                });
            }
            Some(_) => {
                if let Some(&expected_free) = expectations.free_sites.get(&violation.variable) {
                    if expected_free != violation.free_line {
                        failures.push(ExpectationFailure::WrongFreeLine {
                            var: violation.variable.clone(),
                            expected: expected_free,
                            actual: violation.free_line,
                        });
                    }
                }
            }
        }
    }

    for (var, &use_line) in &expectations.use_sites {
        if !violations.iter().any(|v| &v.variable == var) {
            failures.push(ExpectationFailure::MissingViolation {
                var: var.clone(),
                use_line,
            });
        }
    }

    failures
}
