//! Error and result types for fixture verification.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::walker::ParseError;

use super::expectation::ExpectationParseError;

/// One mismatch between expectations and analysis output.
#[derive(Debug, Clone)]
pub enum ExpectationFailure {
    /// A marker expected a violation the analysis did not produce.
    MissingViolation { var: String, use_line: u32 },
    /// The analysis produced a violation no marker expected.
    UnexpectedViolation {
        var: String,
        free_line: u32,
        use_line: u32,
    },
    /// Variable was flagged, but at a different use line than marked.
    WrongUseLine {
        var: String,
        expected: u32,
        actual: u32,
    },
    /// A `freed:` marker disagrees with the reported release line.
    WrongFreeLine {
        var: String,
        expected: u32,
        actual: u32,
    },
}

impl fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectationFailure::MissingViolation { var, use_line } => {
                write!(
                    f,
                    "expected use-after-free for '{}' at line {}, none reported",
                    var, use_line
                )
            }
            ExpectationFailure::UnexpectedViolation {
                var,
                free_line,
                use_line,
            } => {
                write!(
                    f,
                    "unexpected use-after-free for '{}' (freed line {}, used line {})",
                    var, free_line, use_line
                )
            }
            ExpectationFailure::WrongUseLine {
                var,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "'{}': expected use at line {}, reported at line {}",
                    var, expected, actual
                )
            }
            ExpectationFailure::WrongFreeLine {
                var,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "'{}': expected release at line {}, reported at line {}",
                    var, expected, actual
                )
            }
        }
    }
}

/// Outcome of verifying one fixture file.
#[derive(Debug)]
pub struct FixtureResult {
    /// Path to the fixture.
    pub path: PathBuf,
    /// Mismatches found (empty means the fixture passed).
    pub failures: Vec<ExpectationFailure>,
}

impl FixtureResult {
    /// True if the analysis matched every expectation.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for FixtureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "{}: ok", self.path.display());
        }
        writeln!(f, "{}:", self.path.display())?;
        for failure in &self.failures {
            writeln!(f, "  {}", failure)?;
        }
        Ok(())
    }
}

/// A fixture could not be verified at all.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Fixture file could not be read.
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
    /// Fixture source could not be parsed.
    #[error("failed to parse fixture: {0}")]
    Parse(#[from] ParseError),
    /// One or more `//~` markers were malformed.
    #[error("invalid expectations: {}", format_errors(.0))]
    BadExpectations(Vec<ExpectationParseError>),
}

fn format_errors(errors: &[ExpectationParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
