//! Expectation parsing for analysis fixtures.
//!
//! Fixture files carry `//~` trailing comments naming the finding expected
//! at that line:
//!
//! ```text
//! delete ptr;   //~ freed: ptr     release site of an expected violation
//! *ptr = 10;    //~ uaf: ptr       use site of an expected violation
//! ```
//!
//! A fixture with no markers asserts that analysis finds nothing.

use std::collections::HashMap;

use thiserror::Error;

/// What a marker claims about its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectationKind {
    /// This line is the use site of a use-after-free for the variable.
    UseAfterFree,
    /// This line is the release site of a use-after-free for the variable.
    Freed,
}

impl ExpectationKind {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "uaf" => Some(ExpectationKind::UseAfterFree),
            "freed" => Some(ExpectationKind::Freed),
            _ => None,
        }
    }
}

/// A single parsed `//~` marker.
#[derive(Debug, Clone)]
pub struct Expectation {
    /// Variable the finding is about.
    pub var: String,
    /// What the marker claims.
    pub kind: ExpectationKind,
    /// 1-indexed line the marker sits on.
    pub line: u32,
    /// Original marker text, for error messages.
    pub raw: String,
}

/// Malformed `//~` marker.
#[derive(Debug, Clone, Error)]
pub enum ExpectationParseError {
    /// Marker kind was not `uaf` or `freed`.
    #[error("line {line}: unknown expectation kind in '{text}'")]
    UnknownKind { line: u32, text: String },
    /// Marker had no `kind: var` shape.
    #[error("line {line}: malformed expectation '{text}'")]
    Malformed { line: u32, text: String },
    /// Marker named no variable.
    #[error("line {line}: missing variable name")]
    MissingVariable { line: u32 },
}

/// All expectations in a fixture file.
#[derive(Debug, Default)]
pub struct ExpectationSet {
    /// Expected use sites, keyed by variable name.
    pub use_sites: HashMap<String, u32>,
    /// Expected release sites, keyed by variable name.
    pub free_sites: HashMap<String, u32>,
}

impl ExpectationSet {
    /// Parse every `//~` marker in a source text.
    pub fn parse(source: &str) -> Result<Self, Vec<ExpectationParseError>> {
        let mut set = ExpectationSet::default();
        let mut errors = Vec::new();

        for (idx, line_text) in source.lines().enumerate() {
            let line = idx as u32 + 1;
            let Some(marker_at) = line_text.find("//~") else {
                continue;
            };
            let text = line_text[marker_at + 3..].trim();

            match parse_marker(text, line) {
                Ok(expectation) => match expectation.kind {
                    ExpectationKind::UseAfterFree => {
                        set.use_sites.insert(expectation.var, line);
                    }
                    ExpectationKind::Freed => {
                        set.free_sites.insert(expectation.var, line);
                    }
                },
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(set)
        } else {
            Err(errors)
        }
    }

    /// True if the fixture expects no findings at all.
    pub fn is_empty(&self) -> bool {
        self.use_sites.is_empty() && self.free_sites.is_empty()
    }
}

/// Parse one marker body of the form `kind: var`.
fn parse_marker(text: &str, line: u32) -> Result<Expectation, ExpectationParseError> {
    let Some((kind_text, var_text)) = text.split_once(':') else {
        return Err(ExpectationParseError::Malformed {
            line,
            text: text.to_string(),
        });
    };

    let kind = ExpectationKind::parse(kind_text.trim()).ok_or_else(|| {
        ExpectationParseError::UnknownKind {
            line,
            text: text.to_string(),
        }
    })?;

    let var = var_text.trim();
    if var.is_empty() {
        return Err(ExpectationParseError::MissingVariable { line });
    }

    Ok(Expectation {
        var: var.to_string(),
        kind,
        line,
        raw: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        let source = "\
void f() {
    int* p = new int;
    delete p;   //~ freed: p
    *p = 1;     //~ uaf: p
}
";
        let set = ExpectationSet::parse(source).unwrap();
        assert_eq!(set.free_sites.get("p"), Some(&3));
        assert_eq!(set.use_sites.get("p"), Some(&4));
    }

    #[test]
    fn test_no_markers_is_empty() {
        let set = ExpectationSet::parse("int main() { return 0; }\n").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let errors = ExpectationSet::parse("delete p; //~ leaked: p\n").unwrap_err();
        assert!(matches!(
            errors[0],
            ExpectationParseError::UnknownKind { line: 1, .. }
        ));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let errors = ExpectationSet::parse("delete p; //~ uaf:\n").unwrap_err();
        assert!(matches!(
            errors[0],
            ExpectationParseError::MissingVariable { line: 1 }
        ));
    }

    #[test]
    fn test_marker_without_colon_is_malformed() {
        let errors = ExpectationSet::parse("*p = 1; //~ uaf p\n").unwrap_err();
        assert!(matches!(
            errors[0],
            ExpectationParseError::Malformed { line: 1, .. }
        ));
    }
}
