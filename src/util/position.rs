//! Source position utilities for converting byte offsets to line numbers.

/// An opaque position in the analyzed source text.
///
/// The tracker stores these without interpreting them; only the
/// [`LineIndex`] knows how to turn one into a line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos(pub usize);

impl SourcePos {
    /// The byte offset this position denotes.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Precomputed line-start table for one source file.
///
/// Line numbers are 1-indexed to match compiler diagnostics.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. Always begins with 0.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for a source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    /// Resolve a position to its 1-indexed line number.
    ///
    /// Positions past the end of the text resolve to the last line.
    pub fn line(&self, pos: SourcePos) -> u32 {
        match self.line_starts.binary_search(&pos.offset()) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }
}
