//! One element per line.

use super::Sequence;
use crate::ranges::OffsetRange;
use crate::util::indentation;

/// Lines keyed by the hash of their trimmed text. Two lines differing only in
/// surrounding whitespace share a key but are not strongly equal.
#[derive(Debug, Clone)]
pub struct LineSequence<'a> {
    trimmed_hash: Vec<u32>,
    lines: &'a [&'a str],
}

impl<'a> LineSequence<'a> {
    /// Wraps `lines` and their per-line keys.
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length.
    #[must_use]
    pub fn new(trimmed_hash: Vec<u32>, lines: &'a [&'a str]) -> Self {
        assert_eq!(trimmed_hash.len(), lines.len(), "one hash per line");
        Self { trimmed_hash, lines }
    }

    /// The lines in `range`, joined with `\n`.
    #[must_use]
    pub fn text(&self, range: OffsetRange) -> String {
        range.slice(self.lines).join("\n")
    }

    /// The wrapped lines.
    #[must_use]
    pub fn lines(&self) -> &'a [&'a str] {
        self.lines
    }
}

impl Sequence for LineSequence<'_> {
    fn element(&self, offset: usize) -> u32 {
        self.trimmed_hash[offset]
    }

    fn len(&self) -> usize {
        self.trimmed_hash.len()
    }

    /// Boundaries between weakly indented lines score highest.
    fn boundary_score(&self, length: usize) -> Option<i32> {
        let before = if length == 0 { 0 } else { indentation(self.lines[length - 1]) };
        let after = if length == self.lines.len() { 0 } else { indentation(self.lines[length]) };
        Some(1000 - (before + after) as i32)
    }

    fn is_strongly_equal(&self, offset1: usize, offset2: usize) -> bool {
        self.lines[offset1] == self.lines[offset2]
    }
}
