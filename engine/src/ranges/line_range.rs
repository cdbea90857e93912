//! Half-open 1-based line intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::OffsetRange;
use crate::error::DiffError;

/// Lines `start_line_number..end_line_number_exclusive`, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLineRange")]
pub struct LineRange {
    start_line_number: usize,
    end_line_number_exclusive: usize,
}

/// Wire form of [`LineRange`], checked on the way in.
#[derive(Deserialize)]
struct RawLineRange {
    start_line_number: usize,
    end_line_number_exclusive: usize,
}

impl TryFrom<RawLineRange> for LineRange {
    type Error = DiffError;

    fn try_from(raw: RawLineRange) -> Result<Self, Self::Error> {
        Self::try_new(raw.start_line_number, raw.end_line_number_exclusive)
    }
}

impl LineRange {
    /// Creates a line range.
    ///
    /// # Panics
    ///
    /// Panics if `start > end_exclusive`.
    #[must_use]
    pub fn new(start_line_number: usize, end_line_number_exclusive: usize) -> Self {
        match Self::try_new(start_line_number, end_line_number_exclusive) {
            Ok(range) => range,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a line range, rejecting reversed bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidLineRange`] if `start > end_exclusive`.
    pub fn try_new(start_line_number: usize, end_line_number_exclusive: usize) -> Result<Self, DiffError> {
        if start_line_number > end_line_number_exclusive {
            return Err(DiffError::InvalidLineRange {
                start: start_line_number,
                end_exclusive: end_line_number_exclusive,
            });
        }
        Ok(Self {
            start_line_number,
            end_line_number_exclusive,
        })
    }

    /// `length` lines starting at `start_line_number`.
    #[must_use]
    pub const fn of_length(start_line_number: usize, length: usize) -> Self {
        Self {
            start_line_number,
            end_line_number_exclusive: start_line_number + length,
        }
    }

    /// First line.
    #[must_use]
    pub const fn start_line_number(&self) -> usize {
        self.start_line_number
    }

    /// One past the last line.
    #[must_use]
    pub const fn end_line_number_exclusive(&self) -> usize {
        self.end_line_number_exclusive
    }

    /// Number of lines.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_line_number_exclusive - self.start_line_number
    }

    /// Returns `true` if the range holds no line.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_line_number == self.end_line_number_exclusive
    }

    /// Returns `true` if `line_number` is covered.
    #[must_use]
    pub const fn contains(&self, line_number: usize) -> bool {
        self.start_line_number <= line_number && line_number < self.end_line_number_exclusive
    }

    /// Shifts both bounds by `offset` lines.
    ///
    /// # Panics
    ///
    /// Panics if `offset` moves the start below zero.
    #[must_use]
    pub const fn delta(&self, offset: isize) -> Self {
        Self {
            start_line_number: super::shift(self.start_line_number, offset),
            end_line_number_exclusive: super::shift(self.end_line_number_exclusive, offset),
        }
    }

    /// Smallest range containing both.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self::new(
            self.start_line_number.min(other.start_line_number),
            self.end_line_number_exclusive.max(other.end_line_number_exclusive),
        )
    }

    /// Common part, `None` if the ranges neither overlap nor touch.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start_line_number.max(other.start_line_number);
        let end = self.end_line_number_exclusive.min(other.end_line_number_exclusive);
        (start <= end).then(|| Self::new(start, end))
    }

    /// Returns `true` if the ranges share at least one line.
    #[must_use]
    pub fn intersects_strict(&self, other: &Self) -> bool {
        self.start_line_number < other.end_line_number_exclusive
            && other.start_line_number < self.end_line_number_exclusive
    }

    /// Returns `true` if the ranges share a line or are adjacent.
    #[must_use]
    pub fn overlap_or_touch(&self, other: &Self) -> bool {
        self.start_line_number <= other.end_line_number_exclusive
            && other.start_line_number <= self.end_line_number_exclusive
    }

    /// 0-based offsets of the covered lines.
    ///
    /// # Panics
    ///
    /// Panics if the range starts at line 0.
    #[must_use]
    pub fn to_offset_range(&self) -> OffsetRange {
        OffsetRange::new(self.start_line_number - 1, self.end_line_number_exclusive - 1)
    }

    /// Lines covering 0-based `offsets`.
    #[must_use]
    pub const fn from_offset_range(offsets: OffsetRange) -> Self {
        Self {
            start_line_number: offsets.start() + 1,
            end_line_number_exclusive: offsets.end_exclusive() + 1,
        }
    }

    /// Iterates over the line numbers.
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start_line_number..self.end_line_number_exclusive
    }

    /// The covered lines of a 1-based document.
    #[must_use]
    pub fn slice<'a, T>(&self, lines: &'a [T]) -> &'a [T] {
        &lines[self.start_line_number - 1..self.end_line_number_exclusive - 1]
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start_line_number, self.end_line_number_exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_checks_bounds() {
        let reversed = r#"{"start_line_number":5,"end_line_number_exclusive":2}"#;
        assert!(serde_json::from_str::<LineRange>(reversed).is_err());
        let range: LineRange = serde_json::from_str(r#"{"start_line_number":2,"end_line_number_exclusive":5}"#).unwrap();
        assert_eq!(range, LineRange::new(2, 5));
    }

    #[test]
    fn test_try_new() {
        assert!(LineRange::try_new(4, 3).is_err());
        assert_eq!(LineRange::try_new(1, 3).unwrap().len(), 2);
    }

    #[test]
    fn test_touch_vs_strict_intersection() {
        let a = LineRange::new(1, 3);
        let b = LineRange::new(3, 5);
        assert!(!a.intersects_strict(&b));
        assert!(a.overlap_or_touch(&b));
        assert!(!a.overlap_or_touch(&LineRange::new(4, 5)));
        assert_eq!(a.intersect(&b), Some(LineRange::new(3, 3)));
    }

    #[test]
    fn test_offset_conversion() {
        let r = LineRange::new(2, 4);
        assert_eq!(r.to_offset_range(), OffsetRange::new(1, 3));
        assert_eq!(LineRange::from_offset_range(OffsetRange::new(1, 3)), r);
        assert_eq!(r.slice(&["a", "b", "c", "d"]), &["b", "c"]);
    }

    #[test]
    fn test_join_and_delta() {
        let r = LineRange::new(2, 3).join(&LineRange::new(5, 6));
        assert_eq!(r, LineRange::new(2, 6));
        assert_eq!(r.delta(-1), LineRange::new(1, 5));
        assert!(r.contains(5));
        assert!(!r.contains(6));
    }
}
