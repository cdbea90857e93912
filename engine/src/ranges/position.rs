//! Line/column positions and character ranges in document coordinates.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line and column. Columns count chars; `len + 1` is the end of
/// the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line_number: usize,
    /// 1-based column.
    pub column: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(line_number: usize, column: usize) -> Self {
        Self {
            line_number,
            column,
        }
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    /// Returns `true` if `self` is before or equal to `other`.
    #[must_use]
    pub fn is_before_or_equal(&self, other: &Self) -> bool {
        self <= other
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line_number
            .cmp(&other.line_number)
            .then(self.column.cmp(&other.column))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line_number, self.column)
    }
}

/// A character range between two positions, start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start line number.
    pub start_line_number: usize,
    /// Start column.
    pub start_column: usize,
    /// End line number.
    pub end_line_number: usize,
    /// End column (exclusive).
    pub end_column: usize,
}

impl Range {
    /// Creates a range. Reversed endpoints are swapped.
    #[must_use]
    pub fn new(start_line_number: usize, start_column: usize, end_line_number: usize, end_column: usize) -> Self {
        Self::from_positions(
            Position::new(start_line_number, start_column),
            Position::new(end_line_number, end_column),
        )
    }

    /// Range between two positions, ordered.
    #[must_use]
    pub fn from_positions(a: Position, b: Position) -> Self {
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        Self {
            start_line_number: start.line_number,
            start_column: start.column,
            end_line_number: end.line_number,
            end_column: end.column,
        }
    }

    /// Empty range at `position`.
    #[must_use]
    pub const fn empty_at(position: Position) -> Self {
        Self {
            start_line_number: position.line_number,
            start_column: position.column,
            end_line_number: position.line_number,
            end_column: position.column,
        }
    }

    /// Start position.
    #[must_use]
    pub const fn start(&self) -> Position {
        Position::new(self.start_line_number, self.start_column)
    }

    /// End position.
    #[must_use]
    pub const fn end(&self) -> Position {
        Position::new(self.end_line_number, self.end_column)
    }

    /// Returns `true` if start and end coincide.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_line_number == self.end_line_number && self.start_column == self.end_column
    }

    /// Smallest range containing both.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self::from_positions(self.start().min(other.start()), self.end().max(other.end()))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.start_line_number, self.start_column, self.end_line_number, self.end_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 5).is_before(&Position::new(2, 1)));
        assert!(Position::new(2, 1).is_before(&Position::new(2, 2)));
        assert!(Position::new(2, 2).is_before_or_equal(&Position::new(2, 2)));
        assert!(!Position::new(2, 2).is_before(&Position::new(2, 2)));
    }

    #[test]
    fn test_range_normalizes_endpoints() {
        let r = Range::new(3, 1, 1, 4);
        assert_eq!(r.start(), Position::new(1, 4));
        assert_eq!(r.end(), Position::new(3, 1));
        assert!(Range::empty_at(Position::new(2, 2)).is_empty());
        assert_eq!(r.to_string(), "[1,4 -> 3,1]");
    }

    #[test]
    fn test_plus() {
        let a = Range::new(1, 1, 1, 3);
        let b = Range::new(2, 1, 2, 2);
        assert_eq!(a.plus(&b), Range::new(1, 1, 2, 2));
    }
}
