//! Diff results in document coordinates.
//!
//! A [`LinesDiff`] lists changed hunks as [`DetailedLineRangeMapping`]s,
//! each optionally carrying the character edits ([`RangeMapping`]s) inside
//! it, plus the [`MovedText`] blocks found by move detection.

use serde::{Deserialize, Serialize};

use crate::error::DiffError;
use crate::ranges::{LineRange, Position, Range};
use crate::util::char_len;

/// A character range of the original document mapped to one of the modified
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeMapping {
    /// Range in the original document.
    pub original_range: Range,
    /// Range in the modified document.
    pub modified_range: Range,
}

impl RangeMapping {
    /// Creates a mapping.
    #[must_use]
    pub const fn new(original_range: Range, modified_range: Range) -> Self {
        Self {
            original_range,
            modified_range,
        }
    }

    /// Swaps original and modified.
    #[must_use]
    pub const fn flip(&self) -> Self {
        Self::new(self.modified_range, self.original_range)
    }

    /// Smallest mapping containing both.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self::new(
            self.original_range.plus(&other.original_range),
            self.modified_range.plus(&other.modified_range),
        )
    }
}

/// A line range of the original document mapped to one of the modified
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRangeMapping {
    /// Lines in the original document.
    pub original: LineRange,
    /// Lines in the modified document.
    pub modified: LineRange,
}

impl LineRangeMapping {
    /// Creates a mapping.
    #[must_use]
    pub const fn new(original: LineRange, modified: LineRange) -> Self {
        Self { original, modified }
    }

    /// The unchanged regions between sorted `mappings`, for documents of
    /// the given line counts. Regions empty on the modified side are left
    /// out.
    #[must_use]
    pub fn inverse(mappings: &[Self], original_line_count: usize, modified_line_count: usize) -> Vec<Self> {
        let mut result = Vec::new();
        let mut last_original_end = 1;
        let mut last_modified_end = 1;
        for m in mappings {
            let gap = Self::new(
                LineRange::new(last_original_end, m.original.start_line_number()),
                LineRange::new(last_modified_end, m.modified.start_line_number()),
            );
            if !gap.modified.is_empty() {
                result.push(gap);
            }
            last_original_end = m.original.end_line_number_exclusive();
            last_modified_end = m.modified.end_line_number_exclusive();
        }
        let tail = Self::new(
            LineRange::new(last_original_end, original_line_count + 1),
            LineRange::new(last_modified_end, modified_line_count + 1),
        );
        if !tail.modified.is_empty() {
            result.push(tail);
        }
        result
    }

    /// Swaps original and modified.
    #[must_use]
    pub const fn flip(&self) -> Self {
        Self::new(self.modified, self.original)
    }

    /// Smallest mapping containing both.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self::new(self.original.join(&other.original), self.modified.join(&other.modified))
    }

    /// The character range covering the whole hunk.
    ///
    /// Hunks ending inside the documents span from column 1 of the first
    /// line to column 1 of the line after. Hunks touching the document end
    /// are clamped to the end of the last line.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvariantViolation`] for an empty hunk at the
    /// very start of a document that also reaches its end.
    pub fn to_range_mapping<S: AsRef<str>>(&self, original: &[S], modified: &[S]) -> Result<RangeMapping, DiffError> {
        let valid = |line: usize, lines: &[S]| line >= 1 && line <= lines.len();
        if valid(self.original.end_line_number_exclusive(), original)
            && valid(self.modified.end_line_number_exclusive(), modified)
        {
            return Ok(RangeMapping::new(
                Range::new(self.original.start_line_number(), 1, self.original.end_line_number_exclusive(), 1),
                Range::new(self.modified.start_line_number(), 1, self.modified.end_line_number_exclusive(), 1),
            ));
        }
        if !self.original.is_empty() && !self.modified.is_empty() {
            return Ok(RangeMapping::new(
                Range::from_positions(
                    Position::new(self.original.start_line_number(), 1),
                    end_of_line(self.original.end_line_number_exclusive() - 1, original),
                ),
                Range::from_positions(
                    Position::new(self.modified.start_line_number(), 1),
                    end_of_line(self.modified.end_line_number_exclusive() - 1, modified),
                ),
            ));
        }
        if self.original.start_line_number() > 1 && self.modified.start_line_number() > 1 {
            return Ok(RangeMapping::new(
                Range::from_positions(
                    end_of_line(self.original.start_line_number() - 1, original),
                    end_of_line(self.original.end_line_number_exclusive() - 1, original),
                ),
                Range::from_positions(
                    end_of_line(self.modified.start_line_number() - 1, modified),
                    end_of_line(self.modified.end_line_number_exclusive() - 1, modified),
                ),
            ));
        }
        Err(DiffError::InvariantViolation(format!(
            "cannot express {self:?} as a character range"
        )))
    }
}

/// End of `line_number`, clamped into the document.
fn end_of_line<S: AsRef<str>>(line_number: usize, lines: &[S]) -> Position {
    if line_number < 1 || lines.is_empty() {
        return Position::new(1, 1);
    }
    let line_number = line_number.min(lines.len());
    Position::new(line_number, char_len(lines[line_number - 1].as_ref()) + 1)
}

/// A hunk together with the character edits inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedLineRangeMapping {
    /// Lines in the original document.
    pub original: LineRange,
    /// Lines in the modified document.
    pub modified: LineRange,
    /// Character edits, `None` when they were not computed.
    pub inner_changes: Option<Vec<RangeMapping>>,
}

impl DetailedLineRangeMapping {
    /// Creates a hunk.
    #[must_use]
    pub const fn new(original: LineRange, modified: LineRange, inner_changes: Option<Vec<RangeMapping>>) -> Self {
        Self {
            original,
            modified,
            inner_changes,
        }
    }

    /// The line mapping without character edits.
    #[must_use]
    pub const fn line_range_mapping(&self) -> LineRangeMapping {
        LineRangeMapping::new(self.original, self.modified)
    }

    /// Swaps original and modified.
    #[must_use]
    pub fn flip(&self) -> Self {
        Self::new(
            self.modified,
            self.original,
            self.inner_changes
                .as_ref()
                .map(|changes| changes.iter().map(RangeMapping::flip).collect()),
        )
    }
}

/// A block of lines that moved, with the edits made to it on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedText {
    /// Where the block was and where it went.
    pub line_range_mapping: LineRangeMapping,
    /// Diff of the block's original content against its new content, in
    /// document coordinates.
    pub changes: Vec<DetailedLineRangeMapping>,
}

impl MovedText {
    /// Creates a move.
    #[must_use]
    pub const fn new(line_range_mapping: LineRangeMapping, changes: Vec<DetailedLineRangeMapping>) -> Self {
        Self {
            line_range_mapping,
            changes,
        }
    }

    /// Every character edit inside the block, in order.
    #[must_use]
    pub fn range_mappings(&self) -> Vec<RangeMapping> {
        self.changes
            .iter()
            .filter_map(|c| c.inner_changes.as_deref())
            .flatten()
            .copied()
            .collect()
    }

    /// Swaps original and modified.
    #[must_use]
    pub fn flip(&self) -> Self {
        Self::new(
            self.line_range_mapping.flip(),
            self.changes.iter().map(DetailedLineRangeMapping::flip).collect(),
        )
    }
}

/// The result of diffing two documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesDiff {
    /// Changed hunks, sorted and separated by unchanged lines.
    pub changes: Vec<DetailedLineRangeMapping>,
    /// Moved blocks, sorted by original start line.
    pub moves: Vec<MovedText>,
    /// Set when a time budget ran out and the result may be coarse.
    pub hit_timeout: bool,
}

impl LinesDiff {
    /// Returns `true` if no change and no move was found.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.changes.is_empty() && self.moves.is_empty()
    }
}
