//! Rebuilding the modified document from the original and a diff.

use crate::error::DiffError;
use crate::mapping::{DetailedLineRangeMapping, RangeMapping};
use crate::ranges::Position;

/// A document as one char buffer with the offset of every line start.
struct Text {
    chars: Vec<char>,
    line_starts: Vec<usize>,
}

impl Text {
    fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut chars = Vec::new();
        let mut line_starts = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                chars.push('\n');
            }
            line_starts.push(chars.len());
            chars.extend(line.as_ref().chars());
        }
        Self { chars, line_starts }
    }

    fn offset(&self, position: Position) -> usize {
        let line_start = position
            .line_number
            .checked_sub(1)
            .and_then(|i| self.line_starts.get(i))
            .copied()
            .unwrap_or(self.chars.len());
        (line_start + position.column.saturating_sub(1)).min(self.chars.len())
    }
}

/// Applies `changes` to `original`. Character edits are used where present,
/// otherwise whole hunks are replaced by the corresponding lines of
/// `modified`.
///
/// # Errors
///
/// Returns [`DiffError::InvariantViolation`] if a hunk cannot be expressed
/// as a character range of the documents.
pub fn apply_line_changes<S: AsRef<str>>(
    original: &[S],
    modified: &[S],
    changes: &[DetailedLineRangeMapping],
) -> Result<Vec<String>, DiffError> {
    let original_text = Text::new(original);
    let modified_text = Text::new(modified);

    let mut edits: Vec<RangeMapping> = Vec::new();
    for change in changes {
        match &change.inner_changes {
            Some(inner) => edits.extend(inner.iter().copied()),
            None => edits.push(change.line_range_mapping().to_range_mapping(original, modified)?),
        }
    }

    let mut result: Vec<char> = Vec::with_capacity(modified_text.chars.len());
    let mut position = 0;
    for edit in &edits {
        let start = original_text.offset(edit.original_range.start()).max(position);
        let end = original_text.offset(edit.original_range.end()).max(start);
        result.extend(&original_text.chars[position..start]);
        let replacement_start = modified_text.offset(edit.modified_range.start());
        let replacement_end = modified_text.offset(edit.modified_range.end()).max(replacement_start);
        result.extend(&modified_text.chars[replacement_start..replacement_end]);
        position = end;
    }
    result.extend(&original_text.chars[position..]);

    Ok(result.iter().collect::<String>().split('\n').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::{LineRange, Range};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_applies_inner_changes() {
        let original = ["a", "b", "c"];
        let modified = ["a", "x", "c"];
        let changes = [DetailedLineRangeMapping::new(
            LineRange::new(2, 3),
            LineRange::new(2, 3),
            Some(vec![RangeMapping::new(Range::new(2, 1, 2, 2), Range::new(2, 1, 2, 2))]),
        )];
        assert_eq!(apply_line_changes(&original, &modified, &changes).unwrap(), modified);
    }

    #[test]
    fn test_replaces_whole_hunks_without_inner_changes() {
        let original = ["a", "b", "c"];
        let modified = ["a", "x", "y", "c", "d"];
        let changes = [
            DetailedLineRangeMapping::new(LineRange::new(2, 3), LineRange::new(2, 4), None),
            DetailedLineRangeMapping::new(LineRange::new(4, 4), LineRange::new(5, 6), None),
        ];
        assert_eq!(apply_line_changes(&original, &modified, &changes).unwrap(), modified);
    }

    #[test]
    fn test_no_changes_copies_original() {
        let lines = ["one", "", "three"];
        assert_eq!(apply_line_changes(&lines, &lines, &[]).unwrap(), lines);
    }
}
