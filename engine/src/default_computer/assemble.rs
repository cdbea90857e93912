//! Grouping character edits back into line hunks.

use crate::error::DiffError;
use crate::mapping::{DetailedLineRangeMapping, RangeMapping};
use crate::ranges::{LineRange, Position};
use crate::util::{char_len, check_adjacent_items};

fn line_length<S: AsRef<str>>(lines: &[S], line_number: usize) -> usize {
    line_number
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .map_or(0, |l| char_len(l.as_ref()))
}

/// The lines touched by `mapping`, as a one-edit hunk.
///
/// An edit ending at column 1 leaves its last line untouched, and one
/// starting at the end of a line leaves that line untouched; both are
/// dropped from the line range as long as it does not become empty.
#[must_use]
pub fn get_line_range_mapping<S: AsRef<str>>(
    mapping: &RangeMapping,
    original: &[S],
    modified: &[S],
) -> DetailedLineRangeMapping {
    let (o, m) = (&mapping.original_range, &mapping.modified_range);

    let line_end_delta = usize::from(
        m.end_column == 1
            && o.end_column == 1
            && o.start_line_number <= o.end_line_number
            && m.start_line_number <= m.end_line_number,
    );
    let o_end = o.end_line_number + 1 - line_end_delta;
    let m_end = m.end_line_number + 1 - line_end_delta;

    let line_start_delta = usize::from(
        m.start_column > line_length(modified, m.start_line_number)
            && o.start_column > line_length(original, o.start_line_number)
            && o.start_line_number < o_end
            && m.start_line_number < m_end,
    );

    DetailedLineRangeMapping::new(
        LineRange::new(o.start_line_number + line_start_delta, o_end),
        LineRange::new(m.start_line_number + line_start_delta, m_end),
        Some(vec![*mapping]),
    )
}

/// Groups character edits whose line ranges overlap or touch into hunks and
/// checks that the hunks are sorted and separated by equal gaps.
///
/// # Errors
///
/// Returns [`DiffError::InvariantViolation`] if the hunks are inconsistent,
/// which indicates a bug.
pub fn line_range_mapping_from_range_mappings<S: AsRef<str>>(
    alignments: &[RangeMapping],
    original: &[S],
    modified: &[S],
    dont_assert_start_line: bool,
) -> Result<Vec<DetailedLineRangeMapping>, DiffError> {
    let mut changes: Vec<DetailedLineRangeMapping> = Vec::new();
    for mapping in alignments.iter().map(|a| get_line_range_mapping(a, original, modified)) {
        match changes.last_mut() {
            Some(last)
                if last.original.overlap_or_touch(&mapping.original)
                    || last.modified.overlap_or_touch(&mapping.modified) =>
            {
                last.original = last.original.join(&mapping.original);
                last.modified = last.modified.join(&mapping.modified);
                if let (Some(inner), Some(more)) = (last.inner_changes.as_mut(), mapping.inner_changes) {
                    inner.extend(more);
                }
            }
            _ => changes.push(mapping),
        }
    }

    if !dont_assert_start_line && let (Some(first), Some(last)) = (changes.first(), changes.last()) {
        if first.original.start_line_number() != first.modified.start_line_number() {
            return Err(DiffError::InvariantViolation(format!(
                "first hunk starts at different lines: {} vs {}",
                first.original, first.modified
            )));
        }
        let tail_original = (original.len() + 1).checked_sub(last.original.end_line_number_exclusive());
        let tail_modified = (modified.len() + 1).checked_sub(last.modified.end_line_number_exclusive());
        if tail_original != tail_modified {
            return Err(DiffError::InvariantViolation(format!(
                "unequal tails after last hunk: {} vs {}",
                last.original, last.modified
            )));
        }
    }

    let separated = check_adjacent_items(&changes, |m1, m2| {
        m1.original.end_line_number_exclusive() < m2.original.start_line_number()
            && m1.modified.end_line_number_exclusive() < m2.modified.start_line_number()
            && m2.original.start_line_number() - m1.original.end_line_number_exclusive()
                == m2.modified.start_line_number() - m1.modified.end_line_number_exclusive()
    });
    if !separated {
        return Err(DiffError::InvariantViolation(
            "hunks overlap or are separated by unequal gaps".to_string(),
        ));
    }
    Ok(changes)
}

/// Checks that every hunk and character edit lies within the documents.
///
/// # Errors
///
/// Returns [`DiffError::InvariantViolation`] for the first offending hunk.
pub fn validate_changes<S: AsRef<str>>(
    changes: &[DetailedLineRangeMapping],
    original: &[S],
    modified: &[S],
) -> Result<(), DiffError> {
    let valid_position = |pos: Position, lines: &[S]| {
        pos.line_number >= 1
            && pos.line_number <= lines.len()
            && pos.column >= 1
            && pos.column <= line_length(lines, pos.line_number) + 1
    };
    let valid_range = |range: &LineRange, lines: &[S]| {
        range.start_line_number() >= 1 && range.end_line_number_exclusive() <= lines.len() + 1
    };
    for c in changes {
        let Some(inner) = &c.inner_changes else {
            return Err(DiffError::InvariantViolation(format!("hunk {} lacks character edits", c.original)));
        };
        let inner_valid = inner.iter().all(|ic| {
            valid_position(ic.original_range.start(), original)
                && valid_position(ic.original_range.end(), original)
                && valid_position(ic.modified_range.start(), modified)
                && valid_position(ic.modified_range.end(), modified)
        });
        if !inner_valid || !valid_range(&c.original, original) || !valid_range(&c.modified, modified) {
            return Err(DiffError::InvariantViolation(format!(
                "hunk {} -> {} lies outside the documents",
                c.original, c.modified
            )));
        }
    }
    Ok(())
}
