//! The LCS based diff pipeline.
//!
//! Kept alongside [`crate::DefaultLinesDiffComputer`] for callers that rely
//! on its output. Character changes are only computed for hunks shorter
//! than 20 lines, and moves are never detected.

mod computer;
mod lcs;
mod prettify;
mod sequences;

pub use computer::{
    CharChange, DiffComputationResult, DiffComputer, LegacyDiffOptions, LineChange, post_process_char_changes,
};
pub use lcs::{DiffChange, DiffResult, LcsDiff, LcsSequence, compute_lcs_diff};
pub use sequences::{CharSequence, LineSequence};

use tracing::debug;

use crate::computer::{LinesDiffComputer, LinesDiffOptions};
use crate::error::DiffError;
use crate::mapping::{DetailedLineRangeMapping, LinesDiff, RangeMapping};
use crate::ranges::{LineRange, Range};
use crate::util::check_adjacent_items;

const EMPTY_DOCUMENT: &[&str] = &[""];

/// [`LinesDiffComputer`] over the LCS pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyLinesDiffComputer;

impl LegacyLinesDiffComputer {
    /// Creates the computer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LinesDiffComputer for LegacyLinesDiffComputer {
    fn compute_diff(
        &self,
        original: &[&str],
        modified: &[&str],
        options: &LinesDiffOptions,
    ) -> Result<LinesDiff, DiffError> {
        let original = if original.is_empty() { EMPTY_DOCUMENT } else { original };
        let modified = if modified.is_empty() { EMPTY_DOCUMENT } else { modified };
        let result = DiffComputer::new(
            original,
            modified,
            LegacyDiffOptions {
                max_computation_time_ms: options.max_computation_time_ms,
                should_ignore_trim_whitespace: options.ignore_trim_whitespace,
                should_compute_char_changes: true,
                should_make_pretty_diff: true,
                should_post_process_char_changes: true,
            },
        )
        .compute_diff();

        let mut changes: Vec<DetailedLineRangeMapping> = Vec::with_capacity(result.changes.len());
        for line_change in &result.changes {
            let change = to_detailed_mapping(line_change);
            match changes.last_mut() {
                // Shifting changes in the LCS pass can leave hunks touching.
                Some(last)
                    if last.modified.end_line_number_exclusive() == change.modified.start_line_number()
                        || last.original.end_line_number_exclusive() == change.original.start_line_number() =>
                {
                    last.original = last.original.join(&change.original);
                    last.modified = last.modified.join(&change.modified);
                    last.inner_changes = match (last.inner_changes.take(), change.inner_changes) {
                        (Some(mut inner), Some(more)) => {
                            inner.extend(more);
                            Some(inner)
                        }
                        _ => None,
                    };
                }
                _ => changes.push(change),
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
                "legacy hunks overlap or are separated by unequal gaps".to_string(),
            ));
        }
        debug!(changes = changes.len(), quit_early = result.quit_early, "legacy diff done");

        Ok(LinesDiff {
            changes,
            moves: Vec::new(),
            hit_timeout: result.quit_early,
        })
    }
}

fn side_range(start_line_number: usize, end_line_number: usize) -> LineRange {
    if end_line_number == 0 {
        LineRange::new(start_line_number + 1, start_line_number + 1)
    } else {
        LineRange::new(start_line_number, end_line_number + 1)
    }
}

fn to_detailed_mapping(change: &LineChange) -> DetailedLineRangeMapping {
    DetailedLineRangeMapping::new(
        side_range(change.original_start_line_number, change.original_end_line_number),
        side_range(change.modified_start_line_number, change.modified_end_line_number),
        change.char_changes.as_ref().map(|chars| {
            chars
                .iter()
                .map(|c| {
                    RangeMapping::new(
                        Range::new(
                            c.original_start_line_number,
                            c.original_start_column,
                            c.original_end_line_number,
                            c.original_end_column,
                        ),
                        Range::new(
                            c.modified_start_line_number,
                            c.modified_start_column,
                            c.modified_end_line_number,
                            c.modified_end_column,
                        ),
                    )
                })
                .collect()
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diff(original: &[&str], modified: &[&str]) -> LinesDiff {
        LegacyLinesDiffComputer::new()
            .compute_diff(original, modified, &LinesDiffOptions::default())
            .unwrap()
    }

    #[test]
    fn test_identical() {
        assert!(diff(&["a", "b"], &["a", "b"]).is_identical());
    }

    #[test]
    fn test_replaced_line() {
        let result = diff(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            result.changes,
            vec![DetailedLineRangeMapping::new(
                LineRange::new(2, 3),
                LineRange::new(2, 3),
                Some(vec![RangeMapping::new(Range::new(2, 1, 2, 2), Range::new(2, 1, 2, 2))]),
            )]
        );
        assert!(!result.hit_timeout);
    }

    #[test]
    fn test_insertion_and_deletion_ranges() {
        let inserted = diff(&["a", "c"], &["a", "b", "c"]);
        assert_eq!(inserted.changes[0].original, LineRange::new(2, 2));
        assert_eq!(inserted.changes[0].modified, LineRange::new(2, 3));
        assert_eq!(inserted.changes[0].inner_changes, None);

        let deleted = diff(&["a", "b", "c"], &["a", "c"]);
        assert_eq!(deleted.changes[0].original, LineRange::new(2, 3));
        assert_eq!(deleted.changes[0].modified, LineRange::new(2, 2));
    }

    #[test]
    fn test_empty_original() {
        let result = diff(&[], &["a", "b"]);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].original, LineRange::new(1, 2));
        assert_eq!(result.changes[0].modified, LineRange::new(1, 3));
    }
}
