//! Line changes with optional character changes, computed by the LCS
//! search.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::lcs::{DiffChange, compute_lcs_diff};
use super::sequences::{CharSequence, LineSequence, first_non_blank_column, last_non_blank_column};
use crate::timeout::{Timeout, timeout_for};

/// Character changes are only computed for hunks shorter than this on both
/// sides.
const MAX_CHAR_DIFF_LINES: usize = 20;
/// Character matches shorter than this are merged into the surrounding
/// changes.
const MINIMUM_MATCHING_CHARACTER_LENGTH: usize = 3;
/// Upper bound of the character diff budget.
const MAX_CHAR_DIFF_TIME_MS: u64 = 5000;

/// Options of the LCS pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDiffOptions {
    /// Time budget in milliseconds, `0` for none.
    pub max_computation_time_ms: u64,
    /// Ignore leading and trailing whitespace.
    pub should_ignore_trim_whitespace: bool,
    /// Compute character changes inside small hunks.
    pub should_compute_char_changes: bool,
    /// Shift line changes to natural boundaries.
    pub should_make_pretty_diff: bool,
    /// Merge character changes separated by tiny matches.
    pub should_post_process_char_changes: bool,
}

impl Default for LegacyDiffOptions {
    fn default() -> Self {
        Self {
            max_computation_time_ms: 5000,
            should_ignore_trim_whitespace: true,
            should_compute_char_changes: true,
            should_make_pretty_diff: true,
            should_post_process_char_changes: true,
        }
    }
}

/// A character change, 1-based, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharChange {
    /// Start line in the original document.
    pub original_start_line_number: usize,
    /// Start column in the original document.
    pub original_start_column: usize,
    /// End line in the original document.
    pub original_end_line_number: usize,
    /// End column in the original document.
    pub original_end_column: usize,
    /// Start line in the modified document.
    pub modified_start_line_number: usize,
    /// Start column in the modified document.
    pub modified_start_column: usize,
    /// End line in the modified document.
    pub modified_end_line_number: usize,
    /// End column in the modified document.
    pub modified_end_column: usize,
}

impl CharChange {
    fn from_diff_change(change: &DiffChange, original: &CharSequence, modified: &CharSequence) -> Self {
        let (original_start_line_number, original_start_column, original_end_line_number, original_end_column) =
            char_bounds(original, change.original_start, change.original_length);
        let (modified_start_line_number, modified_start_column, modified_end_line_number, modified_end_column) =
            char_bounds(modified, change.modified_start, change.modified_length);
        Self {
            original_start_line_number,
            original_start_column,
            original_end_line_number,
            original_end_column,
            modified_start_line_number,
            modified_start_column,
            modified_end_line_number,
            modified_end_column,
        }
    }

    fn single_line(
        original_line_number: usize,
        original_columns: (usize, usize),
        modified_line_number: usize,
        modified_columns: (usize, usize),
    ) -> Self {
        Self {
            original_start_line_number: original_line_number,
            original_start_column: original_columns.0,
            original_end_line_number: original_line_number,
            original_end_column: original_columns.1,
            modified_start_line_number: modified_line_number,
            modified_start_column: modified_columns.0,
            modified_end_line_number: modified_line_number,
            modified_end_column: modified_columns.1,
        }
    }
}

fn char_bounds(sequence: &CharSequence, start: usize, length: usize) -> (usize, usize, usize, usize) {
    let start_line = sequence.start_line_number(start);
    let start_column = sequence.start_column(start);
    let (end_line, end_column) = match (start + length).checked_sub(1) {
        Some(last) => (sequence.end_line_number(last), sequence.end_column(last)),
        None => (sequence.start_line_number(0), sequence.start_column(0)),
    };
    (start_line, start_column, end_line, end_column)
}

/// A line change. An end line number of `0` marks an empty side, whose
/// start line number is then the line after which the other side goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    /// First original line.
    pub original_start_line_number: usize,
    /// Last original line, inclusive.
    pub original_end_line_number: usize,
    /// First modified line.
    pub modified_start_line_number: usize,
    /// Last modified line, inclusive.
    pub modified_end_line_number: usize,
    /// Character changes, if computed.
    pub char_changes: Option<Vec<CharChange>>,
}

/// Line changes and whether a budget ran out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffComputationResult {
    /// The changes, in order.
    pub changes: Vec<LineChange>,
    /// Set when the line diff stopped early.
    pub quit_early: bool,
}

/// Diffs two documents with the LCS search.
pub struct DiffComputer<'a> {
    original_lines: &'a [&'a str],
    modified_lines: &'a [&'a str],
    original: LineSequence<'a>,
    modified: LineSequence<'a>,
    options: LegacyDiffOptions,
    line_timeout: Box<dyn Timeout>,
    char_timeout: Box<dyn Timeout>,
}

impl<'a> DiffComputer<'a> {
    /// Prepares a diff. Budgets start now.
    #[must_use]
    pub fn new(original_lines: &'a [&'a str], modified_lines: &'a [&'a str], options: LegacyDiffOptions) -> Self {
        let (original, modified) = LineSequence::pair(original_lines, modified_lines);
        let char_budget = match options.max_computation_time_ms {
            0 => 0,
            ms => ms.min(MAX_CHAR_DIFF_TIME_MS),
        };
        Self {
            original_lines,
            modified_lines,
            original,
            modified,
            options,
            line_timeout: timeout_for(options.max_computation_time_ms),
            char_timeout: timeout_for(char_budget),
        }
    }

    /// Replaces the budgets of the line and the character diffs.
    #[must_use]
    pub fn with_timeouts(mut self, line_timeout: Box<dyn Timeout>, char_timeout: Box<dyn Timeout>) -> Self {
        self.line_timeout = line_timeout;
        self.char_timeout = char_timeout;
        self
    }

    /// Runs the diff.
    #[instrument(skip_all, fields(original_lines = self.original_lines.len(), modified_lines = self.modified_lines.len()))]
    pub fn compute_diff(&self) -> DiffComputationResult {
        let original_empty = matches!(self.original_lines, [""]);
        let modified_empty = matches!(self.modified_lines, [""]);
        if original_empty {
            if modified_empty {
                return DiffComputationResult::default();
            }
            return DiffComputationResult {
                changes: vec![LineChange {
                    original_start_line_number: 1,
                    original_end_line_number: 1,
                    modified_start_line_number: 1,
                    modified_end_line_number: self.modified_lines.len(),
                    char_changes: None,
                }],
                quit_early: false,
            };
        }
        if modified_empty {
            return DiffComputationResult {
                changes: vec![LineChange {
                    original_start_line_number: 1,
                    original_end_line_number: self.original_lines.len(),
                    modified_start_line_number: 1,
                    modified_end_line_number: 1,
                    char_changes: None,
                }],
                quit_early: false,
            };
        }

        let line_diff = compute_lcs_diff(
            &self.original,
            &self.modified,
            self.line_timeout.as_ref(),
            self.options.should_make_pretty_diff,
        );
        let raw_changes = line_diff.changes;
        debug!(changes = raw_changes.len(), quit_early = line_diff.quit_early, "line diff done");

        // Lines are always compared without surrounding blanks; when those
        // matter, equal lines are checked for blank changes afterwards.
        if self.options.should_ignore_trim_whitespace {
            return DiffComputationResult {
                changes: raw_changes.iter().map(|c| self.line_change(c)).collect(),
                quit_early: line_diff.quit_early,
            };
        }

        let mut result: Vec<LineChange> = Vec::new();
        let mut original_index = 0;
        let mut modified_index = 0;
        for next in raw_changes.iter().map(Some).chain(std::iter::once(None)) {
            let (original_stop, modified_stop) = next.map_or(
                (self.original_lines.len(), self.modified_lines.len()),
                |c| (c.original_start, c.modified_start),
            );
            while original_index < original_stop && modified_index < modified_stop {
                let original_line = self.original_lines[original_index];
                let modified_line = self.modified_lines[modified_index];
                if original_line != modified_line {
                    self.push_trim_whitespace_changes(&mut result, original_index + 1, original_line, modified_index + 1, modified_line);
                }
                original_index += 1;
                modified_index += 1;
            }
            if let Some(change) = next {
                result.push(self.line_change(change));
                original_index += change.original_length;
                modified_index += change.modified_length;
            }
        }
        DiffComputationResult {
            changes: result,
            quit_early: line_diff.quit_early,
        }
    }

    /// Emits changes for blanks around two lines that are equal once trimmed.
    fn push_trim_whitespace_changes(
        &self,
        result: &mut Vec<LineChange>,
        original_line_number: usize,
        original_line: &str,
        modified_line_number: usize,
        modified_line: &str,
    ) {
        let original_chars: Vec<char> = original_line.chars().collect();
        let modified_chars: Vec<char> = modified_line.chars().collect();

        let mut original_start = first_non_blank_column(original_line);
        let mut modified_start = first_non_blank_column(modified_line);
        while original_start > 1
            && modified_start > 1
            && original_chars[original_start - 2] == modified_chars[modified_start - 2]
        {
            original_start -= 1;
            modified_start -= 1;
        }
        if original_start > 1 || modified_start > 1 {
            self.push_trim_whitespace_char_change(
                result,
                CharChange::single_line(original_line_number, (1, original_start), modified_line_number, (1, modified_start)),
            );
        }

        let mut original_end = last_non_blank_column(original_line);
        let mut modified_end = last_non_blank_column(modified_line);
        let original_max = original_chars.len() + 1;
        let modified_max = modified_chars.len() + 1;
        while original_end < original_max
            && modified_end < modified_max
            && original_chars[original_end - 1] == modified_chars[modified_end - 1]
        {
            original_end += 1;
            modified_end += 1;
        }
        if original_end < original_max || modified_end < modified_max {
            self.push_trim_whitespace_char_change(
                result,
                CharChange::single_line(
                    original_line_number,
                    (original_end, original_max),
                    modified_line_number,
                    (modified_end, modified_max),
                ),
            );
        }
    }

    fn push_trim_whitespace_char_change(&self, result: &mut Vec<LineChange>, change: CharChange) {
        let compute_chars = self.options.should_compute_char_changes;
        let (original_line, modified_line) = (change.original_start_line_number, change.modified_start_line_number);
        if let Some(prev) = result.last_mut()
            && prev.original_end_line_number != 0
            && prev.modified_end_line_number != 0
        {
            let same_line = prev.original_end_line_number == original_line && prev.modified_end_line_number == modified_line;
            let next_line =
                prev.original_end_line_number + 1 == original_line && prev.modified_end_line_number + 1 == modified_line;
            if same_line || next_line {
                prev.original_end_line_number = original_line;
                prev.modified_end_line_number = modified_line;
                if compute_chars && let Some(chars) = prev.char_changes.as_mut() {
                    chars.push(change);
                }
                return;
            }
        }
        result.push(LineChange {
            original_start_line_number: original_line,
            original_end_line_number: original_line,
            modified_start_line_number: modified_line,
            modified_end_line_number: modified_line,
            char_changes: compute_chars.then(|| vec![change]),
        });
    }

    fn line_change(&self, change: &DiffChange) -> LineChange {
        let (original_start_line_number, original_end_line_number) = line_bounds(change.original_start, change.original_length);
        let (modified_start_line_number, modified_end_line_number) = line_bounds(change.modified_start, change.modified_length);

        let mut char_changes = None;
        if self.options.should_compute_char_changes
            && (1..MAX_CHAR_DIFF_LINES).contains(&change.original_length)
            && (1..MAX_CHAR_DIFF_LINES).contains(&change.modified_length)
            && self.char_timeout.is_valid()
        {
            let ignore = self.options.should_ignore_trim_whitespace;
            let original_chars = self
                .original
                .create_char_sequence(ignore, change.original_start, change.original_end() - 1);
            let modified_chars = self
                .modified
                .create_char_sequence(ignore, change.modified_start, change.modified_end() - 1);
            if !original_chars.is_empty() && !modified_chars.is_empty() {
                let mut raw = compute_lcs_diff(&original_chars, &modified_chars, self.char_timeout.as_ref(), true).changes;
                if self.options.should_post_process_char_changes {
                    raw = post_process_char_changes(raw);
                }
                char_changes = Some(
                    raw.iter()
                        .map(|c| CharChange::from_diff_change(c, &original_chars, &modified_chars))
                        .collect(),
                );
            }
        }

        LineChange {
            original_start_line_number,
            original_end_line_number,
            modified_start_line_number,
            modified_end_line_number,
            char_changes,
        }
    }
}

/// 1-based first and last line of a change side; an empty side ends at `0`.
fn line_bounds(start: usize, length: usize) -> (usize, usize) {
    if length == 0 { (start, 0) } else { (start + 1, start + length) }
}

/// Merges character changes separated by fewer than three matching
/// characters.
#[must_use]
pub fn post_process_char_changes(raw: Vec<DiffChange>) -> Vec<DiffChange> {
    let mut result: Vec<DiffChange> = Vec::with_capacity(raw.len());
    for change in raw {
        if let Some(prev) = result.last_mut() {
            let original_matching = change.original_start.saturating_sub(prev.original_end());
            let modified_matching = change.modified_start.saturating_sub(prev.modified_end());
            if original_matching.min(modified_matching) < MINIMUM_MATCHING_CHARACTER_LENGTH {
                prev.original_length = change.original_end() - prev.original_start;
                prev.modified_length = change.modified_end() - prev.modified_start;
                continue;
            }
        }
        result.push(change);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compute(original: &[&str], modified: &[&str], options: LegacyDiffOptions) -> DiffComputationResult {
        DiffComputer::new(original, modified, options).compute_diff()
    }

    #[test]
    fn test_replaced_line_with_char_change() {
        let result = compute(&["a", "b", "c"], &["a", "x", "c"], LegacyDiffOptions::default());
        assert_eq!(
            result.changes,
            vec![LineChange {
                original_start_line_number: 2,
                original_end_line_number: 2,
                modified_start_line_number: 2,
                modified_end_line_number: 2,
                char_changes: Some(vec![CharChange::single_line(2, (1, 2), 2, (1, 2))]),
            }]
        );
    }

    #[test]
    fn test_insertion_has_empty_original_side() {
        let result = compute(&["a", "c"], &["a", "b", "c"], LegacyDiffOptions::default());
        assert_eq!(result.changes.len(), 1);
        let change = &result.changes[0];
        assert_eq!((change.original_start_line_number, change.original_end_line_number), (1, 0));
        assert_eq!((change.modified_start_line_number, change.modified_end_line_number), (2, 2));
        assert_eq!(change.char_changes, None);
    }

    #[test]
    fn test_empty_documents() {
        assert!(compute(&[""], &[""], LegacyDiffOptions::default()).changes.is_empty());
        let result = compute(&[""], &["a", "b"], LegacyDiffOptions::default());
        assert_eq!((result.changes[0].modified_start_line_number, result.changes[0].modified_end_line_number), (1, 2));
    }

    #[test]
    fn test_trim_whitespace_changes() {
        let options = LegacyDiffOptions {
            should_ignore_trim_whitespace: false,
            ..LegacyDiffOptions::default()
        };
        let result = compute(&["x", "  a", "b "], &["x", "a", "b"], options);
        assert_eq!(
            result.changes,
            vec![LineChange {
                original_start_line_number: 2,
                original_end_line_number: 3,
                modified_start_line_number: 2,
                modified_end_line_number: 3,
                char_changes: Some(vec![
                    CharChange::single_line(2, (1, 3), 2, (1, 1)),
                    CharChange::single_line(3, (2, 3), 3, (2, 2)),
                ]),
            }]
        );

        let ignored = compute(&["x", "  a", "b "], &["x", "a", "b"], LegacyDiffOptions::default());
        assert!(ignored.changes.is_empty());
    }

    #[test]
    fn test_post_process_merges_short_matches() {
        let raw = vec![DiffChange::new(0, 1, 0, 1), DiffChange::new(3, 1, 3, 1), DiffChange::new(10, 1, 10, 1)];
        assert_eq!(
            post_process_char_changes(raw),
            vec![DiffChange::new(0, 4, 0, 4), DiffChange::new(10, 1, 10, 1)]
        );
    }
}
