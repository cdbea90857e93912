//! The modern diff pipeline.
//!
//! Lines are keyed by their trimmed text and aligned with dynamic
//! programming or Myers depending on size. The line diffs are cleaned up by
//! the heuristics, every hunk is refined to character edits, the character
//! edits are grouped back into hunks and, on request, moved blocks are
//! detected and diffed.

mod assemble;
mod fragment;
mod moves;
mod refine;

use std::collections::HashMap;

use tracing::{debug, instrument};

pub use assemble::{get_line_range_mapping, line_range_mapping_from_range_mappings, validate_changes};

use crate::algorithms::{SequenceDiff, select_algorithm};
use crate::computer::{LinesDiffComputer, LinesDiffOptions};
use crate::config::DiffTuning;
use crate::error::DiffError;
use crate::heuristics::{optimize_sequence_diffs, remove_very_short_matching_lines_between_diffs};
use crate::mapping::{DetailedLineRangeMapping, LinesDiff, MovedText, RangeMapping};
use crate::ranges::{LineRange, Range};
use crate::sequences::{CharClassifier, LineSequence};
use crate::timeout::{Timeout, timeout_for};
use crate::util::char_len;
use moves::MoveDetector;
use refine::Refiner;

const EMPTY_DOCUMENT: &[&str] = &[""];

/// Line diff with character refinement and move detection.
///
/// # Example
///
/// ```
/// use linediff::{DefaultLinesDiffComputer, LinesDiffComputer, LinesDiffOptions};
///
/// let diff = DefaultLinesDiffComputer::new()
///     .compute_diff(&["a", "b", "c"], &["a", "x", "c"], &LinesDiffOptions::default())
///     .unwrap();
/// assert_eq!(diff.changes.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultLinesDiffComputer {
    tuning: DiffTuning,
    classifier: CharClassifier,
}

impl DefaultLinesDiffComputer {
    /// Creates a computer with the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tuning constants.
    #[must_use]
    pub fn with_tuning(mut self, tuning: DiffTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Replaces the character classes used to score diff boundaries.
    #[must_use]
    pub fn with_classifier(mut self, classifier: CharClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// The tuning constants in use.
    #[must_use]
    pub fn tuning(&self) -> &DiffTuning {
        &self.tuning
    }

    /// Diffs `original` against `modified` under an explicit time budget.
    /// `options.max_computation_time_ms` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvariantViolation`] if the result fails its
    /// consistency checks, which indicates a bug.
    #[instrument(skip_all, fields(original_lines = original.len(), modified_lines = modified.len()))]
    pub fn compute_diff_with_timeout(
        &self,
        original: &[&str],
        modified: &[&str],
        options: &LinesDiffOptions,
        timeout: &dyn Timeout,
    ) -> Result<LinesDiff, DiffError> {
        let original = if original.is_empty() { EMPTY_DOCUMENT } else { original };
        let modified = if modified.is_empty() { EMPTY_DOCUMENT } else { modified };

        if original.len() <= 1 && original == modified {
            return Ok(LinesDiff::default());
        }
        if is_single_empty_line(original) || is_single_empty_line(modified) {
            return Ok(LinesDiff {
                changes: vec![whole_document_change(original, modified)],
                moves: Vec::new(),
                hit_timeout: false,
            });
        }

        let (original_hashes, modified_hashes) = perfect_hashes(original, modified);
        let seq1 = LineSequence::new(original_hashes.clone(), original);
        let seq2 = LineSequence::new(modified_hashes.clone(), modified);

        let equality_score = |offset1: usize, offset2: usize| {
            if original[offset1] == modified[offset2] {
                let len = char_len(modified[offset2]);
                if len == 0 { 0.1 } else { 1.0 + (1.0 + len as f64).ln() }
            } else {
                0.99
            }
        };
        let total = original.len() + modified.len();
        let line_alignment = select_algorithm(total, self.tuning.line_dp_threshold).compute(
            &seq1,
            &seq2,
            timeout,
            Some(&equality_score),
        );
        let mut hit_timeout = line_alignment.hit_timeout;

        let line_diffs = optimize_sequence_diffs(&seq1, &seq2, line_alignment.diffs, &self.tuning);
        let line_diffs = remove_very_short_matching_lines_between_diffs(&seq1, line_diffs, &self.tuning);
        debug!(hunks = line_diffs.len(), hit_timeout, "aligned lines");

        let refiner = Refiner {
            original,
            modified,
            timeout,
            consider_whitespace_changes: !options.ignore_trim_whitespace,
            tuning: &self.tuning,
            classifier: &self.classifier,
        };

        let mut alignments: Vec<RangeMapping> = Vec::new();
        let mut seq1_last_start = 0;
        let mut seq2_last_start = 0;
        for diff in &line_diffs {
            let equal_lines = diff.seq1_range.start().checked_sub(seq1_last_start);
            if equal_lines.is_none() || equal_lines != diff.seq2_range.start().checked_sub(seq2_last_start) {
                return Err(DiffError::InvariantViolation(format!("unequal gap before line diff {diff}")));
            }
            let unchanged = refiner.refine_unchanged_lines(
                seq1_last_start,
                seq2_last_start,
                equal_lines.unwrap_or_default(),
            )?;
            hit_timeout |= unchanged.hit_timeout;
            alignments.extend(unchanged.mappings);
            seq1_last_start = diff.seq1_range.end_exclusive();
            seq2_last_start = diff.seq2_range.end_exclusive();

            let result = refiner.refine_diff(*diff)?;
            hit_timeout |= result.hit_timeout;
            alignments.extend(result.mappings);
        }
        let unchanged =
            refiner.refine_unchanged_lines(seq1_last_start, seq2_last_start, original.len() - seq1_last_start)?;
        hit_timeout |= unchanged.hit_timeout;
        alignments.extend(unchanged.mappings);

        let changes = line_range_mapping_from_range_mappings(&alignments, original, modified, false)?;

        let mut moves = Vec::new();
        if options.compute_moves {
            let detector = MoveDetector {
                original,
                modified,
                hashed_original: &original_hashes,
                hashed_modified: &modified_hashes,
                timeout,
                tuning: &self.tuning,
                classifier: &self.classifier,
            };
            for moved in detector.compute_moved_lines(&changes) {
                let result = refiner.refine_diff(SequenceDiff::new(
                    moved.original.to_offset_range(),
                    moved.modified.to_offset_range(),
                ))?;
                hit_timeout |= result.hit_timeout;
                let move_changes = line_range_mapping_from_range_mappings(&result.mappings, original, modified, true)?;
                moves.push(MovedText::new(moved, move_changes));
            }
            debug!(moves = moves.len(), "detected moves");
        }

        validate_changes(&changes, original, modified)?;
        debug!(changes = changes.len(), hit_timeout, "computed diff");
        Ok(LinesDiff {
            changes,
            moves,
            hit_timeout,
        })
    }
}

impl LinesDiffComputer for DefaultLinesDiffComputer {
    fn compute_diff(
        &self,
        original: &[&str],
        modified: &[&str],
        options: &LinesDiffOptions,
    ) -> Result<LinesDiff, DiffError> {
        let timeout = timeout_for(options.max_computation_time_ms);
        self.compute_diff_with_timeout(original, modified, options, timeout.as_ref())
    }
}

fn is_single_empty_line(lines: &[&str]) -> bool {
    matches!(lines, [line] if line.is_empty())
}

fn whole_document_change(original: &[&str], modified: &[&str]) -> DetailedLineRangeMapping {
    let whole = |lines: &[&str]| {
        let last = lines.last().map_or(0, |l| char_len(l));
        Range::new(1, 1, lines.len(), last + 1)
    };
    DetailedLineRangeMapping::new(
        LineRange::new(1, original.len() + 1),
        LineRange::new(1, modified.len() + 1),
        Some(vec![RangeMapping::new(whole(original), whole(modified))]),
    )
}

/// Numbers the distinct trimmed lines of both documents.
fn perfect_hashes<'a>(original: &[&'a str], modified: &[&'a str]) -> (Vec<u32>, Vec<u32>) {
    let mut hashes: HashMap<&'a str, u32> = HashMap::new();
    let mut hash_all = |lines: &[&'a str]| -> Vec<u32> {
        lines
            .iter()
            .map(|line| {
                let next = hashes.len() as u32;
                *hashes.entry(line.trim()).or_insert(next)
            })
            .collect()
    };
    let original_hashes = hash_all(original);
    let modified_hashes = hash_all(modified);
    (original_hashes, modified_hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::LineRangeMapping;
    use crate::timeout::CountingTimeout;
    use pretty_assertions::assert_eq;

    fn diff(original: &[&str], modified: &[&str], options: &LinesDiffOptions) -> LinesDiff {
        DefaultLinesDiffComputer::new().compute_diff(original, modified, options).unwrap()
    }

    #[test]
    fn test_identical_documents() {
        let result = diff(&["a", "b", "c"], &["a", "b", "c"], &LinesDiffOptions::default());
        assert!(result.is_identical());
        assert!(!result.hit_timeout);
    }

    #[test]
    fn test_single_line_replaced() {
        let result = diff(&["a", "b", "c"], &["a", "x", "c"], &LinesDiffOptions::default());
        assert_eq!(
            result.changes,
            vec![DetailedLineRangeMapping::new(
                LineRange::new(2, 3),
                LineRange::new(2, 3),
                Some(vec![RangeMapping::new(Range::new(2, 1, 2, 2), Range::new(2, 1, 2, 2))]),
            )]
        );
    }

    #[test]
    fn test_leading_whitespace_when_considered() {
        let options = LinesDiffOptions {
            ignore_trim_whitespace: false,
            ..LinesDiffOptions::default()
        };
        let result = diff(&["  a"], &["a"], &options);
        assert_eq!(
            result.changes,
            vec![DetailedLineRangeMapping::new(
                LineRange::new(1, 2),
                LineRange::new(1, 2),
                Some(vec![RangeMapping::new(Range::new(1, 1, 1, 3), Range::new(1, 1, 1, 1))]),
            )]
        );
    }

    #[test]
    fn test_leading_whitespace_when_ignored() {
        let result = diff(&["x", "  a", "y"], &["x", "a", "y"], &LinesDiffOptions::default());
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_empty_document_against_text() {
        let result = diff(&[""], &["a", "bc"], &LinesDiffOptions::default());
        assert_eq!(
            result.changes,
            vec![DetailedLineRangeMapping::new(
                LineRange::new(1, 2),
                LineRange::new(1, 3),
                Some(vec![RangeMapping::new(Range::new(1, 1, 1, 1), Range::new(1, 1, 2, 3))]),
            )]
        );
        assert_eq!(diff(&[], &[""], &LinesDiffOptions::default()), LinesDiff::default());
    }

    #[test]
    fn test_inserted_line() {
        let result = diff(&["a", "c"], &["a", "b", "c"], &LinesDiffOptions::default());
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].original, LineRange::new(2, 2));
        assert_eq!(result.changes[0].modified, LineRange::new(2, 3));
    }

    #[test]
    fn test_block_moved_down() {
        let moved = ["alpha line one", "alpha line two", "alpha line three"];
        let stationary = [
            "the stationary block starts here",
            "and it keeps going for a while",
            "with long lines that weigh more",
            "than the three lines that moved",
        ];
        let original: Vec<&str> = moved.iter().chain(&stationary).copied().collect();
        let modified: Vec<&str> = stationary.iter().chain(&moved).copied().collect();
        let options = LinesDiffOptions {
            compute_moves: true,
            ..LinesDiffOptions::default()
        };

        let result = diff(&original, &modified, &options);
        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.moves.len(), 1);
        assert_eq!(
            result.moves[0].line_range_mapping,
            LineRangeMapping::new(LineRange::new(1, 4), LineRange::new(5, 8))
        );
        assert!(result.moves[0].changes.is_empty());
    }

    #[test]
    fn test_expired_timeout_is_reported() {
        let original: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let modified: Vec<String> = (0..50).map(|i| format!("line {}", i * 7 % 50)).collect();
        let original: Vec<&str> = original.iter().map(String::as_str).collect();
        let modified: Vec<&str> = modified.iter().map(String::as_str).collect();

        let result = DefaultLinesDiffComputer::new()
            .compute_diff_with_timeout(&original, &modified, &LinesDiffOptions::default(), &CountingTimeout::new(0))
            .unwrap();
        assert!(result.hit_timeout);
        assert!(!result.changes.is_empty());
    }
}
