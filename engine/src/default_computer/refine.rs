//! Character-level refinement of one line hunk.

use tracing::trace;

use crate::algorithms::{SequenceDiff, select_algorithm};
use crate::config::DiffTuning;
use crate::error::DiffError;
use crate::heuristics::{
    extend_diffs_to_entire_word_if_appropriate, optimize_sequence_diffs, remove_short_matches,
    remove_very_short_matching_text_between_long_diffs,
};
use crate::mapping::{LineRangeMapping, RangeMapping};
use crate::ranges::{LineRange, OffsetRange};
use crate::sequences::{CharClassifier, LinesSliceCharSequence, Sequence};
use crate::timeout::Timeout;

/// Character edits of a hunk.
#[derive(Debug, Clone, Default)]
pub(crate) struct RefineResult {
    pub(crate) mappings: Vec<RangeMapping>,
    pub(crate) hit_timeout: bool,
}

/// Everything a refinement needs besides the hunk itself.
pub(crate) struct Refiner<'a> {
    pub(crate) original: &'a [&'a str],
    pub(crate) modified: &'a [&'a str],
    pub(crate) timeout: &'a dyn Timeout,
    pub(crate) consider_whitespace_changes: bool,
    pub(crate) tuning: &'a DiffTuning,
    pub(crate) classifier: &'a CharClassifier,
}

impl Refiner<'_> {
    /// Diffs the characters of the lines covered by `diff`, a line-level
    /// diff in 0-based offsets.
    pub(crate) fn refine_diff(&self, diff: SequenceDiff) -> Result<RefineResult, DiffError> {
        let line_mapping = LineRangeMapping::new(
            LineRange::from_offset_range(diff.seq1_range),
            LineRange::from_offset_range(diff.seq2_range),
        );
        let range_mapping = line_mapping.to_range_mapping(self.original, self.modified)?;

        let slice1 = LinesSliceCharSequence::new(
            self.original,
            range_mapping.original_range,
            self.consider_whitespace_changes,
            self.classifier,
        );
        let slice2 = LinesSliceCharSequence::new(
            self.modified,
            range_mapping.modified_range,
            self.consider_whitespace_changes,
            self.classifier,
        );

        let total = slice1.len() + slice2.len();
        let result = select_algorithm(total, self.tuning.char_dp_threshold).compute(&slice1, &slice2, self.timeout, None);
        trace!(chars = total, diffs = result.diffs.len(), "refined hunk");

        let diffs = optimize_sequence_diffs(&slice1, &slice2, result.diffs, self.tuning);
        let diffs = extend_diffs_to_entire_word_if_appropriate(&slice1, &slice2, diffs, self.tuning);
        let diffs = remove_short_matches(diffs, self.tuning);
        let diffs = remove_very_short_matching_text_between_long_diffs(&slice1, &slice2, diffs, self.tuning);

        let mappings = diffs
            .iter()
            .map(|d| RangeMapping::new(slice1.translate_range(d.seq1_range), slice2.translate_range(d.seq2_range)))
            .collect();
        Ok(RefineResult {
            mappings,
            hit_timeout: result.hit_timeout,
        })
    }

    /// Refines lines the line diff called unchanged whose text still differs
    /// in leading or trailing whitespace. Does nothing unless whitespace
    /// changes are considered.
    pub(crate) fn refine_unchanged_lines(
        &self,
        original_start: usize,
        modified_start: usize,
        count: usize,
    ) -> Result<RefineResult, DiffError> {
        let mut refined = RefineResult::default();
        if !self.consider_whitespace_changes {
            return Ok(refined);
        }
        for i in 0..count {
            let (offset1, offset2) = (original_start + i, modified_start + i);
            if self.original[offset1] == self.modified[offset2] {
                continue;
            }
            let result = self.refine_diff(SequenceDiff::new(
                OffsetRange::of_start_and_length(offset1, 1),
                OffsetRange::of_start_and_length(offset2, 1),
            ))?;
            refined.hit_timeout |= result.hit_timeout;
            refined.mappings.extend(result.mappings);
        }
        Ok(refined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::Range;
    use crate::timeout::InfiniteTimeout;
    use pretty_assertions::assert_eq;

    fn refine(original: &[&str], modified: &[&str], diff: SequenceDiff, ws: bool) -> RefineResult {
        let tuning = DiffTuning::default();
        let classifier = CharClassifier::default();
        Refiner {
            original,
            modified,
            timeout: &InfiniteTimeout,
            consider_whitespace_changes: ws,
            tuning: &tuning,
            classifier: &classifier,
        }
        .refine_diff(diff)
        .unwrap()
    }

    fn line_diff(o: (usize, usize), m: (usize, usize)) -> SequenceDiff {
        SequenceDiff::new(OffsetRange::new(o.0, o.1), OffsetRange::new(m.0, m.1))
    }

    #[test]
    fn test_single_char_replacement() {
        let result = refine(&["a", "b", "c"], &["a", "x", "c"], line_diff((1, 2), (1, 2)), false);
        assert!(!result.hit_timeout);
        assert_eq!(
            result.mappings,
            vec![RangeMapping::new(Range::new(2, 1, 2, 2), Range::new(2, 1, 2, 2))]
        );
    }

    #[test]
    fn test_leading_whitespace_deletion() {
        let result = refine(&["  a"], &["a"], line_diff((0, 1), (0, 1)), true);
        assert_eq!(
            result.mappings,
            vec![RangeMapping::new(Range::new(1, 1, 1, 3), Range::new(1, 1, 1, 1))]
        );
    }

    #[test]
    fn test_whole_word_replaced() {
        let result = refine(&["let apple = 1;"], &["let mango = 1;"], line_diff((0, 1), (0, 1)), false);
        assert_eq!(
            result.mappings,
            vec![RangeMapping::new(Range::new(1, 5, 1, 10), Range::new(1, 5, 1, 10))]
        );
    }

    #[test]
    fn test_unchanged_lines_with_whitespace_edits() {
        let original = ["a", " b", "c "];
        let modified = ["a", "b", "c"];
        let tuning = DiffTuning::default();
        let classifier = CharClassifier::default();
        let mut refiner = Refiner {
            original: &original,
            modified: &modified,
            timeout: &InfiniteTimeout,
            consider_whitespace_changes: false,
            tuning: &tuning,
            classifier: &classifier,
        };
        assert!(refiner.refine_unchanged_lines(0, 0, 3).unwrap().mappings.is_empty());

        refiner.consider_whitespace_changes = true;
        let result = refiner.refine_unchanged_lines(0, 0, 3).unwrap();
        assert_eq!(
            result.mappings,
            vec![
                RangeMapping::new(Range::new(2, 1, 2, 2), Range::new(2, 1, 2, 1)),
                RangeMapping::new(Range::new(3, 2, 3, 3), Range::new(3, 2, 3, 2)),
            ]
        );
    }
}
