//! O(N·M) alignment with weighted matches.

use super::{DiffAlgorithm, DiffAlgorithmResult, EqualityScore, SequenceDiff};
use crate::ranges::OffsetRange;
use crate::sequences::Sequence;
use crate::timeout::Timeout;

/// Fills the full alignment table, so only fit for small inputs.
///
/// Matches are weighted by the optional equality score (1 otherwise), and a
/// match continuing a diagonal run earns the run's length as a bonus, which
/// keeps matched regions together. Ties prefer the diagonal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicProgrammingDiffing;

impl DynamicProgrammingDiffing {
    /// Creates new instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Direction {
    #[default]
    None,
    Horizontal,
    Vertical,
    Diagonal,
}

/// Row-major `rows × cols` table.
struct Table<T> {
    cells: Vec<T>,
    cols: usize,
}

impl<T: Copy + Default> Table<T> {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![T::default(); rows * cols],
            cols,
        }
    }

    fn get(&self, row: usize, col: usize) -> T {
        self.cells[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, value: T) {
        self.cells[row * self.cols + col] = value;
    }
}

impl DiffAlgorithm for DynamicProgrammingDiffing {
    #[allow(clippy::float_cmp)]
    fn compute(
        &self,
        seq1: &dyn Sequence,
        seq2: &dyn Sequence,
        timeout: &dyn Timeout,
        equality_score: Option<EqualityScore<'_>>,
    ) -> DiffAlgorithmResult {
        if seq1.is_empty() || seq2.is_empty() {
            return DiffAlgorithmResult::trivial(seq1, seq2);
        }
        let (len1, len2) = (seq1.len(), seq2.len());
        let mut lcs_lengths: Table<f64> = Table::new(len1, len2);
        let mut directions: Table<Direction> = Table::new(len1, len2);
        let mut lengths: Table<usize> = Table::new(len1, len2);

        for s1 in 0..len1 {
            for s2 in 0..len2 {
                if !timeout.is_valid() {
                    return DiffAlgorithmResult::trivial_timed_out(seq1, seq2);
                }
                let horizontal = if s1 == 0 { 0.0 } else { lcs_lengths.get(s1 - 1, s2) };
                let vertical = if s2 == 0 { 0.0 } else { lcs_lengths.get(s1, s2 - 1) };

                let extended = if seq1.element(s1) == seq2.element(s2) {
                    let mut score = if s1 == 0 || s2 == 0 {
                        0.0
                    } else {
                        lcs_lengths.get(s1 - 1, s2 - 1)
                    };
                    if s1 > 0 && s2 > 0 && directions.get(s1 - 1, s2 - 1) == Direction::Diagonal {
                        score += lengths.get(s1 - 1, s2 - 1) as f64;
                    }
                    score + equality_score.map_or(1.0, |f| f(s1, s2))
                } else {
                    -1.0
                };

                let value = horizontal.max(vertical).max(extended);
                if value == extended {
                    let prev = if s1 > 0 && s2 > 0 { lengths.get(s1 - 1, s2 - 1) } else { 0 };
                    lengths.set(s1, s2, prev + 1);
                    directions.set(s1, s2, Direction::Diagonal);
                } else if value == horizontal {
                    directions.set(s1, s2, Direction::Horizontal);
                } else {
                    directions.set(s1, s2, Direction::Vertical);
                }
                lcs_lengths.set(s1, s2, value);
            }
        }

        // Walk back from the far corner. Aligning positions are 1-based here
        // so that "before the first element" is 0.
        let mut diffs = Vec::new();
        let (mut last1, mut last2) = (len1, len2);
        let mut report = |pos1: usize, pos2: usize, diffs: &mut Vec<SequenceDiff>| {
            if pos1 != last1 || pos2 != last2 {
                diffs.push(SequenceDiff::new(
                    OffsetRange::new(pos1, last1),
                    OffsetRange::new(pos2, last2),
                ));
            }
            (last1, last2) = (pos1.saturating_sub(1), pos2.saturating_sub(1));
        };
        let (mut s1, mut s2) = (len1, len2);
        while s1 > 0 && s2 > 0 {
            match directions.get(s1 - 1, s2 - 1) {
                Direction::Diagonal => {
                    report(s1, s2, &mut diffs);
                    s1 -= 1;
                    s2 -= 1;
                }
                Direction::Horizontal => s1 -= 1,
                Direction::Vertical | Direction::None => s2 -= 1,
            }
        }
        report(0, 0, &mut diffs);
        diffs.reverse();

        DiffAlgorithmResult {
            diffs,
            hit_timeout: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::tests::{Chars, apply, sd};
    use crate::timeout::InfiniteTimeout;
    use pretty_assertions::assert_eq;

    fn diff(a: &str, b: &str, score: Option<EqualityScore<'_>>) -> Vec<SequenceDiff> {
        let (a, b) = (Chars::new(a), Chars::new(b));
        let result = DynamicProgrammingDiffing::new().compute(&a, &b, &InfiniteTimeout, score);
        assert!(!result.hit_timeout);
        assert_eq!(apply(&a, &b, &result.diffs), b.0);
        result.diffs
    }

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(diff("abc", "abc", None), vec![]);
        assert_eq!(diff("", "ab", None), vec![sd((0, 0), (0, 2))]);
    }

    #[test]
    fn test_single_replacement() {
        assert_eq!(diff("abc", "axc", None), vec![sd((1, 2), (1, 2))]);
    }

    #[test]
    fn test_ties_prefer_diagonal() {
        // Both "ab" runs score the same; the later diagonal wins the tie.
        assert_eq!(diff("abxab", "ab", None), vec![sd((0, 3), (0, 0))]);
    }

    #[test]
    fn test_equality_score_steers_alignment() {
        let heavy_first = |i: usize, _: usize| if i == 0 { 10.0 } else { 1.0 };
        assert_eq!(diff("aba", "a", Some(&heavy_first)), vec![sd((1, 3), (1, 1))]);
        assert_eq!(diff("aba", "a", None), vec![sd((0, 2), (0, 0))]);
    }

    #[test]
    fn test_reconstructs() {
        diff("kitten sitting", "sitting kitten", None);
        diff("abcabba", "cbabac", None);
    }
}
