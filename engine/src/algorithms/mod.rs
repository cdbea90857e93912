//! Sequence diff algorithms.
//!
//! Both algorithms align two [`Sequence`]s and report the replaced slices as
//! [`SequenceDiff`]s in ascending order. The regions between consecutive
//! diffs are equal in both sequences.

mod dynamic_programming;
mod myers;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use dynamic_programming::DynamicProgrammingDiffing;
pub use myers::MyersDiffAlgorithm;

use crate::ranges::OffsetRange;
use crate::sequences::Sequence;
use crate::timeout::Timeout;

/// Weight of matching element `i` of the first sequence with element `j`
/// of the second. Only called for equal elements.
pub type EqualityScore<'a> = &'a dyn Fn(usize, usize) -> f64;

/// A strategy aligning two sequences.
pub trait DiffAlgorithm {
    /// Aligns `seq1` with `seq2`, polling `timeout` as it goes.
    fn compute(
        &self,
        seq1: &dyn Sequence,
        seq2: &dyn Sequence,
        timeout: &dyn Timeout,
        equality_score: Option<EqualityScore<'_>>,
    ) -> DiffAlgorithmResult;
}

static DYNAMIC_PROGRAMMING: DynamicProgrammingDiffing = DynamicProgrammingDiffing;
static MYERS: MyersDiffAlgorithm = MyersDiffAlgorithm;

/// Picks dynamic programming for inputs of fewer than `threshold` elements in
/// total and Myers for anything larger.
#[must_use]
pub fn select_algorithm(total_len: usize, threshold: usize) -> &'static dyn DiffAlgorithm {
    if total_len < threshold {
        &DYNAMIC_PROGRAMMING
    } else {
        &MYERS
    }
}

/// Output of a [`DiffAlgorithm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffAlgorithmResult {
    /// Replaced slices in ascending order.
    pub diffs: Vec<SequenceDiff>,
    /// Set when the timeout fired and `diffs` is a coarse fallback.
    pub hit_timeout: bool,
}

impl DiffAlgorithmResult {
    /// Everything replaced by everything.
    #[must_use]
    pub fn trivial(seq1: &dyn Sequence, seq2: &dyn Sequence) -> Self {
        Self::whole(seq1, seq2, false)
    }

    /// Everything replaced by everything, flagged as timed out.
    #[must_use]
    pub fn trivial_timed_out(seq1: &dyn Sequence, seq2: &dyn Sequence) -> Self {
        tracing::debug!(len1 = seq1.len(), len2 = seq2.len(), "diff algorithm timed out");
        Self::whole(seq1, seq2, true)
    }

    fn whole(seq1: &dyn Sequence, seq2: &dyn Sequence, hit_timeout: bool) -> Self {
        let diffs = if seq1.is_empty() && seq2.is_empty() {
            Vec::new()
        } else {
            vec![SequenceDiff::new(
                OffsetRange::of_length(seq1.len()),
                OffsetRange::of_length(seq2.len()),
            )]
        };
        Self { diffs, hit_timeout }
    }
}

/// A pair of offsets, one into each sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffsetPair {
    /// Offset into the first sequence.
    pub offset1: usize,
    /// Offset into the second sequence.
    pub offset2: usize,
}

impl OffsetPair {
    /// `(0, 0)`.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a pair.
    #[must_use]
    pub const fn new(offset1: usize, offset2: usize) -> Self {
        Self { offset1, offset2 }
    }

    /// Shifts both offsets.
    #[must_use]
    pub const fn delta(&self, offset: isize) -> Self {
        Self::new(
            crate::ranges::shift(self.offset1, offset),
            crate::ranges::shift(self.offset2, offset),
        )
    }
}

impl fmt::Display for OffsetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.offset1, self.offset2)
    }
}

/// `seq1_range` of the first sequence was replaced by `seq2_range` of the
/// second. One side may be empty (a pure insertion or deletion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceDiff {
    /// Replaced slice of the first sequence.
    pub seq1_range: OffsetRange,
    /// Replacing slice of the second sequence.
    pub seq2_range: OffsetRange,
}

impl SequenceDiff {
    /// Creates a diff.
    #[must_use]
    pub const fn new(seq1_range: OffsetRange, seq2_range: OffsetRange) -> Self {
        Self {
            seq1_range,
            seq2_range,
        }
    }

    /// Diff spanning from `start` to `end_exclusive` on both sides.
    #[must_use]
    pub fn from_offset_pairs(start: OffsetPair, end_exclusive: OffsetPair) -> Self {
        Self::new(
            OffsetRange::new(start.offset1, end_exclusive.offset1),
            OffsetRange::new(start.offset2, end_exclusive.offset2),
        )
    }

    /// The equal regions around and between sorted `diffs`, as diffs.
    #[must_use]
    pub fn invert(diffs: &[Self], doc1_len: usize) -> Vec<Self> {
        let mut result = Vec::with_capacity(diffs.len() + 1);
        let mut prev: Option<&Self> = None;
        for next in diffs.iter().map(Some).chain(std::iter::once(None)) {
            let start = prev.map_or(OffsetPair::ZERO, Self::end_exclusives);
            let end = next.map_or_else(
                || {
                    let shift = prev.map_or(0, |p| p.seq2_range.end_exclusive() as isize - p.seq1_range.end_exclusive() as isize);
                    OffsetPair::new(doc1_len, doc1_len.saturating_add_signed(shift))
                },
                Self::starts,
            );
            result.push(Self::from_offset_pairs(start, end));
            prev = next;
        }
        result
    }

    /// Swaps the sides.
    #[must_use]
    pub const fn swap(&self) -> Self {
        Self::new(self.seq2_range, self.seq1_range)
    }

    /// Smallest diff containing both.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self::new(
            self.seq1_range.join(&other.seq1_range),
            self.seq2_range.join(&other.seq2_range),
        )
    }

    /// Shifts both sides.
    #[must_use]
    pub const fn delta(&self, offset: isize) -> Self {
        Self::new(self.seq1_range.delta(offset), self.seq2_range.delta(offset))
    }

    /// Shifts both starts.
    #[must_use]
    pub fn delta_start(&self, offset: isize) -> Self {
        Self::new(self.seq1_range.delta_start(offset), self.seq2_range.delta_start(offset))
    }

    /// Shifts both ends.
    #[must_use]
    pub fn delta_end(&self, offset: isize) -> Self {
        Self::new(self.seq1_range.delta_end(offset), self.seq2_range.delta_end(offset))
    }

    /// Returns `true` if either side overlaps or touches the other's.
    #[must_use]
    pub fn intersects_or_touches(&self, other: &Self) -> bool {
        self.seq1_range.intersects_or_touches(&other.seq1_range)
            || self.seq2_range.intersects_or_touches(&other.seq2_range)
    }

    /// Common part on both sides, `None` if either side is disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let seq1 = self.seq1_range.intersect(&other.seq1_range)?;
        let seq2 = self.seq2_range.intersect(&other.seq2_range)?;
        Some(Self::new(seq1, seq2))
    }

    /// The two start offsets.
    #[must_use]
    pub const fn starts(&self) -> OffsetPair {
        OffsetPair::new(self.seq1_range.start(), self.seq2_range.start())
    }

    /// The two exclusive end offsets.
    #[must_use]
    pub const fn end_exclusives(&self) -> OffsetPair {
        OffsetPair::new(self.seq1_range.end_exclusive(), self.seq2_range.end_exclusive())
    }
}

impl fmt::Display for SequenceDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.seq1_range, self.seq2_range)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::timeout::{CountingTimeout, InfiniteTimeout};

    /// Sequence of chars with no boundary scores, for algorithm tests.
    pub(crate) struct Chars(pub Vec<u32>);

    impl Chars {
        pub(crate) fn new(s: &str) -> Self {
            Self(s.chars().map(u32::from).collect())
        }
    }

    impl Sequence for Chars {
        fn element(&self, offset: usize) -> u32 {
            self.0[offset]
        }
        fn len(&self) -> usize {
            self.0.len()
        }
        fn is_strongly_equal(&self, offset1: usize, offset2: usize) -> bool {
            self.0[offset1] == self.0[offset2]
        }
    }

    pub(crate) fn sd(s1: (usize, usize), s2: (usize, usize)) -> SequenceDiff {
        SequenceDiff::new(OffsetRange::new(s1.0, s1.1), OffsetRange::new(s2.0, s2.1))
    }

    /// Rebuilds the second sequence from the first and the diffs.
    pub(crate) fn apply(a: &Chars, b: &Chars, diffs: &[SequenceDiff]) -> Vec<u32> {
        let mut out = Vec::new();
        let mut pos = 0;
        for d in diffs {
            out.extend_from_slice(&a.0[pos..d.seq1_range.start()]);
            out.extend_from_slice(d.seq2_range.slice(&b.0));
            pos = d.seq1_range.end_exclusive();
        }
        out.extend_from_slice(&a.0[pos..]);
        out
    }

    #[test]
    fn test_invert() {
        let diffs = [sd((1, 2), (1, 3)), sd((4, 4), (5, 6))];
        assert_eq!(
            SequenceDiff::invert(&diffs, 6),
            vec![sd((0, 1), (0, 1)), sd((2, 4), (3, 5)), sd((4, 6), (6, 8))]
        );
        assert_eq!(SequenceDiff::invert(&[], 3), vec![sd((0, 3), (0, 3))]);
    }

    #[test]
    fn test_intersect_and_join() {
        let a = sd((0, 4), (0, 2));
        let b = sd((3, 6), (5, 6));
        assert_eq!(a.intersect(&b), None);
        assert_eq!(a.join(&b), sd((0, 6), (0, 6)));
        assert!(a.intersects_or_touches(&b));
        assert_eq!(a.swap(), sd((0, 2), (0, 4)));
    }

    #[test]
    fn test_intersects_or_touches_on_either_side() {
        let a = sd((0, 2), (0, 2));
        assert!(a.intersects_or_touches(&sd((2, 3), (5, 6))));
        assert!(a.intersects_or_touches(&sd((5, 6), (2, 3))));
        assert!(!a.intersects_or_touches(&sd((3, 4), (3, 4))));
    }

    #[test]
    fn test_pair_delta() {
        assert_eq!(OffsetPair::new(3, 5).delta(-3), OffsetPair::new(0, 2));
    }

    #[test]
    #[should_panic(expected = "offset shifted out of range")]
    fn test_pair_delta_below_zero_panics() {
        let _ = OffsetPair::new(3, 5).delta(-4);
    }

    #[test]
    fn test_select_algorithm_agrees_on_reconstruction() {
        let a = Chars::new("the quick brown fox");
        let b = Chars::new("the quick red fox jumps");
        for threshold in [0, 1000] {
            let result = select_algorithm(a.len() + b.len(), threshold).compute(&a, &b, &InfiniteTimeout, None);
            assert!(!result.hit_timeout);
            assert_eq!(apply(&a, &b, &result.diffs), b.0);
        }
    }

    #[test]
    fn test_both_algorithms_report_timeout() {
        let a = Chars::new("abcdefgh");
        let b = Chars::new("hgfedcba");
        for algorithm in [select_algorithm(0, 1), select_algorithm(0, 100)] {
            let result = algorithm.compute(&a, &b, &CountingTimeout::new(1), None);
            assert!(result.hit_timeout);
            assert_eq!(result.diffs, vec![sd((0, 8), (0, 8))]);
        }
    }
}
