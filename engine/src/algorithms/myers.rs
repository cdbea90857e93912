//! Greedy O(ND) shortest edit script search.

use super::{DiffAlgorithm, DiffAlgorithmResult, EqualityScore, SequenceDiff};
use crate::ranges::OffsetRange;
use crate::sequences::Sequence;
use crate::timeout::Timeout;

/// Myers' forward search over the diagonals of the edit graph.
///
/// Ignores any equality score: elements either match or they don't. Polls
/// the timeout once per edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersDiffAlgorithm;

impl MyersDiffAlgorithm {
    /// Creates new instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// A run of matching elements on the best path to some diagonal, linked to
/// the run before it.
#[derive(Debug, Clone, Copy)]
struct SnakePath {
    prev: Option<usize>,
    x: usize,
    y: usize,
    length: usize,
}

/// Values indexed by diagonal `k`, which may be negative. Stored in one
/// buffer at `k + bias`, grown geometrically in either direction.
#[derive(Debug, Default)]
pub(crate) struct DiagonalArray<T> {
    values: Vec<T>,
    bias: usize,
}

impl<T: Copy + Default> DiagonalArray<T> {
    pub(crate) fn get(&self, k: isize) -> T {
        k.checked_add_unsigned(self.bias)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.values.get(i).copied())
            .unwrap_or_default()
    }

    pub(crate) fn set(&mut self, k: isize, value: T) {
        let index = k + self.bias as isize;
        if index < 0 {
            let missing = index.unsigned_abs().max(self.values.len());
            let mut grown = vec![T::default(); missing];
            grown.extend_from_slice(&self.values);
            self.values = grown;
            self.bias += missing;
        }
        let index = (k + self.bias as isize) as usize;
        if index >= self.values.len() {
            let len = (index + 1).max(self.values.len() * 2);
            self.values.resize(len, T::default());
        }
        self.values[index] = value;
    }
}

impl DiffAlgorithm for MyersDiffAlgorithm {
    fn compute(
        &self,
        seq1: &dyn Sequence,
        seq2: &dyn Sequence,
        timeout: &dyn Timeout,
        _equality_score: Option<EqualityScore<'_>>,
    ) -> DiffAlgorithmResult {
        if seq1.is_empty() || seq2.is_empty() {
            return DiffAlgorithmResult::trivial(seq1, seq2);
        }
        let (len1, len2) = (seq1.len() as isize, seq2.len() as isize);

        let snake = |mut x: isize, mut y: isize| -> isize {
            while x < len1 && y >= 0 && y < len2 && seq1.element(x as usize) == seq2.element(y as usize) {
                x += 1;
                y += 1;
            }
            x
        };

        let mut arena: Vec<SnakePath> = Vec::new();
        let mut v: DiagonalArray<i32> = DiagonalArray::default();
        let mut paths: DiagonalArray<Option<usize>> = DiagonalArray::default();

        let first = snake(0, 0);
        v.set(0, first as i32);
        if first > 0 {
            arena.push(SnakePath {
                prev: None,
                x: 0,
                y: 0,
                length: first as usize,
            });
            paths.set(0, Some(0));
        }

        let mut d: isize = 0;
        let mut k: isize = 0;
        let mut done = first == len1 && first == len2;
        while !done {
            d += 1;
            if !timeout.is_valid() {
                return DiffAlgorithmResult::trivial_timed_out(seq1, seq2);
            }
            let lower = -d.min(len2 + d % 2);
            let upper = d.min(len1 + d % 2);
            k = lower;
            while k <= upper {
                let top = if k == upper { -1 } else { v.get(k + 1) as isize };
                let left = if k == lower { -1 } else { v.get(k - 1) as isize + 1 };
                let x = top.max(left).min(len1);
                let y = x - k;
                if x > len1 || y > len2 {
                    k += 2;
                    continue;
                }
                let new_max_x = snake(x, y);
                v.set(k, new_max_x as i32);
                let last_path = if x == top { paths.get(k + 1) } else { paths.get(k - 1) };
                let path = if new_max_x == x {
                    last_path
                } else {
                    arena.push(SnakePath {
                        prev: last_path,
                        x: x as usize,
                        y: y as usize,
                        length: (new_max_x - x) as usize,
                    });
                    Some(arena.len() - 1)
                };
                paths.set(k, path);
                if new_max_x == len1 && new_max_x - k == len2 {
                    done = true;
                    break;
                }
                k += 2;
            }
        }

        let mut path = paths.get(k);
        let mut diffs = Vec::new();
        let (mut last_pos1, mut last_pos2) = (seq1.len(), seq2.len());
        loop {
            let (end_x, end_y) = path.map_or((0, 0), |i| {
                let p = arena[i];
                (p.x + p.length, p.y + p.length)
            });
            if end_x != last_pos1 || end_y != last_pos2 {
                diffs.push(SequenceDiff::new(
                    OffsetRange::new(end_x, last_pos1),
                    OffsetRange::new(end_y, last_pos2),
                ));
            }
            let Some(i) = path else { break };
            last_pos1 = arena[i].x;
            last_pos2 = arena[i].y;
            path = arena[i].prev;
        }
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

    fn diff(a: &str, b: &str) -> Vec<SequenceDiff> {
        let (a, b) = (Chars::new(a), Chars::new(b));
        let result = MyersDiffAlgorithm::new().compute(&a, &b, &InfiniteTimeout, None);
        assert!(!result.hit_timeout);
        assert_eq!(apply(&a, &b, &result.diffs), b.0);
        result.diffs
    }

    #[test]
    fn test_identical() {
        assert_eq!(diff("abc", "abc"), vec![]);
    }

    #[test]
    fn test_empty_side() {
        assert_eq!(diff("", "abc"), vec![sd((0, 0), (0, 3))]);
        assert_eq!(diff("abc", ""), vec![sd((0, 3), (0, 0))]);
    }

    #[test]
    fn test_single_replacement() {
        assert_eq!(diff("abc", "axc"), vec![sd((1, 2), (1, 2))]);
    }

    #[test]
    fn test_insert_and_delete() {
        assert_eq!(diff("abcd", "abxcd"), vec![sd((2, 2), (2, 3))]);
        assert_eq!(diff("abcd", "acd"), vec![sd((1, 2), (1, 1))]);
    }

    #[test]
    fn test_reconstructs_unrelated_sequences() {
        diff("kitten sitting", "sitting kitten");
        diff("abcabba", "cbabac");
        diff("x", "yyyyyy");
    }

    #[test]
    fn test_diagonal_array_grows_both_ways() {
        let mut array: DiagonalArray<i32> = DiagonalArray::default();
        array.set(0, 1);
        array.set(-5, 2);
        array.set(7, 3);
        assert_eq!(array.get(0), 1);
        assert_eq!(array.get(-5), 2);
        assert_eq!(array.get(7), 3);
        assert_eq!(array.get(-100), 0);
        assert_eq!(array.get(3), 0);
    }
}
