//! Sorted, coalesced sets of line ranges.

use serde::{Deserialize, Serialize};

use super::LineRange;
use crate::util::{find_first_idx_monotonous_or_len, find_last_idx_monotonous, find_last_monotonous};

/// Non-overlapping, non-touching [`LineRange`]s in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRangeSet {
    ranges: Vec<LineRange>,
}

impl LineRangeSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// The normalized ranges.
    #[must_use]
    pub fn ranges(&self) -> &[LineRange] {
        &self.ranges
    }

    /// Adds `range`, merging it with every range it overlaps or touches.
    pub fn add_range(&mut self, range: LineRange) {
        if range.is_empty() {
            return;
        }
        // First range that ends at or after the new start.
        let join_start = find_first_idx_monotonous_or_len(&self.ranges, |r| {
            r.end_line_number_exclusive() >= range.start_line_number()
        });
        // One past the last range that starts at or before the new end.
        let join_end_exclusive = find_last_idx_monotonous(&self.ranges, |r| {
            r.start_line_number() <= range.end_line_number_exclusive()
        })
        .map_or(0, |i| i + 1);

        if join_start == join_end_exclusive {
            self.ranges.insert(join_start, range);
        } else {
            let joined = self.ranges[join_start..join_end_exclusive]
                .iter()
                .fold(range, |acc, r| acc.join(r));
            self.ranges.splice(join_start..join_end_exclusive, [joined]);
        }
    }

    /// Returns `true` if `line_number` is covered.
    #[must_use]
    pub fn contains(&self, line_number: usize) -> bool {
        find_last_monotonous(&self.ranges, |r| r.start_line_number() <= line_number)
            .is_some_and(|r| r.end_line_number_exclusive() > line_number)
    }

    /// Returns `true` if any line of `range` is covered.
    #[must_use]
    pub fn intersects(&self, range: &LineRange) -> bool {
        find_last_monotonous(&self.ranges, |r| r.start_line_number() < range.end_line_number_exclusive())
            .is_some_and(|r| r.end_line_number_exclusive() > range.start_line_number())
    }

    /// Lines covered by either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for range in &other.ranges {
            result.add_range(*range);
        }
        result
    }

    /// The parts of `range` that no range of the set covers.
    #[must_use]
    pub fn subtract_from(&self, range: LineRange) -> Self {
        let mut result = Self::new();
        let mut cursor = range.start_line_number();
        for r in &self.ranges {
            if r.end_line_number_exclusive() <= cursor {
                continue;
            }
            if r.start_line_number() >= range.end_line_number_exclusive() {
                break;
            }
            if r.start_line_number() > cursor {
                result.ranges.push(LineRange::new(cursor, r.start_line_number()));
            }
            cursor = r.end_line_number_exclusive();
        }
        if cursor < range.end_line_number_exclusive() {
            result
                .ranges
                .push(LineRange::new(cursor, range.end_line_number_exclusive()));
        }
        result
    }

    /// Lines covered by both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (self.ranges[i], other.ranges[j]);
            if let Some(common) = a.intersect(&b)
                && !common.is_empty()
            {
                result.push(common);
            }
            if a.end_line_number_exclusive() < b.end_line_number_exclusive() {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { ranges: result }
    }

    /// Every range shifted by `offset` lines.
    #[must_use]
    pub fn with_delta(&self, offset: isize) -> Self {
        Self {
            ranges: self.ranges.iter().map(|r| r.delta(offset)).collect(),
        }
    }
}

impl FromIterator<LineRange> for LineRangeSet {
    fn from_iter<I: IntoIterator<Item = LineRange>>(iter: I) -> Self {
        let mut set = Self::new();
        for range in iter {
            set.add_range(range);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(ranges: &[(usize, usize)]) -> LineRangeSet {
        ranges.iter().map(|&(s, e)| LineRange::new(s, e)).collect()
    }

    #[test]
    fn test_add_range_coalesces() {
        let mut s = set(&[(1, 3), (6, 8)]);
        s.add_range(LineRange::new(3, 4));
        assert_eq!(s.ranges(), &[LineRange::new(1, 4), LineRange::new(6, 8)]);
        s.add_range(LineRange::new(10, 10));
        assert_eq!(s.ranges().len(), 2);
        s.add_range(LineRange::new(2, 7));
        assert_eq!(s.ranges(), &[LineRange::new(1, 8)]);
    }

    #[test]
    fn test_add_range_inserts_between() {
        let s = set(&[(1, 2), (10, 12), (5, 6)]);
        assert_eq!(
            s.ranges(),
            &[LineRange::new(1, 2), LineRange::new(5, 6), LineRange::new(10, 12)]
        );
    }

    #[test]
    fn test_contains_and_intersects() {
        let s = set(&[(2, 4), (8, 9)]);
        assert!(!s.contains(1));
        assert!(s.contains(3));
        assert!(!s.contains(4));
        assert!(s.contains(8));
        assert!(s.intersects(&LineRange::new(3, 6)));
        assert!(!s.intersects(&LineRange::new(4, 8)));
    }

    #[test]
    fn test_subtract_from() {
        let s = set(&[(3, 5), (7, 8)]);
        assert_eq!(
            s.subtract_from(LineRange::new(1, 10)).ranges(),
            &[LineRange::new(1, 3), LineRange::new(5, 7), LineRange::new(8, 10)]
        );
        assert_eq!(
            s.subtract_from(LineRange::new(3, 5)).ranges(),
            &[] as &[LineRange]
        );
    }

    #[test]
    fn test_union_intersection_delta() {
        let a = set(&[(1, 5), (10, 12)]);
        let b = set(&[(4, 11)]);
        assert_eq!(a.union(&b).ranges(), &[LineRange::new(1, 12)]);
        assert_eq!(
            a.intersection(&b).ranges(),
            &[LineRange::new(4, 5), LineRange::new(10, 11)]
        );
        assert_eq!(b.with_delta(2).ranges(), &[LineRange::new(6, 13)]);
    }
}
