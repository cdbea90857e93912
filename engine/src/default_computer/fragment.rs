//! Character histograms of line blocks.

use std::collections::HashMap;

use crate::ranges::LineRange;

/// A block of lines summarized as a character histogram, with each line
/// break counted as `\n`.
#[derive(Debug, Clone)]
pub(crate) struct LineRangeFragment {
    pub(crate) range: LineRange,
    /// Index of the hunk the block came from.
    pub(crate) source: usize,
    histogram: HashMap<char, usize>,
    total_count: usize,
}

impl LineRangeFragment {
    pub(crate) fn new(range: LineRange, lines: &[&str], source: usize) -> Self {
        let mut histogram: HashMap<char, usize> = HashMap::new();
        let mut total_count = 0;
        for line in range.slice(lines) {
            for c in line.chars().chain(std::iter::once('\n')) {
                *histogram.entry(c).or_default() += 1;
                total_count += 1;
            }
        }
        Self {
            range,
            source,
            histogram,
            total_count,
        }
    }

    /// 1 for identical histograms, down to 0 for disjoint ones.
    pub(crate) fn compute_similarity(&self, other: &Self) -> f64 {
        let total = self.total_count + other.total_count;
        if total == 0 {
            return 1.0;
        }
        let mut sum_differences = 0;
        for (c, &count) in &self.histogram {
            sum_differences += count.abs_diff(other.histogram.get(c).copied().unwrap_or(0));
        }
        for (c, &count) in &other.histogram {
            if !self.histogram.contains_key(c) {
                sum_differences += count;
            }
        }
        1.0 - sum_differences as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity() {
        let lines = ["abc", "def", "fed", "cba", "xyz"];
        let a = LineRangeFragment::new(LineRange::new(1, 3), &lines, 0);
        let b = LineRangeFragment::new(LineRange::new(3, 5), &lines, 1);
        let c = LineRangeFragment::new(LineRange::new(5, 6), &lines, 2);
        assert!((a.compute_similarity(&b) - 1.0).abs() < f64::EPSILON);
        // "xyz\n" shares only the line break with "abc\ndef\n".
        assert!((a.compute_similarity(&c) - (1.0 - 10.0 / 12.0)).abs() < 1e-9);
    }
}
