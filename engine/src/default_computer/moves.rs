//! Detection of blocks of lines that moved.
//!
//! Two sources of candidates: pure deletions paired with similar pure
//! insertions, and runs of equal 3-line keys found inside the remaining
//! hunks. Candidates are carved into disjoint moves, grown over similar
//! neighbouring lines, joined when close, and filtered.

use std::collections::HashMap;

use tracing::debug;

use super::fragment::LineRangeFragment;
use crate::algorithms::{DiffAlgorithm, MyersDiffAlgorithm, SequenceDiff};
use crate::config::DiffTuning;
use crate::mapping::{DetailedLineRangeMapping, LineRangeMapping};
use crate::ranges::{LineRange, LineRangeSet, Range};
use crate::sequences::{CharClassifier, LinesSliceCharSequence, Sequence};
use crate::timeout::Timeout;
use crate::util::{char_len, find_last_idx_monotonous, find_last_monotonous};

/// Finds moved blocks between two documents, given the hunks of their diff
/// and the per-line keys used to compute it.
pub(crate) struct MoveDetector<'a> {
    pub(crate) original: &'a [&'a str],
    pub(crate) modified: &'a [&'a str],
    pub(crate) hashed_original: &'a [u32],
    pub(crate) hashed_modified: &'a [u32],
    pub(crate) timeout: &'a dyn Timeout,
    pub(crate) tuning: &'a DiffTuning,
    pub(crate) classifier: &'a CharClassifier,
}

#[derive(Debug, Clone, Copy)]
struct PossibleMapping {
    original: LineRange,
    modified: LineRange,
}

impl MoveDetector<'_> {
    /// Moves sorted by original start line. Empty if the timeout expires.
    pub(crate) fn compute_moved_lines(&self, changes: &[DetailedLineRangeMapping]) -> Vec<LineRangeMapping> {
        let (mut moves, excluded) = self.compute_moves_from_simple_deletions_to_simple_insertions(changes);
        if !self.timeout.is_valid() {
            return Vec::new();
        }

        let filtered: Vec<LineRangeMapping> = changes
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(_, c)| c.line_range_mapping())
            .collect();
        let Some(unchanged_moves) = self.compute_unchanged_moves(filtered) else {
            return Vec::new();
        };
        moves.extend(unchanged_moves);

        let moves = join_close_consecutive_moves(moves, self.tuning.move_join_gap);
        let moves: Vec<LineRangeMapping> = moves
            .into_iter()
            .filter(|m| {
                let lines: Vec<&str> = m.original.slice(self.original).iter().map(|l| l.trim()).collect();
                let text_len = lines.iter().map(|l| char_len(l)).sum::<usize>() + lines.len().saturating_sub(1);
                text_len >= self.tuning.min_move_chars && lines.iter().filter(|l| char_len(l) >= 2).count() >= 2
            })
            .collect();
        let moves = remove_moves_in_same_diff(changes, moves);
        debug!(moves = moves.len(), "move detection finished");
        moves
    }

    /// Pairs each pure deletion with the most similar unclaimed pure
    /// insertion. Returns the moves and the indices of the hunks they used.
    fn compute_moves_from_simple_deletions_to_simple_insertions(
        &self,
        changes: &[DetailedLineRangeMapping],
    ) -> (Vec<LineRangeMapping>, Vec<usize>) {
        let min_lines = self.tuning.min_move_lines;
        let deletions: Vec<LineRangeFragment> = changes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.modified.is_empty() && c.original.len() >= min_lines)
            .map(|(i, c)| LineRangeFragment::new(c.original, self.original, i))
            .collect();
        let mut insertions: Vec<LineRangeFragment> = changes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.original.is_empty() && c.modified.len() >= min_lines)
            .map(|(i, c)| LineRangeFragment::new(c.modified, self.modified, i))
            .collect();

        let mut moves = Vec::new();
        let mut excluded = Vec::new();
        for deletion in &deletions {
            let mut highest = -1.0;
            let mut best = None;
            for (j, insertion) in insertions.iter().enumerate() {
                let similarity = deletion.compute_similarity(insertion);
                if similarity > highest {
                    highest = similarity;
                    best = Some(j);
                }
            }
            if highest > self.tuning.move_similarity_threshold
                && let Some(j) = best
            {
                let insertion = insertions.remove(j);
                moves.push(LineRangeMapping::new(deletion.range, insertion.range));
                excluded.push(deletion.source);
                excluded.push(insertion.source);
            }
            if !self.timeout.is_valid() {
                break;
            }
        }
        (moves, excluded)
    }

    /// Moves of unchanged 3-line runs between hunks, extended over similar
    /// neighbouring lines. `None` if the timeout expires.
    fn compute_unchanged_moves(&self, mut changes: Vec<LineRangeMapping>) -> Option<Vec<LineRangeMapping>> {
        let key = |hashes: &[u32], line: usize| (hashes[line - 1], hashes[line], hashes[line + 1]);

        let mut original_keys: HashMap<(u32, u32, u32), Vec<LineRange>> = HashMap::new();
        for change in &changes {
            for i in change.original.start_line_number()..change.original.end_line_number_exclusive().saturating_sub(2) {
                original_keys
                    .entry(key(self.hashed_original, i))
                    .or_default()
                    .push(LineRange::new(i, i + 3));
            }
        }

        changes.sort_by_key(|c| c.modified.start_line_number());
        let mut possible: Vec<PossibleMapping> = Vec::new();
        for change in &changes {
            let mut last_mappings: Vec<usize> = Vec::new();
            for i in change.modified.start_line_number()..change.modified.end_line_number_exclusive().saturating_sub(2) {
                let current = LineRange::new(i, i + 3);
                let mut next_mappings = Vec::new();
                for range in original_keys.get(&key(self.hashed_modified, i)).into_iter().flatten() {
                    let extended = last_mappings.iter().copied().find(|&m| {
                        possible[m].original.end_line_number_exclusive() + 1 == range.end_line_number_exclusive()
                            && possible[m].modified.end_line_number_exclusive() + 1 == current.end_line_number_exclusive()
                    });
                    if let Some(m) = extended {
                        let mapping = &mut possible[m];
                        mapping.original = LineRange::new(mapping.original.start_line_number(), range.end_line_number_exclusive());
                        mapping.modified = LineRange::new(mapping.modified.start_line_number(), current.end_line_number_exclusive());
                        next_mappings.push(m);
                    } else {
                        possible.push(PossibleMapping {
                            original: *range,
                            modified: current,
                        });
                        next_mappings.push(possible.len() - 1);
                    }
                }
                last_mappings = next_mappings;
            }
            if !self.timeout.is_valid() {
                return None;
            }
        }

        possible.sort_by_key(|m| std::cmp::Reverse(m.modified.len()));

        let mut modified_set = LineRangeSet::new();
        let mut original_set = LineRangeSet::new();
        let mut moves = Vec::new();
        for mapping in &possible {
            let shift = mapping.modified.start_line_number() as isize - mapping.original.start_line_number() as isize;
            let modified_sections = modified_set.subtract_from(mapping.modified);
            let original_translated = original_set.subtract_from(mapping.original).with_delta(shift);
            for s in modified_sections.intersection(&original_translated).ranges() {
                if s.len() < self.tuning.min_move_lines {
                    continue;
                }
                let original_range = s.delta(-shift);
                moves.push(LineRangeMapping::new(original_range, *s));
                modified_set.add_range(*s);
                original_set.add_range(original_range);
            }
        }

        moves.sort_by_key(|m| m.original.start_line_number());
        for m in &mut moves {
            *m = self.extend_move(*m, &changes, &mut original_set, &mut modified_set);
        }
        Some(moves)
    }

    /// Grows `mv` up and down over similar lines inside the hunks it
    /// touches, claiming them in both sets.
    fn extend_move(
        &self,
        mv: LineRangeMapping,
        changes: &[LineRangeMapping],
        original_set: &mut LineRangeSet,
        modified_set: &mut LineRangeSet,
    ) -> LineRangeMapping {
        let (o_start, o_end) = (mv.original.start_line_number(), mv.original.end_line_number_exclusive());
        let (m_start, m_end) = (mv.modified.start_line_number(), mv.modified.end_line_number_exclusive());

        let first_orig = find_last_monotonous(changes, |c| c.original.start_line_number() <= o_start);
        let first_mod = find_last_monotonous(changes, |c| c.modified.start_line_number() <= m_start);
        let lines_above = match (first_orig, first_mod) {
            (Some(a), Some(b)) => (o_start - a.original.start_line_number()).max(m_start - b.modified.start_line_number()),
            _ => 0,
        };
        let last_orig = find_last_monotonous(changes, |c| c.original.start_line_number() < o_end);
        let last_mod = find_last_monotonous(changes, |c| c.modified.start_line_number() < m_end);
        let lines_below = match (last_orig, last_mod) {
            (Some(a), Some(b)) => a
                .original
                .end_line_number_exclusive()
                .saturating_sub(o_end)
                .max(b.modified.end_line_number_exclusive().saturating_sub(m_end)),
            _ => 0,
        };

        let claimable = |orig_line: usize, mod_line: usize, sets: (&LineRangeSet, &LineRangeSet)| {
            orig_line >= 1
                && mod_line >= 1
                && orig_line <= self.original.len()
                && mod_line <= self.modified.len()
                && !sets.1.contains(mod_line)
                && !sets.0.contains(orig_line)
                && self.are_lines_similar(self.original[orig_line - 1], self.modified[mod_line - 1])
        };

        let mut to_top = 0;
        while to_top < lines_above
            && o_start > to_top + 1
            && m_start > to_top + 1
            && claimable(o_start - to_top - 1, m_start - to_top - 1, (&*original_set, &*modified_set))
        {
            to_top += 1;
        }
        if to_top > 0 {
            original_set.add_range(LineRange::new(o_start - to_top, o_start));
            modified_set.add_range(LineRange::new(m_start - to_top, m_start));
        }

        let mut to_bottom = 0;
        while to_bottom < lines_below && claimable(o_end + to_bottom, m_end + to_bottom, (&*original_set, &*modified_set)) {
            to_bottom += 1;
        }
        if to_bottom > 0 {
            original_set.add_range(LineRange::new(o_end, o_end + to_bottom));
            modified_set.add_range(LineRange::new(m_end, m_end + to_bottom));
        }

        LineRangeMapping::new(
            LineRange::new(o_start - to_top, o_end + to_bottom),
            LineRange::new(m_start - to_top, m_end + to_bottom),
        )
    }

    /// Equal after trimming, or sharing enough non-whitespace characters in
    /// a character diff.
    fn are_lines_similar(&self, line1: &str, line2: &str) -> bool {
        if line1.trim() == line2.trim() {
            return true;
        }
        let max_len = self.tuning.line_similarity_max_len;
        let (len1, len2) = (char_len(line1), char_len(line2));
        if len1 > max_len && len2 > max_len {
            return false;
        }
        let seq1 = LinesSliceCharSequence::new(&[line1], Range::new(1, 1, 1, len1 + 1), false, self.classifier);
        let seq2 = LinesSliceCharSequence::new(&[line2], Range::new(1, 1, 1, len2 + 1), false, self.classifier);
        let result = MyersDiffAlgorithm.compute(&seq1, &seq2, self.timeout, None);

        let is_space = |c: char| c == ' ' || c == '\t';
        let common_non_space: usize = SequenceDiff::invert(&result.diffs, seq1.len())
            .iter()
            .flat_map(|d| d.seq1_range.iter())
            .filter(|&i| char::from_u32(seq1.element(i)).is_some_and(|c| !is_space(c)))
            .count();
        let longer = if len1 > len2 { line1 } else { line2 };
        let longer_non_space = longer.chars().filter(|&c| !is_space(c)).count();
        longer_non_space > self.tuning.line_similarity_min_chars
            && common_non_space as f64 / longer_non_space as f64 > self.tuning.line_similarity_threshold
    }
}

/// Joins moves following each other with gaps summing to at most
/// `max_gap` lines.
fn join_close_consecutive_moves(mut moves: Vec<LineRangeMapping>, max_gap: usize) -> Vec<LineRangeMapping> {
    moves.sort_by_key(|m| m.original.start_line_number());
    let mut result: Vec<LineRangeMapping> = Vec::with_capacity(moves.len());
    for current in moves {
        match result.last_mut() {
            Some(last)
                if current.original.start_line_number() >= last.original.end_line_number_exclusive()
                    && current.modified.start_line_number() >= last.modified.end_line_number_exclusive()
                    && (current.original.start_line_number() - last.original.end_line_number_exclusive())
                        + (current.modified.start_line_number() - last.modified.end_line_number_exclusive())
                        <= max_gap =>
            {
                *last = last.join(&current);
            }
            _ => result.push(current),
        }
    }
    result
}

/// Drops moves that end inside the same hunk on both sides; those are
/// local edits.
fn remove_moves_in_same_diff(changes: &[DetailedLineRangeMapping], moves: Vec<LineRangeMapping>) -> Vec<LineRangeMapping> {
    moves
        .into_iter()
        .filter(|m| {
            let in_original = find_last_idx_monotonous(changes, |c| {
                c.original.start_line_number() < m.original.end_line_number_exclusive()
            });
            let in_modified = find_last_idx_monotonous(changes, |c| {
                c.modified.start_line_number() < m.modified.end_line_number_exclusive()
            });
            in_original.is_none() || in_original != in_modified
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeout::{CountingTimeout, InfiniteTimeout};
    use pretty_assertions::assert_eq;

    fn lrm(o: (usize, usize), m: (usize, usize)) -> LineRangeMapping {
        LineRangeMapping::new(LineRange::new(o.0, o.1), LineRange::new(m.0, m.1))
    }

    fn hunk(o: (usize, usize), m: (usize, usize)) -> DetailedLineRangeMapping {
        DetailedLineRangeMapping::new(LineRange::new(o.0, o.1), LineRange::new(m.0, m.1), Some(Vec::new()))
    }

    fn hashes(lines: &[&str]) -> Vec<u32> {
        let mut table: HashMap<&str, u32> = HashMap::new();
        lines
            .iter()
            .map(|l| {
                let next = table.len() as u32;
                *table.entry(l.trim()).or_insert(next)
            })
            .collect()
    }

    fn detect(original: &[&str], modified: &[&str], changes: &[DetailedLineRangeMapping], timeout: &dyn Timeout) -> Vec<LineRangeMapping> {
        let mut all: Vec<&str> = original.to_vec();
        all.extend_from_slice(modified);
        let all_hashes = hashes(&all);
        let (h1, h2) = all_hashes.split_at(original.len());
        let tuning = DiffTuning::default();
        let classifier = CharClassifier::default();
        MoveDetector {
            original,
            modified,
            hashed_original: h1,
            hashed_modified: h2,
            timeout,
            tuning: &tuning,
            classifier: &classifier,
        }
        .compute_moved_lines(changes)
    }

    const BLOCK: [&str; 3] = ["fn alpha() -> u32 {", "    compute_value(1, 2)", "}"];

    #[test]
    fn test_deletion_paired_with_insertion() {
        let mut original = vec!["head"];
        original.extend(BLOCK);
        original.push("tail");
        let mut modified = vec!["head", "tail"];
        modified.extend(BLOCK);
        let changes = [hunk((2, 5), (2, 2)), hunk((6, 6), (3, 6))];
        assert_eq!(
            detect(&original, &modified, &changes, &InfiniteTimeout),
            vec![lrm((2, 5), (3, 6))]
        );
    }

    #[test]
    fn test_unchanged_block_inside_replacements() {
        let original = ["x1", BLOCK[0], BLOCK[1], BLOCK[2], "x2", "y1", "y2"];
        let modified = ["z1", "z2", "z3", BLOCK[0], BLOCK[1], BLOCK[2], "z4"];
        let changes = [hunk((1, 8), (1, 8))];
        // Same hunk on both sides: a local edit, not a move.
        assert_eq!(detect(&original, &modified, &changes, &InfiniteTimeout), vec![]);
    }

    #[test]
    fn test_timeout_yields_no_moves() {
        let mut original = vec!["head"];
        original.extend(BLOCK);
        original.push("tail");
        let mut modified = vec!["head", "tail"];
        modified.extend(BLOCK);
        let changes = [hunk((2, 5), (2, 2)), hunk((6, 6), (3, 6))];
        assert_eq!(detect(&original, &modified, &changes, &CountingTimeout::new(0)), vec![]);
    }

    #[test]
    fn test_join_close_consecutive_moves() {
        let moves = vec![lrm((10, 13), (1, 4)), lrm((1, 4), (20, 23)), lrm((14, 17), (5, 8))];
        assert_eq!(
            join_close_consecutive_moves(moves, 2),
            vec![lrm((1, 4), (20, 23)), lrm((10, 17), (1, 8))]
        );
    }

    #[test]
    fn test_remove_moves_in_same_diff() {
        let changes = [hunk((2, 10), (2, 10)), hunk((20, 20), (15, 18))];
        let moves = vec![lrm((3, 6), (5, 8)), lrm((4, 7), (15, 18))];
        assert_eq!(remove_moves_in_same_diff(&changes, moves), vec![lrm((4, 7), (15, 18))]);
    }

    #[test]
    fn test_are_lines_similar() {
        let tuning = DiffTuning::default();
        let classifier = CharClassifier::default();
        let detector = MoveDetector {
            original: &[],
            modified: &[],
            hashed_original: &[],
            hashed_modified: &[],
            timeout: &InfiniteTimeout,
            tuning: &tuning,
            classifier: &classifier,
        };
        assert!(detector.are_lines_similar("  let x = 1;", "let x = 1;"));
        assert!(detector.are_lines_similar("let value = compute(a, b);", "let value = compute(a, c);"));
        assert!(!detector.are_lines_similar("let value = compute(a, b);", "return None;"));
        assert!(!detector.are_lines_similar("short", "shirt"));
    }
}
