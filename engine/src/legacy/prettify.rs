//! Shifting LCS changes to where a reader expects them.

use super::lcs::{DiffChange, LcsDiff, changes_overlap};

/// Bonus for a shift that makes a change touch its predecessor.
const TOUCHING_PREVIOUS_BONUS: u32 = 5;
/// Prettification looks for better matches only between changes this close.
const MAX_MATCHED_LENGTH: usize = 5;
const MAX_REGION_LENGTH: usize = 20;

impl LcsDiff<'_> {
    /// Slides every change down as far as it goes, then back up to the best
    /// scoring boundary, and finally prefers matching longer lines.
    pub(super) fn prettify_changes(&self, mut changes: Vec<DiffChange>) -> Vec<DiffChange> {
        let original_len = self.original.keys().len();
        let modified_len = self.modified.keys().len();

        let mut i = 0;
        while i < changes.len() {
            let (original_stop, modified_stop) = changes
                .get(i + 1)
                .map_or((original_len, modified_len), |next| (next.original_start, next.modified_start));
            let change = &mut changes[i];
            let check_original = change.original_length > 0;
            let check_modified = change.modified_length > 0;
            while change.original_end() < original_stop
                && change.modified_end() < modified_stop
                && (!check_original || self.original_elements_equal(change.original_start, change.original_end()))
                && (!check_modified || self.modified_elements_equal(change.modified_start, change.modified_end()))
            {
                let start_strict_equal = self.elements_strict_equal(change.original_start, change.modified_start);
                let end_strict_equal = self.elements_strict_equal(change.original_end(), change.modified_end());
                if end_strict_equal && !start_strict_equal {
                    // Sliding on would leave an equal pair that is not strictly equal.
                    break;
                }
                change.original_start += 1;
                change.modified_start += 1;
            }

            if let Some(next) = changes.get(i + 1)
                && let Some(merged) = changes_overlap(&changes[i], next)
            {
                changes[i] = merged;
                changes.remove(i + 1);
                continue;
            }
            i += 1;
        }

        let mut i = changes.len();
        while i > 0 {
            i -= 1;
            let (original_stop, modified_stop) = if i > 0 {
                (changes[i - 1].original_end(), changes[i - 1].modified_end())
            } else {
                (0, 0)
            };
            let change = changes[i];
            let check_original = change.original_length > 0;
            let check_modified = change.modified_length > 0;
            let mut best_delta = 0;
            let mut best_score = self.boundary_score(&change);
            for delta in 1.. {
                let (Some(original_start), Some(modified_start)) =
                    (change.original_start.checked_sub(delta), change.modified_start.checked_sub(delta))
                else {
                    break;
                };
                if original_start < original_stop || modified_start < modified_stop {
                    break;
                }
                if check_original && !self.original_elements_equal(original_start, original_start + change.original_length) {
                    break;
                }
                if check_modified && !self.modified_elements_equal(modified_start, modified_start + change.modified_length) {
                    break;
                }
                let touching_previous = original_start == original_stop && modified_start == modified_stop;
                let shifted = DiffChange::new(original_start, change.original_length, modified_start, change.modified_length);
                let score = if touching_previous { TOUCHING_PREVIOUS_BONUS } else { 0 } + self.boundary_score(&shifted);
                if score > best_score {
                    best_score = score;
                    best_delta = delta;
                }
            }
            changes[i].original_start -= best_delta;
            changes[i].modified_start -= best_delta;

            if i > 0
                && let Some(merged) = changes_overlap(&changes[i - 1], &changes[i])
            {
                changes[i - 1] = merged;
                changes.remove(i);
            }
        }

        if self.has_strings() {
            for i in 1..changes.len() {
                self.prefer_longer_matches(&mut changes, i);
            }
        }
        changes
    }

    /// Several equally long matches may sit between two changes; picks the
    /// one covering the most text.
    fn prefer_longer_matches(&self, changes: &mut [DiffChange], i: usize) {
        let (a, b) = (changes[i - 1], changes[i]);
        let matched_length = b.original_start - a.original_end();
        let ab_original_length = b.original_end() - a.original_start;
        let ab_modified_length = b.modified_end() - a.modified_start;
        if matched_length >= MAX_MATCHED_LENGTH
            || ab_original_length >= MAX_REGION_LENGTH
            || ab_modified_length >= MAX_REGION_LENGTH
        {
            return;
        }
        let Some((original_match_start, modified_match_start)) = self.find_better_contiguous_sequence(
            a.original_start,
            ab_original_length,
            a.modified_start,
            ab_modified_length,
            matched_length,
        ) else {
            return;
        };
        if original_match_start == a.original_end() && modified_match_start == a.modified_end() {
            return;
        }
        let (b_original_end, b_modified_end) = (b.original_end(), b.modified_end());
        changes[i - 1].original_length = original_match_start - a.original_start;
        changes[i - 1].modified_length = modified_match_start - a.modified_start;
        changes[i].original_start = original_match_start + matched_length;
        changes[i].modified_start = modified_match_start + matched_length;
        changes[i].original_length = b_original_end - changes[i].original_start;
        changes[i].modified_length = b_modified_end - changes[i].modified_start;
    }

    fn find_better_contiguous_sequence(
        &self,
        original_start: usize,
        original_length: usize,
        modified_start: usize,
        modified_length: usize,
        desired_length: usize,
    ) -> Option<(usize, usize)> {
        if original_length < desired_length || modified_length < desired_length {
            return None;
        }
        let original_max = original_start + original_length - desired_length + 1;
        let modified_max = modified_start + modified_length - desired_length + 1;
        let mut best: Option<(usize, usize, usize)> = None;
        for i in original_start..original_max {
            for j in modified_start..modified_max {
                let score = self.contiguous_sequence_score(i, j, desired_length);
                if score > 0 && best.is_none_or(|(best_score, _, _)| score > best_score) {
                    best = Some((score, i, j));
                }
            }
        }
        best.map(|(_, i, j)| (i, j))
    }

    fn contiguous_sequence_score(&self, original_start: usize, modified_start: usize, length: usize) -> usize {
        let mut score = 0;
        for l in 0..length {
            if !self.contiguous_equal(original_start + l, modified_start + l) {
                return 0;
            }
            score += self.original.text(original_start + l).map_or(0, |t| t.chars().count());
        }
        score
    }

    fn is_boundary(&self, index: isize, original: bool) -> bool {
        let sequence = if original { self.original } else { self.modified };
        let len = sequence.keys().len() as isize;
        if index <= 0 || index >= len - 1 {
            return true;
        }
        self.has_strings()
            && sequence
                .text(index as usize)
                .is_some_and(|t| t.chars().all(char::is_whitespace))
    }

    fn region_is_boundary(&self, start: usize, length: usize, original: bool) -> bool {
        let start = start as isize;
        if self.is_boundary(start, original) || self.is_boundary(start - 1, original) {
            return true;
        }
        if length > 0 {
            let end = start + length as isize;
            if self.is_boundary(end - 1, original) || self.is_boundary(end, original) {
                return true;
            }
        }
        false
    }

    fn boundary_score(&self, change: &DiffChange) -> u32 {
        u32::from(self.region_is_boundary(change.original_start, change.original_length, true))
            + u32::from(self.region_is_boundary(change.modified_start, change.modified_length, false))
    }
}
