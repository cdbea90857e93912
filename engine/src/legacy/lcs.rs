//! Bidirectional LCS search with a history of diagonal vectors.
//!
//! Forward and reverse furthest-reaching paths are advanced in lockstep
//! until they overlap. While the edit distance stays small the vectors of
//! every round are kept, so the whole path can be read back from the
//! history instead of recursing on both halves.

use tracing::debug;

use crate::timeout::Timeout;

/// Rounds whose diagonal vectors are kept for the trace walk.
const MAX_DIFFERENCES_HISTORY: isize = 1447;

/// A sequence the LCS search can compare.
pub trait LcsSequence {
    /// Comparison keys. Equal keys mean equal elements, also across the two
    /// sequences of one diff.
    fn keys(&self) -> &[u32];

    /// Returns `true` if elements carry text that prettification may look at.
    fn has_text(&self) -> bool {
        false
    }

    /// Text of an element, compared when shifting and scoring changes.
    fn text(&self, _index: usize) -> Option<&str> {
        None
    }

    /// Exact element, for equality beyond the key.
    fn strict_text(&self, _index: usize) -> Option<&str> {
        None
    }
}

/// One change: `original_length` elements at `original_start` replaced by
/// `modified_length` elements at `modified_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiffChange {
    /// First changed element of the original sequence.
    pub original_start: usize,
    /// Number of original elements removed.
    pub original_length: usize,
    /// First changed element of the modified sequence.
    pub modified_start: usize,
    /// Number of modified elements inserted.
    pub modified_length: usize,
}

impl DiffChange {
    /// Creates a change.
    #[must_use]
    pub const fn new(original_start: usize, original_length: usize, modified_start: usize, modified_length: usize) -> Self {
        Self {
            original_start,
            original_length,
            modified_start,
            modified_length,
        }
    }

    fn spanning(original_start: isize, original_length: isize, modified_start: isize, modified_length: isize) -> Self {
        Self::new(
            original_start.max(0) as usize,
            original_length.max(0) as usize,
            modified_start.max(0) as usize,
            modified_length.max(0) as usize,
        )
    }

    /// End of the original side, exclusive.
    #[must_use]
    pub const fn original_end(&self) -> usize {
        self.original_start + self.original_length
    }

    /// End of the modified side, exclusive.
    #[must_use]
    pub const fn modified_end(&self) -> usize {
        self.modified_start + self.modified_length
    }
}

/// Changes in ascending order, and whether the budget ran out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// The changes.
    pub changes: Vec<DiffChange>,
    /// Set when the search stopped early and the tail is coarse.
    pub quit_early: bool,
}

/// Diffs two sequences, optionally prettifying the result.
#[must_use]
pub fn compute_lcs_diff(
    original: &dyn LcsSequence,
    modified: &dyn LcsSequence,
    timeout: &dyn Timeout,
    pretty: bool,
) -> DiffResult {
    LcsDiff::new(original, modified, timeout).compute_diff(pretty)
}

enum RecursionPoint {
    Done(Vec<DiffChange>),
    Split { mid_original: isize, mid_modified: isize },
}

/// Inclusive bounds of the elements one search covers.
#[derive(Clone, Copy)]
struct Window {
    original_start: isize,
    original_end: isize,
    modified_start: isize,
    modified_end: isize,
}

impl Window {
    /// Everything in the window replaced.
    fn whole_change(self) -> DiffChange {
        DiffChange::spanning(
            self.original_start,
            self.original_end - self.original_start + 1,
            self.modified_start,
            self.modified_end - self.modified_start + 1,
        )
    }
}

/// Fixed shape of one recursion point search.
struct Geometry {
    forward_base: isize,
    forward_offset: isize,
    reverse_base: isize,
    reverse_offset: isize,
    original_end: isize,
    modified_end: isize,
    delta_is_even: bool,
}

/// Diagonal bounds of the last round and the meeting point.
#[derive(Clone, Copy)]
struct Frontier {
    forward_start: isize,
    forward_end: isize,
    reverse_start: isize,
    reverse_end: isize,
    mid_original: isize,
    mid_modified: isize,
}

/// Collects single-element edits into changes.
struct DiffChangeHelper {
    changes: Vec<DiffChange>,
    original_start: isize,
    modified_start: isize,
    original_count: isize,
    modified_count: isize,
}

impl DiffChangeHelper {
    fn new() -> Self {
        Self {
            changes: Vec::new(),
            original_start: isize::MAX,
            modified_start: isize::MAX,
            original_count: 0,
            modified_count: 0,
        }
    }

    fn mark_next_change(&mut self) {
        if self.original_count > 0 || self.modified_count > 0 {
            self.changes.push(DiffChange::spanning(
                self.original_start,
                self.original_count,
                self.modified_start,
                self.modified_count,
            ));
        }
        self.original_count = 0;
        self.modified_count = 0;
        self.original_start = isize::MAX;
        self.modified_start = isize::MAX;
    }

    fn add_original_element(&mut self, original_index: isize, modified_index: isize) {
        self.original_start = self.original_start.min(original_index);
        self.modified_start = self.modified_start.min(modified_index);
        self.original_count += 1;
    }

    fn add_modified_element(&mut self, original_index: isize, modified_index: isize) {
        self.original_start = self.original_start.min(original_index);
        self.modified_start = self.modified_start.min(modified_index);
        self.modified_count += 1;
    }

    fn into_changes(mut self) -> Vec<DiffChange> {
        self.mark_next_change();
        self.changes
    }

    fn into_reverse_changes(mut self) -> Vec<DiffChange> {
        self.mark_next_change();
        self.changes.reverse();
        self.changes
    }
}

/// The LCS search over two sequences.
pub struct LcsDiff<'a> {
    pub(super) original: &'a dyn LcsSequence,
    pub(super) modified: &'a dyn LcsSequence,
    timeout: &'a dyn Timeout,
    forward_history: Vec<Vec<isize>>,
    reverse_history: Vec<Vec<isize>>,
    quit_early: bool,
}

impl<'a> LcsDiff<'a> {
    /// Prepares a search.
    #[must_use]
    pub fn new(original: &'a dyn LcsSequence, modified: &'a dyn LcsSequence, timeout: &'a dyn Timeout) -> Self {
        Self {
            original,
            modified,
            timeout,
            forward_history: Vec::new(),
            reverse_history: Vec::new(),
            quit_early: false,
        }
    }

    /// Runs the search.
    #[must_use]
    pub fn compute_diff(mut self, pretty: bool) -> DiffResult {
        let original_end = self.original.keys().len() as isize - 1;
        let modified_end = self.modified.keys().len() as isize - 1;
        let mut changes = self.compute_diff_recursive(0, original_end, 0, modified_end);
        let whole = Window {
            original_start: 0,
            original_end,
            modified_start: 0,
            modified_end,
        };
        if self.quit_early && !self.is_edit_within(&changes, whole) {
            changes = vec![whole.whole_change()];
        }
        debug_assert!(self.is_edit_within(&changes, whole), "lcs changes leave the sequences");
        if pretty {
            changes = self.prettify_changes(changes);
        }
        if self.quit_early {
            debug!(changes = changes.len(), "lcs search stopped early");
        }
        DiffResult {
            changes,
            quit_early: self.quit_early,
        }
    }

    /// Returns `true` if `changes` are ascending, stay inside `window` and
    /// the elements between them are equal, so applying them to the
    /// original window yields the modified one.
    fn is_edit_within(&self, changes: &[DiffChange], window: Window) -> bool {
        let mut original_index = window.original_start;
        let mut modified_index = window.modified_start;
        let equal_run = |original_from: isize, modified_from: isize, original_stop: isize, modified_stop: isize| {
            original_stop - original_from == modified_stop - modified_from
                && (0..original_stop - original_from).all(|i| self.elements_equal(original_from + i, modified_from + i))
        };
        for change in changes {
            let (original_start, modified_start) = (change.original_start as isize, change.modified_start as isize);
            let (original_end, modified_end) = (change.original_end() as isize, change.modified_end() as isize);
            if original_start < original_index
                || modified_start < modified_index
                || original_end > window.original_end + 1
                || modified_end > window.modified_end + 1
                || !equal_run(original_index, modified_index, original_start, modified_start)
            {
                return false;
            }
            original_index = original_end;
            modified_index = modified_end;
        }
        equal_run(original_index, modified_index, window.original_end + 1, window.modified_end + 1)
    }

    pub(super) fn has_strings(&self) -> bool {
        self.original.has_text() && self.modified.has_text()
    }

    fn elements_equal(&self, original_index: isize, modified_index: isize) -> bool {
        self.original.keys()[original_index as usize] == self.modified.keys()[modified_index as usize]
    }

    pub(super) fn elements_strict_equal(&self, original_index: usize, modified_index: usize) -> bool {
        self.original.keys()[original_index] == self.modified.keys()[modified_index]
            && self.original.strict_text(original_index) == self.modified.strict_text(modified_index)
    }

    pub(super) fn original_elements_equal(&self, index1: usize, index2: usize) -> bool {
        let keys = self.original.keys();
        keys[index1] == keys[index2]
    }

    pub(super) fn modified_elements_equal(&self, index1: usize, index2: usize) -> bool {
        let keys = self.modified.keys();
        keys[index1] == keys[index2]
    }

    pub(super) fn contiguous_equal(&self, original_index: usize, modified_index: usize) -> bool {
        self.original.keys()[original_index] == self.modified.keys()[modified_index]
    }

    fn compute_diff_recursive(
        &mut self,
        mut original_start: isize,
        mut original_end: isize,
        mut modified_start: isize,
        mut modified_end: isize,
    ) -> Vec<DiffChange> {
        self.quit_early = false;

        while original_start <= original_end
            && modified_start <= modified_end
            && self.elements_equal(original_start, modified_start)
        {
            original_start += 1;
            modified_start += 1;
        }
        while original_end >= original_start
            && modified_end >= modified_start
            && self.elements_equal(original_end, modified_end)
        {
            original_end -= 1;
            modified_end -= 1;
        }

        if original_start > original_end || modified_start > modified_end {
            if modified_start <= modified_end {
                return vec![DiffChange::spanning(original_start, 0, modified_start, modified_end - modified_start + 1)];
            }
            if original_start <= original_end {
                return vec![DiffChange::spanning(original_start, original_end - original_start + 1, modified_start, 0)];
            }
            return Vec::new();
        }

        match self.compute_recursion_point(original_start, original_end, modified_start, modified_end) {
            RecursionPoint::Done(changes) => changes,
            RecursionPoint::Split {
                mid_original,
                mid_modified,
            } => {
                let left = self.compute_diff_recursive(original_start, mid_original, modified_start, mid_modified);
                let right = if self.quit_early {
                    vec![DiffChange::spanning(
                        mid_original + 1,
                        original_end - mid_original,
                        mid_modified + 1,
                        modified_end - mid_modified,
                    )]
                } else {
                    self.compute_diff_recursive(mid_original + 1, original_end, mid_modified + 1, modified_end)
                };
                concatenate_changes(left, right)
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn compute_recursion_point(
        &mut self,
        original_start: isize,
        original_end: isize,
        modified_start: isize,
        modified_end: isize,
    ) -> RecursionPoint {
        let original_start = original_start - 1;
        let modified_start = modified_start - 1;
        self.forward_history.clear();
        self.reverse_history.clear();

        let max_differences = (original_end - original_start) + (modified_end - modified_start);
        let num_diagonals = max_differences + 1;
        let mut forward_points = vec![0_isize; num_diagonals as usize];
        let mut reverse_points = vec![0_isize; num_diagonals as usize];
        let g = Geometry {
            forward_base: modified_end - modified_start,
            forward_offset: original_start - modified_start,
            reverse_base: original_end - original_start,
            reverse_offset: original_end - modified_end,
            original_end,
            modified_end,
            delta_is_even: (original_end - original_start - (modified_end - modified_start)) % 2 == 0,
        };
        forward_points[g.forward_base as usize] = original_start;
        reverse_points[g.reverse_base as usize] = original_end;
        self.quit_early = false;

        let mut f = Frontier {
            forward_start: 0,
            forward_end: 0,
            reverse_start: 0,
            reverse_end: 0,
            mid_original: 0,
            mid_modified: 0,
        };

        let mut num_differences: isize = 1;
        while 2 * num_differences <= max_differences + 2 {
            let mut furthest_original = original_start;
            let mut furthest_modified = modified_start;
            let within_history = num_differences <= MAX_DIFFERENCES_HISTORY + 1;

            f.forward_start = clip_diagonal_bound(g.forward_base - num_differences, num_differences, g.forward_base, num_diagonals);
            f.forward_end = clip_diagonal_bound(g.forward_base + num_differences, num_differences, g.forward_base, num_diagonals);
            let mut diagonal = f.forward_start;
            while diagonal <= f.forward_end {
                let mut original_index = if diagonal == f.forward_start
                    || (diagonal < f.forward_end && at(&forward_points, diagonal - 1) < at(&forward_points, diagonal + 1))
                {
                    at(&forward_points, diagonal + 1)
                } else {
                    at(&forward_points, diagonal - 1) + 1
                };
                let mut modified_index = original_index - (diagonal - g.forward_base) - g.forward_offset;
                let temp_original_index = original_index;
                while original_index < original_end
                    && modified_index < modified_end
                    && self.elements_equal(original_index + 1, modified_index + 1)
                {
                    original_index += 1;
                    modified_index += 1;
                }
                forward_points[diagonal as usize] = original_index;
                if original_index + modified_index > furthest_original + furthest_modified {
                    furthest_original = original_index;
                    furthest_modified = modified_index;
                }

                // With an odd delta the paths first meet on a forward step.
                if !g.delta_is_even
                    && (diagonal - g.reverse_base).abs() <= num_differences - 1
                    && original_index >= at(&reverse_points, diagonal)
                {
                    f.mid_original = original_index;
                    f.mid_modified = modified_index;
                    if temp_original_index <= at(&reverse_points, diagonal) && within_history {
                        return RecursionPoint::Done(self.walk_trace(&g, f, &forward_points, &reverse_points));
                    }
                    return RecursionPoint::Split {
                        mid_original: f.mid_original,
                        mid_modified: f.mid_modified,
                    };
                }
                diagonal += 2;
            }

            let match_length_doubled = (furthest_original - original_start) + (furthest_modified - modified_start) - num_differences;
            if !self.timeout.is_valid() {
                self.quit_early = true;
                f.mid_original = furthest_original;
                f.mid_modified = furthest_modified;
                let window = Window {
                    original_start: original_start + 1,
                    original_end,
                    modified_start: modified_start + 1,
                    modified_end,
                };
                if match_length_doubled > 0 && within_history {
                    // The furthest point may lie on a diagonal off the edit
                    // grid, so the partial trace is only kept if it fits.
                    let changes = self.walk_trace(&g, f, &forward_points, &reverse_points);
                    if self.is_edit_within(&changes, window) {
                        return RecursionPoint::Done(changes);
                    }
                }
                return RecursionPoint::Done(vec![window.whole_change()]);
            }

            f.reverse_start = clip_diagonal_bound(g.reverse_base - num_differences, num_differences, g.reverse_base, num_diagonals);
            f.reverse_end = clip_diagonal_bound(g.reverse_base + num_differences, num_differences, g.reverse_base, num_diagonals);
            let mut diagonal = f.reverse_start;
            while diagonal <= f.reverse_end {
                let mut original_index = if diagonal == f.reverse_start
                    || (diagonal < f.reverse_end && at(&reverse_points, diagonal - 1) >= at(&reverse_points, diagonal + 1))
                {
                    at(&reverse_points, diagonal + 1) - 1
                } else {
                    at(&reverse_points, diagonal - 1)
                };
                let mut modified_index = original_index - (diagonal - g.reverse_base) - g.reverse_offset;
                let temp_original_index = original_index;
                while original_index > original_start
                    && modified_index > modified_start
                    && self.elements_equal(original_index, modified_index)
                {
                    original_index -= 1;
                    modified_index -= 1;
                }
                reverse_points[diagonal as usize] = original_index;

                // With an even delta the paths first meet on a reverse step.
                if g.delta_is_even
                    && (diagonal - g.forward_base).abs() <= num_differences
                    && original_index <= at(&forward_points, diagonal)
                {
                    f.mid_original = original_index;
                    f.mid_modified = modified_index;
                    if temp_original_index >= at(&forward_points, diagonal) && within_history {
                        return RecursionPoint::Done(self.walk_trace(&g, f, &forward_points, &reverse_points));
                    }
                    return RecursionPoint::Split {
                        mid_original: f.mid_original,
                        mid_modified: f.mid_modified,
                    };
                }
                diagonal += 2;
            }

            if num_differences <= MAX_DIFFERENCES_HISTORY {
                self.forward_history
                    .push(snapshot(&forward_points, g.forward_base, f.forward_start, f.forward_end));
                self.reverse_history
                    .push(snapshot(&reverse_points, g.reverse_base, f.reverse_start, f.reverse_end));
            }
            num_differences += 1;
        }

        RecursionPoint::Done(self.walk_trace(&g, f, &forward_points, &reverse_points))
    }

    /// Reads the edit path back from the saved diagonal vectors.
    fn walk_trace(&self, g: &Geometry, f: Frontier, forward_points: &[isize], reverse_points: &[isize]) -> Vec<DiffChange> {
        let mut helper = DiffChangeHelper::new();
        let mut points = forward_points;
        let mut base = g.forward_base;
        let mut diagonal_min = f.forward_start;
        let mut diagonal_max = f.forward_end;
        let mut diagonal_relative = (f.mid_original - f.mid_modified) - g.forward_offset;
        let mut last_original_index = isize::MIN;
        let mut history_index = self.forward_history.len() as isize - 1;
        loop {
            let diagonal = diagonal_relative + base;
            if diagonal == diagonal_min
                || (diagonal < diagonal_max && at(points, diagonal - 1) < at(points, diagonal + 1))
            {
                // Insertion.
                let original_index = at(points, diagonal + 1);
                let modified_index = original_index - diagonal_relative - g.forward_offset;
                if original_index < last_original_index {
                    helper.mark_next_change();
                }
                last_original_index = original_index;
                helper.add_modified_element(original_index + 1, modified_index);
                diagonal_relative = (diagonal + 1) - base;
            } else {
                // Deletion.
                let original_index = at(points, diagonal - 1) + 1;
                let modified_index = original_index - diagonal_relative - g.forward_offset;
                if original_index < last_original_index {
                    helper.mark_next_change();
                }
                last_original_index = original_index - 1;
                helper.add_original_element(original_index, modified_index + 1);
                diagonal_relative = (diagonal - 1) - base;
            }
            if history_index >= 0 {
                points = &self.forward_history[history_index as usize];
                base = points[0];
                diagonal_min = 1;
                diagonal_max = points.len() as isize - 1;
            }
            history_index -= 1;
            if history_index < -1 {
                break;
            }
        }
        let forward_changes = helper.into_reverse_changes();

        let reverse_changes = if self.quit_early {
            let mut original_start_point = f.mid_original + 1;
            let mut modified_start_point = f.mid_modified + 1;
            if let Some(last) = forward_changes.last() {
                original_start_point = original_start_point.max(last.original_end() as isize);
                modified_start_point = modified_start_point.max(last.modified_end() as isize);
            }
            vec![DiffChange::spanning(
                original_start_point,
                g.original_end - original_start_point + 1,
                modified_start_point,
                g.modified_end - modified_start_point + 1,
            )]
        } else {
            let mut helper = DiffChangeHelper::new();
            let mut points = reverse_points;
            let mut base = g.reverse_base;
            let mut diagonal_min = f.reverse_start;
            let mut diagonal_max = f.reverse_end;
            let mut diagonal_relative = (f.mid_original - f.mid_modified) - g.reverse_offset;
            let mut last_original_index = isize::MAX;
            let mut history_index = self.reverse_history.len() as isize - if g.delta_is_even { 1 } else { 2 };
            loop {
                let diagonal = diagonal_relative + base;
                if diagonal == diagonal_min
                    || (diagonal < diagonal_max && at(points, diagonal - 1) >= at(points, diagonal + 1))
                {
                    // Deletion.
                    let original_index = at(points, diagonal + 1) - 1;
                    let modified_index = original_index - diagonal_relative - g.reverse_offset;
                    if original_index > last_original_index {
                        helper.mark_next_change();
                    }
                    last_original_index = original_index + 1;
                    helper.add_original_element(original_index + 1, modified_index + 1);
                    diagonal_relative = (diagonal + 1) - base;
                } else {
                    // Insertion.
                    let original_index = at(points, diagonal - 1);
                    let modified_index = original_index - diagonal_relative - g.reverse_offset;
                    if original_index > last_original_index {
                        helper.mark_next_change();
                    }
                    last_original_index = original_index;
                    helper.add_modified_element(original_index + 1, modified_index + 1);
                    diagonal_relative = (diagonal - 1) - base;
                }
                if history_index >= 0 {
                    points = &self.reverse_history[history_index as usize];
                    base = points[0];
                    diagonal_min = 1;
                    diagonal_max = points.len() as isize - 1;
                }
                history_index -= 1;
                if history_index < -1 {
                    break;
                }
            }
            helper.into_changes()
        };

        concatenate_changes(forward_changes, reverse_changes)
    }
}

fn at(points: &[isize], index: isize) -> isize {
    usize::try_from(index)
        .ok()
        .and_then(|i| points.get(i))
        .copied()
        .unwrap_or_default()
}

/// Copies the live diagonals, prefixed with the index of the base diagonal.
fn snapshot(points: &[isize], base: isize, start: isize, end: isize) -> Vec<isize> {
    let mut saved = Vec::with_capacity((end - start + 2) as usize);
    saved.push(base - start + 1);
    saved.extend_from_slice(&points[start as usize..=end as usize]);
    saved
}

/// Clips a diagonal into `[0, num_diagonals)` keeping the parity of the
/// round.
fn clip_diagonal_bound(diagonal: isize, num_differences: isize, base: isize, num_diagonals: isize) -> isize {
    if (0..num_diagonals).contains(&diagonal) {
        return diagonal;
    }
    let differences_even = num_differences % 2 == 0;
    if diagonal < 0 {
        let below_even = base % 2 == 0;
        if differences_even == below_even { 0 } else { 1 }
    } else {
        let above_even = (num_diagonals - base - 1) % 2 == 0;
        if differences_even == above_even {
            num_diagonals - 1
        } else {
            num_diagonals - 2
        }
    }
}

/// Merges `left` and `right` if they overlap or touch.
pub(super) fn changes_overlap(left: &DiffChange, right: &DiffChange) -> Option<DiffChange> {
    let original_touches = left.original_end() >= right.original_start;
    let modified_touches = left.modified_end() >= right.modified_start;
    if !original_touches && !modified_touches {
        return None;
    }
    let original_length = if original_touches {
        right.original_end() - left.original_start
    } else {
        left.original_length
    };
    let modified_length = if modified_touches {
        right.modified_end() - left.modified_start
    } else {
        left.modified_length
    };
    Some(DiffChange::new(left.original_start, original_length, left.modified_start, modified_length))
}

fn concatenate_changes(mut left: Vec<DiffChange>, right: Vec<DiffChange>) -> Vec<DiffChange> {
    let (Some(last), Some(first)) = (left.last(), right.first()) else {
        return if right.is_empty() { left } else { right };
    };
    if let Some(merged) = changes_overlap(last, first) {
        let last_index = left.len() - 1;
        left[last_index] = merged;
        left.extend(right.into_iter().skip(1));
    } else {
        left.extend(right);
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeout::{CountingTimeout, InfiniteTimeout};
    use pretty_assertions::assert_eq;

    struct Keys(Vec<u32>);

    impl Keys {
        fn of(s: &str) -> Self {
            Self(s.chars().map(u32::from).collect())
        }
    }

    impl LcsSequence for Keys {
        fn keys(&self) -> &[u32] {
            &self.0
        }
    }

    fn diff(a: &str, b: &str) -> Vec<DiffChange> {
        compute_lcs_diff(&Keys::of(a), &Keys::of(b), &InfiniteTimeout, false).changes
    }

    fn apply(a: &str, b: &str, changes: &[DiffChange]) -> String {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut out = String::new();
        let mut pos = 0;
        for c in changes {
            out.extend(&a[pos..c.original_start]);
            out.extend(&b[c.modified_start..c.modified_end()]);
            pos = c.original_end();
        }
        out.extend(&a[pos..]);
        out
    }

    #[test]
    fn test_identical() {
        assert!(diff("abc", "abc").is_empty());
        assert!(diff("", "").is_empty());
    }

    #[test]
    fn test_pure_insertion_and_deletion() {
        assert_eq!(diff("ac", "abc"), vec![DiffChange::new(1, 0, 1, 1)]);
        assert_eq!(diff("abc", "ac"), vec![DiffChange::new(1, 1, 1, 0)]);
        assert_eq!(diff("", "xy"), vec![DiffChange::new(0, 0, 0, 2)]);
    }

    #[test]
    fn test_changes_reproduce_modified() {
        let cases = [
            ("abcabba", "cbabac"),
            ("the quick brown fox", "the quack brown box"),
            ("xxxxabcxxxx", "abc"),
            ("kitten", "sitting"),
        ];
        for (a, b) in cases {
            let changes = diff(a, b);
            assert_eq!(apply(a, b, &changes), b, "{a} -> {b}");
            assert!(changes.windows(2).all(|w| w[0].original_end() < w[1].original_start
                || w[0].modified_end() < w[1].modified_start));
        }
    }

    #[test]
    fn test_expired_budget_quits_early() {
        let a = "abcdefghijklmnopqrstuvwxyz";
        let b = "zyxwvutsrqponmlkjihgfedcba";
        let result = compute_lcs_diff(&Keys::of(a), &Keys::of(b), &CountingTimeout::new(0), false);
        assert!(result.quit_early);
        assert_eq!(apply(a, b, &result.changes), b);
    }

    #[test]
    fn test_budget_running_out_mid_search_stays_in_bounds() {
        let cases = [
            ("caaaaaa", "ab"),
            ("abcabba", "cbabac"),
            ("xxxxabcxxxx", "abc"),
            ("the quick brown fox", "jumps over the lazy dog"),
        ];
        for (a, b) in cases {
            for polls in 0..24 {
                for pretty in [false, true] {
                    let result = compute_lcs_diff(&Keys::of(a), &Keys::of(b), &CountingTimeout::new(polls), pretty);
                    for c in &result.changes {
                        assert!(c.original_end() <= a.len(), "{a} -> {b} after {polls} polls: {c:?}");
                        assert!(c.modified_end() <= b.len(), "{a} -> {b} after {polls} polls: {c:?}");
                    }
                    assert_eq!(apply(a, b, &result.changes), b, "{a} -> {b} after {polls} polls");
                }
            }
        }
    }

    #[test]
    fn test_concatenate_merges_touching() {
        let merged = concatenate_changes(vec![DiffChange::new(0, 2, 0, 1)], vec![DiffChange::new(2, 1, 3, 1)]);
        assert_eq!(merged, vec![DiffChange::new(0, 3, 0, 4)]);
        let kept = concatenate_changes(vec![DiffChange::new(0, 1, 0, 1)], vec![DiffChange::new(3, 1, 3, 1)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_clip_diagonal_bound_keeps_parity() {
        assert_eq!(clip_diagonal_bound(2, 1, 1, 5), 2);
        assert_eq!(clip_diagonal_bound(-1, 1, 1, 5), 0);
        assert_eq!(clip_diagonal_bound(-2, 2, 1, 5), 1);
        assert_eq!(clip_diagonal_bound(6, 2, 1, 5), 3);
    }
}
