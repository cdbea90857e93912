//! Passes reshaping raw alignments into diffs a human would write.
//!
//! Each pass takes the diffs of one alignment in ascending order and returns
//! them in ascending order. The line passes run on [`LineSequence`]s, the
//! word and text passes on [`LinesSliceCharSequence`]s.

use std::collections::VecDeque;

use crate::algorithms::{OffsetPair, SequenceDiff};
use crate::config::DiffTuning;
use crate::ranges::OffsetRange;
use crate::sequences::{LineSequence, LinesSliceCharSequence, Sequence};

/// Joins diffs separated only by repetitions of an insertion or deletion,
/// then slides the remaining one-sided diffs to their best-scored boundary.
#[must_use]
pub fn optimize_sequence_diffs(
    seq1: &dyn Sequence,
    seq2: &dyn Sequence,
    diffs: Vec<SequenceDiff>,
    tuning: &DiffTuning,
) -> Vec<SequenceDiff> {
    let diffs = join_sequence_diffs_by_shifting(seq1, seq2, diffs);
    let diffs = join_sequence_diffs_by_shifting(seq1, seq2, diffs);
    shift_sequence_diffs(seq1, seq2, diffs, tuning.max_shift)
}

/// Shifts one-sided diffs left, then right, merging them into a neighbour
/// whenever the shift closes the gap.
///
/// `aaa` against `aaaa` has four equally short insertion points; shifting
/// settles on one.
#[must_use]
pub fn join_sequence_diffs_by_shifting(
    seq1: &dyn Sequence,
    seq2: &dyn Sequence,
    diffs: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    let mut iter = diffs.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut left: Vec<SequenceDiff> = vec![first];
    for mut cur in iter {
        let Some(prev) = left.last_mut() else { break };
        if cur.seq1_range.is_empty() || cur.seq2_range.is_empty() {
            let length = cur.seq1_range.start() - prev.seq1_range.end_exclusive();
            let mut d = 1;
            while d <= length
                && seq1.is_strongly_equal(cur.seq1_range.start() - d, cur.seq1_range.end_exclusive() - d)
                && seq2.is_strongly_equal(cur.seq2_range.start() - d, cur.seq2_range.end_exclusive() - d)
            {
                d += 1;
            }
            d -= 1;
            if d == length {
                *prev = SequenceDiff::new(
                    OffsetRange::new(prev.seq1_range.start(), cur.seq1_range.end_exclusive() - length),
                    OffsetRange::new(prev.seq2_range.start(), cur.seq2_range.end_exclusive() - length),
                );
                continue;
            }
            cur = cur.delta(-(d as isize));
        }
        left.push(cur);
    }

    let mut result = Vec::with_capacity(left.len());
    for i in 0..left.len().saturating_sub(1) {
        let next = left[i + 1];
        let mut cur = left[i];
        if cur.seq1_range.is_empty() || cur.seq2_range.is_empty() {
            let length = next.seq1_range.start() - cur.seq1_range.end_exclusive();
            let mut d = 0;
            while d < length
                && seq1.is_strongly_equal(cur.seq1_range.start() + d, cur.seq1_range.end_exclusive() + d)
                && seq2.is_strongly_equal(cur.seq2_range.start() + d, cur.seq2_range.end_exclusive() + d)
            {
                d += 1;
            }
            if d == length {
                left[i + 1] = SequenceDiff::new(
                    OffsetRange::new(cur.seq1_range.start() + length, next.seq1_range.end_exclusive()),
                    OffsetRange::new(cur.seq2_range.start() + length, next.seq2_range.end_exclusive()),
                );
                continue;
            }
            cur = cur.delta(d as isize);
        }
        result.push(cur);
    }
    if let Some(last) = left.last() {
        result.push(*last);
    }
    result
}

/// Moves each one-sided diff within the gap between its neighbours to the
/// position with the highest boundary score.
#[must_use]
pub fn shift_sequence_diffs(
    seq1: &dyn Sequence,
    seq2: &dyn Sequence,
    mut diffs: Vec<SequenceDiff>,
    max_shift: usize,
) -> Vec<SequenceDiff> {
    if seq1.boundary_score(0).is_none() || seq2.boundary_score(0).is_none() {
        return diffs;
    }
    for i in 0..diffs.len() {
        let prev = i.checked_sub(1).map(|j| diffs[j]);
        let next = diffs.get(i + 1).copied();
        let diff = diffs[i];
        let valid1 = (
            prev.map_or(0, |p| p.seq1_range.end_exclusive() + 1),
            next.map_or(seq1.len(), |n| n.seq1_range.start().saturating_sub(1)),
        );
        let valid2 = (
            prev.map_or(0, |p| p.seq2_range.end_exclusive() + 1),
            next.map_or(seq2.len(), |n| n.seq2_range.start().saturating_sub(1)),
        );
        if diff.seq1_range.is_empty() {
            diffs[i] = shift_diff_to_better_position(diff, seq1, seq2, valid1, valid2, max_shift);
        } else if diff.seq2_range.is_empty() {
            diffs[i] = shift_diff_to_better_position(diff.swap(), seq2, seq1, valid2, valid1, max_shift).swap();
        }
    }
    diffs
}

/// `diff` is empty on the `seq1` side. Valid ranges are `(start, end)`
/// bounds the shifted diff must stay within.
fn shift_diff_to_better_position(
    diff: SequenceDiff,
    seq1: &dyn Sequence,
    seq2: &dyn Sequence,
    valid1: (usize, usize),
    valid2: (usize, usize),
    max_shift: usize,
) -> SequenceDiff {
    let (start1, start2, end2) = (
        diff.seq1_range.start(),
        diff.seq2_range.start(),
        diff.seq2_range.end_exclusive(),
    );

    let mut delta_before = 1;
    while delta_before <= start1
        && delta_before <= start2
        && start1 - delta_before >= valid1.0
        && start2 - delta_before >= valid2.0
        && seq2.is_strongly_equal(start2 - delta_before, end2 - delta_before)
        && delta_before < max_shift
    {
        delta_before += 1;
    }
    delta_before -= 1;

    let mut delta_after = 0;
    while start1 + delta_after < valid1.1
        && end2 + delta_after < valid2.1
        && seq2.is_strongly_equal(start2 + delta_after, end2 + delta_after)
        && delta_after < max_shift
    {
        delta_after += 1;
    }

    if delta_before == 0 && delta_after == 0 {
        return diff;
    }

    let score = |delta: isize| {
        seq1.boundary_score(start1.saturating_add_signed(delta)).unwrap_or(0)
            + seq2.boundary_score(start2.saturating_add_signed(delta)).unwrap_or(0)
            + seq2.boundary_score(end2.saturating_add_signed(delta)).unwrap_or(0)
    };
    let mut best_delta: isize = 0;
    let mut best_score = -1;
    for delta in -(delta_before as isize)..=(delta_after as isize) {
        let s = score(delta);
        if s > best_score {
            best_score = s;
            best_delta = delta;
        }
    }
    diff.delta(best_delta)
}

/// Joins diffs whose gap is at most `short_match_gap` elements on either
/// side. Diffs that run backwards on a side are left apart.
#[must_use]
pub fn remove_short_matches(diffs: Vec<SequenceDiff>, tuning: &DiffTuning) -> Vec<SequenceDiff> {
    let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    for d in diffs {
        let short = result.last().and_then(|last| {
            let gap1 = d.seq1_range.start().checked_sub(last.seq1_range.end_exclusive())?;
            let gap2 = d.seq2_range.start().checked_sub(last.seq2_range.end_exclusive())?;
            Some(gap1 <= tuning.short_match_gap || gap2 <= tuning.short_match_gap)
        });
        match result.last_mut() {
            Some(last) if short == Some(true) => *last = last.join(&d),
            _ => result.push(d),
        }
    }
    result
}

/// Repeatedly joins line diffs separated by a few characters of
/// non-whitespace text when one of them is large.
#[must_use]
pub fn remove_very_short_matching_lines_between_diffs(
    seq1: &LineSequence<'_>,
    diffs: Vec<SequenceDiff>,
    tuning: &DiffTuning,
) -> Vec<SequenceDiff> {
    let big = |d: &SequenceDiff| d.seq1_range.len() + d.seq2_range.len() > tuning.short_line_gap_elements;
    join_repeatedly(diffs, |before, after| {
        let gap = OffsetRange::new(before.seq1_range.end_exclusive(), after.seq1_range.start());
        let visible = seq1.text(gap).chars().filter(|c| !c.is_whitespace()).count();
        visible <= tuning.short_line_gap_chars && (big(before) || big(after))
    })
}

/// Runs joining passes until nothing joins, at most eleven times.
fn join_repeatedly(
    mut diffs: Vec<SequenceDiff>,
    should_join: impl Fn(&SequenceDiff, &SequenceDiff) -> bool,
) -> Vec<SequenceDiff> {
    if diffs.is_empty() {
        return diffs;
    }
    for _ in 0..=10 {
        let mut joined_any = false;
        let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
        for cur in diffs {
            match result.last_mut() {
                Some(last) if should_join(last, &cur) => {
                    joined_any = true;
                    *last = last.join(&cur);
                }
                _ => result.push(cur),
            }
        }
        diffs = result;
        if !joined_any {
            break;
        }
    }
    diffs
}

/// Absorbs whole words into the diff when a boundary cuts through a word
/// that is mostly changed.
#[must_use]
pub fn extend_diffs_to_entire_word_if_appropriate(
    seq1: &LinesSliceCharSequence<'_>,
    seq2: &LinesSliceCharSequence<'_>,
    diffs: Vec<SequenceDiff>,
    tuning: &DiffTuning,
) -> Vec<SequenceDiff> {
    let mut equal_mappings: VecDeque<SequenceDiff> =
        SequenceDiff::invert(&diffs, seq1.len()).into();
    let mut additional = Vec::new();
    let mut last_point = OffsetPair::ZERO;

    let mut scan_word = |pair: OffsetPair,
                         equal_mapping: &SequenceDiff,
                         equal_mappings: &mut VecDeque<SequenceDiff>| {
        if pair.offset1 < last_point.offset1 || pair.offset2 < last_point.offset2 {
            return;
        }
        let (Some(w1), Some(w2)) = (seq1.find_word_containing(pair.offset1), seq2.find_word_containing(pair.offset2))
        else {
            return;
        };
        let mut w = SequenceDiff::new(w1, w2);
        let Some(equal_part) = w.intersect(equal_mapping) else {
            return;
        };
        let mut equal_chars1 = equal_part.seq1_range.len();
        let mut equal_chars2 = equal_part.seq2_range.len();

        // Words never reach back into processed equal regions, but may run
        // into the following ones.
        while let Some(next) = equal_mappings.front().copied() {
            if !next.seq1_range.intersects(&w.seq1_range) && !next.seq2_range.intersects(&w.seq2_range) {
                break;
            }
            let (Some(v1), Some(v2)) = (
                seq1.find_word_containing(next.seq1_range.start()),
                seq2.find_word_containing(next.seq2_range.start()),
            ) else {
                break;
            };
            let v = SequenceDiff::new(v1, v2);
            if let Some(part) = v.intersect(&next) {
                equal_chars1 += part.seq1_range.len();
                equal_chars2 += part.seq2_range.len();
            }
            w = w.join(&v);
            if w.seq1_range.end_exclusive() >= next.seq1_range.end_exclusive() {
                equal_mappings.pop_front();
            } else {
                break;
            }
        }

        let word_len = (w.seq1_range.len() + w.seq2_range.len()) as f64;
        if ((equal_chars1 + equal_chars2) as f64) < word_len * tuning.word_extension_ratio {
            additional.push(w);
        }
        last_point = w.end_exclusives();
    };

    while let Some(next) = equal_mappings.pop_front() {
        if next.seq1_range.is_empty() {
            continue;
        }
        scan_word(next.starts(), &next, &mut equal_mappings);
        // The region is non-empty, so the element before its end is equal on
        // both sides.
        scan_word(next.end_exclusives().delta(-1), &next, &mut equal_mappings);
    }

    merge_sequence_diffs(diffs, additional)
}

/// Merges two sorted lists, joining diffs that overlap or touch on the first
/// side.
fn merge_sequence_diffs(diffs1: Vec<SequenceDiff>, diffs2: Vec<SequenceDiff>) -> Vec<SequenceDiff> {
    let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs1.len() + diffs2.len());
    let mut a = diffs1.into_iter().peekable();
    let mut b = diffs2.into_iter().peekable();
    loop {
        let take_first = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x.seq1_range.start() < y.seq1_range.start(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let Some(next) = (if take_first { a.next() } else { b.next() }) else {
            break;
        };
        match result.last_mut() {
            Some(last) if last.seq1_range.end_exclusive() >= next.seq1_range.start() => {
                *last = last.join(&next);
            }
            _ => result.push(next),
        }
    }
    result
}

/// Joins long character diffs separated by a short single-line gap when
/// the cost model favours one big diff, then lets diffs longer than
/// `long_diff_min_len` absorb a short prefix or suffix of their lines.
#[must_use]
pub fn remove_very_short_matching_text_between_long_diffs(
    seq1: &LinesSliceCharSequence<'_>,
    seq2: &LinesSliceCharSequence<'_>,
    diffs: Vec<SequenceDiff>,
    tuning: &DiffTuning,
) -> Vec<SequenceDiff> {
    let cap = tuning.long_diff_cost_cap;
    let cost = |lines: usize, len: usize| ((lines * 40 + len) as f64).min(cap).powf(1.5);
    let side_cost = |d: &SequenceDiff| {
        (cost(seq1.count_lines_in(d.seq1_range), d.seq1_range.len())
            + cost(seq2.count_lines_in(d.seq2_range), d.seq2_range.len()))
        .powf(1.5)
    };
    let threshold = cap.powf(1.5).powf(1.5) * tuning.long_diff_bridge_factor;

    let diffs = join_repeatedly(diffs, |before, after| {
        let gap = OffsetRange::new(before.seq1_range.end_exclusive(), after.seq1_range.start());
        if seq1.count_lines_in(gap) > tuning.long_diff_max_gap_lines || gap.len() > tuning.long_diff_max_gap_len {
            return false;
        }
        let text = seq1.text_of(gap);
        let text = text.trim();
        if text.chars().count() > tuning.long_diff_max_gap_text || text.contains(['\r', '\n']) {
            return false;
        }
        side_cost(before) + side_cost(after) > threshold
    });

    let should_mark_as_changed = |text: &str, cur: &SequenceDiff| {
        !text.is_empty()
            && text.trim().chars().count() <= tuning.long_diff_absorb_text
            && cur.seq1_range.len() + cur.seq2_range.len() > tuning.long_diff_min_len
    };

    let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    for (i, cur) in diffs.iter().enumerate() {
        let mut new_diff = *cur;
        let full = seq1.extend_to_full_lines(cur.seq1_range);
        let prefix = seq1.text_of(OffsetRange::new(full.start(), cur.seq1_range.start()));
        if should_mark_as_changed(&prefix, cur) {
            new_diff = new_diff.delta_start(-(prefix.chars().count() as isize));
        }
        let suffix = seq1.text_of(OffsetRange::new(cur.seq1_range.end_exclusive(), full.end_exclusive()));
        if should_mark_as_changed(&suffix, cur) {
            new_diff = new_diff.delta_end(suffix.chars().count() as isize);
        }

        let available = SequenceDiff::from_offset_pairs(
            i.checked_sub(1).map_or(OffsetPair::ZERO, |j| diffs[j].end_exclusives()),
            diffs
                .get(i + 1)
                .map_or(OffsetPair::new(usize::MAX, usize::MAX), SequenceDiff::starts),
        );
        let clipped = new_diff.intersect(&available).unwrap_or(*cur);
        match result.last_mut() {
            Some(last) if clipped.starts() == last.end_exclusives() => *last = last.join(&clipped),
            _ => result.push(clipped),
        }
    }
    result
}
