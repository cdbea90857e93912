//! Character view of a range of lines.

use super::{CharClassifier, Sequence};
use crate::ranges::{OffsetRange, Position, Range};
use crate::util::{find_first_idx_monotonous_or_len, find_last_idx_monotonous};

/// Which side wins when an offset sits exactly where trimmed leading
/// whitespace was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetPreference {
    /// Before the trimmed whitespace.
    Left,
    /// After the trimmed whitespace.
    Right,
}

/// The characters of `range` within `lines`, with `\n` between lines.
///
/// When whitespace changes are ignored each line is trimmed on both ends;
/// offsets translate back to the untrimmed columns.
#[derive(Debug, Clone)]
pub struct LinesSliceCharSequence<'a> {
    elements: Vec<char>,
    first_element_offset_by_line_idx: Vec<usize>,
    line_start_offsets: Vec<usize>,
    trimmed_ws_lengths_by_line_idx: Vec<usize>,
    range: Range,
    consider_whitespace_changes: bool,
    classifier: &'a CharClassifier,
}

impl<'a> LinesSliceCharSequence<'a> {
    /// Builds the view. `range` must lie within `lines`.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        lines: &[S],
        range: Range,
        consider_whitespace_changes: bool,
        classifier: &'a CharClassifier,
    ) -> Self {
        let mut seq = Self {
            elements: Vec::new(),
            first_element_offset_by_line_idx: vec![0],
            line_start_offsets: Vec::new(),
            trimmed_ws_lengths_by_line_idx: Vec::new(),
            range,
            consider_whitespace_changes,
            classifier,
        };

        for line_number in range.start_line_number..=range.end_line_number {
            let mut line = lines.get(line_number - 1).map_or("", AsRef::as_ref);
            let mut line_start_offset = 0;
            if line_number == range.start_line_number && range.start_column > 1 {
                line_start_offset = range.start_column - 1;
                line = line
                    .char_indices()
                    .nth(line_start_offset)
                    .map_or("", |(i, _)| &line[i..]);
            }
            seq.line_start_offsets.push(line_start_offset);

            let mut trimmed_ws_length = 0;
            if !consider_whitespace_changes {
                let trimmed_start = line.trim_start();
                trimmed_ws_length = line.chars().count() - trimmed_start.chars().count();
                line = trimmed_start.trim_end();
            }
            seq.trimmed_ws_lengths_by_line_idx.push(trimmed_ws_length);

            let line_len = line.chars().count();
            let take = if line_number == range.end_line_number {
                (range.end_column - 1)
                    .saturating_sub(line_start_offset + trimmed_ws_length)
                    .min(line_len)
            } else {
                line_len
            };
            seq.elements.extend(line.chars().take(take));

            if line_number < range.end_line_number {
                seq.elements.push('\n');
                seq.first_element_offset_by_line_idx.push(seq.elements.len());
            }
        }
        seq
    }

    /// Whether whitespace was kept.
    #[must_use]
    pub const fn considers_whitespace_changes(&self) -> bool {
        self.consider_whitespace_changes
    }

    /// All characters of the view.
    #[must_use]
    pub fn text(&self) -> String {
        self.elements.iter().collect()
    }

    /// The characters in `range`.
    #[must_use]
    pub fn text_of(&self, range: OffsetRange) -> String {
        range.slice(&self.elements).iter().collect()
    }

    /// Document position of the element at `offset`.
    #[must_use]
    pub fn translate_offset(&self, offset: usize, preference: OffsetPreference) -> Position {
        let i = find_last_idx_monotonous(&self.first_element_offset_by_line_idx, |&v| v <= offset).unwrap_or(0);
        let line_offset = offset - self.first_element_offset_by_line_idx[i];
        let trimmed = if line_offset == 0 && preference == OffsetPreference::Left {
            0
        } else {
            self.trimmed_ws_lengths_by_line_idx[i]
        };
        Position::new(
            self.range.start_line_number + i,
            1 + self.line_start_offsets[i] + line_offset + trimmed,
        )
    }

    /// Document range covering `range`. A range collapsing onto trimmed
    /// whitespace becomes empty.
    #[must_use]
    pub fn translate_range(&self, range: OffsetRange) -> Range {
        let start = self.translate_offset(range.start(), OffsetPreference::Right);
        let end = self.translate_offset(range.end_exclusive(), OffsetPreference::Left);
        if end.is_before(&start) {
            return Range::empty_at(end);
        }
        Range::from_positions(start, end)
    }

    /// The run of word characters around `offset`, if it is one.
    #[must_use]
    pub fn find_word_containing(&self, offset: usize) -> Option<OffsetRange> {
        let is_word = |i: usize| CharClassifier::is_word_char(self.elements[i]);
        if offset >= self.elements.len() || !is_word(offset) {
            return None;
        }
        let mut start = offset;
        while start > 0 && is_word(start - 1) {
            start -= 1;
        }
        let mut end = offset;
        while end < self.elements.len() && is_word(end) {
            end += 1;
        }
        Some(OffsetRange::new(start, end))
    }

    /// Number of line breaks inside `range`.
    #[must_use]
    pub fn count_lines_in(&self, range: OffsetRange) -> usize {
        self.translate_offset(range.end_exclusive(), OffsetPreference::Right).line_number
            - self.translate_offset(range.start(), OffsetPreference::Right).line_number
    }

    /// Widens `range` to whole lines of the view.
    #[must_use]
    pub fn extend_to_full_lines(&self, range: OffsetRange) -> OffsetRange {
        let offsets = &self.first_element_offset_by_line_idx;
        let start = find_last_idx_monotonous(offsets, |&x| x <= range.start()).map_or(0, |i| offsets[i]);
        let end_idx = find_first_idx_monotonous_or_len(offsets, |&x| range.end_exclusive() <= x);
        let end = offsets.get(end_idx).copied().unwrap_or(self.elements.len());
        OffsetRange::new(start, end)
    }
}

impl Sequence for LinesSliceCharSequence<'_> {
    fn element(&self, offset: usize) -> u32 {
        u32::from(self.elements[offset])
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn boundary_score(&self, length: usize) -> Option<i32> {
        let prev = length.checked_sub(1).map(|i| self.elements[i]);
        let next = self.elements.get(length).copied();
        Some(self.classifier.boundary_score(prev, next))
    }

    fn is_strongly_equal(&self, offset1: usize, offset2: usize) -> bool {
        self.elements[offset1] == self.elements[offset2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq<'a>(lines: &[&str], range: Range, ws: bool, c: &'a CharClassifier) -> LinesSliceCharSequence<'a> {
        LinesSliceCharSequence::new(lines, range, ws, c)
    }

    #[test]
    fn test_whole_lines_with_whitespace() {
        let c = CharClassifier::default();
        let s = seq(&["  ab", "cd", "x"], Range::new(1, 1, 3, 1), true, &c);
        assert_eq!(s.text(), "  ab\ncd\n");
        assert_eq!(s.translate_offset(5, OffsetPreference::Right), Position::new(2, 1));
        assert_eq!(s.translate_offset(8, OffsetPreference::Right), Position::new(3, 1));
        assert_eq!(s.count_lines_in(OffsetRange::new(0, 6)), 1);
    }

    #[test]
    fn test_trimmed_lines_translate_back() {
        let c = CharClassifier::default();
        let s = seq(&["  ab  ", "\tcd"], Range::new(1, 1, 2, 4), false, &c);
        assert_eq!(s.text(), "ab\ncd");
        assert_eq!(s.translate_offset(0, OffsetPreference::Right), Position::new(1, 3));
        assert_eq!(s.translate_offset(0, OffsetPreference::Left), Position::new(1, 1));
        assert_eq!(s.translate_offset(4, OffsetPreference::Right), Position::new(2, 3));
        assert_eq!(s.translate_range(OffsetRange::new(3, 5)), Range::new(2, 2, 2, 4));
    }

    #[test]
    fn test_partial_first_and_last_line() {
        let c = CharClassifier::default();
        let s = seq(&["hello world", "foo bar"], Range::new(1, 7, 2, 4), true, &c);
        assert_eq!(s.text(), "world\nfoo");
        assert_eq!(s.translate_offset(0, OffsetPreference::Right), Position::new(1, 7));
        assert_eq!(s.translate_range(OffsetRange::new(6, 9)), Range::new(2, 1, 2, 4));
    }

    #[test]
    fn test_find_word_and_extend() {
        let c = CharClassifier::default();
        let s = seq(&["let foo_bar = 1;", "x"], Range::new(1, 1, 2, 2), true, &c);
        assert_eq!(s.find_word_containing(5), Some(OffsetRange::new(4, 7)));
        assert_eq!(s.find_word_containing(7), None);
        assert_eq!(s.extend_to_full_lines(OffsetRange::new(5, 6)), OffsetRange::new(0, 17));
        assert_eq!(s.extend_to_full_lines(OffsetRange::new(17, 18)), OffsetRange::new(17, 18));
    }

    #[test]
    fn test_boundary_score_uses_classifier() {
        let c = CharClassifier::default();
        let s = seq(&["a b"], Range::new(1, 1, 1, 4), true, &c);
        assert_eq!(s.boundary_score(0), Some(20));
        assert_eq!(s.boundary_score(1), Some(13));
    }
}
