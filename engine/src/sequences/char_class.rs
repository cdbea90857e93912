//! Character categories and the boundary scores derived from them.

use serde::{Deserialize, Serialize};

/// Category of a character for boundary scoring. `End` stands for the
/// position before the first or after the last element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharCategory {
    /// `a-z`.
    WordLower,
    /// `A-Z`.
    WordUpper,
    /// `0-9`.
    WordNumber,
    /// Outside the sequence.
    End,
    /// Anything not listed.
    Other,
    /// `,` and `;`.
    Separator,
    /// Space and tab.
    Space,
    /// `\r`.
    LineBreakCr,
    /// `\n`.
    LineBreakLf,
}

impl CharCategory {
    /// Category of `c`, `None` meaning outside the sequence.
    #[must_use]
    pub const fn of(c: Option<char>) -> Self {
        match c {
            None => Self::End,
            Some('\n') => Self::LineBreakLf,
            Some('\r') => Self::LineBreakCr,
            Some(' ' | '\t') => Self::Space,
            Some('a'..='z') => Self::WordLower,
            Some('A'..='Z') => Self::WordUpper,
            Some('0'..='9') => Self::WordNumber,
            Some(',' | ';') => Self::Separator,
            Some(_) => Self::Other,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Scores diff boundaries between characters. Passed by reference into the
/// character sequences; [`CharClassifier::default`] holds the standard
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharClassifier {
    category_scores: [i32; 9],
    category_change: i32,
    lower_to_upper: i32,
    after_line_feed: i32,
}

impl Default for CharClassifier {
    fn default() -> Self {
        let mut category_scores = [0; 9];
        category_scores[CharCategory::End.index()] = 10;
        category_scores[CharCategory::Other.index()] = 2;
        category_scores[CharCategory::Separator.index()] = 30;
        category_scores[CharCategory::Space.index()] = 3;
        category_scores[CharCategory::LineBreakCr.index()] = 10;
        category_scores[CharCategory::LineBreakLf.index()] = 10;
        Self {
            category_scores,
            category_change: 10,
            lower_to_upper: 1,
            after_line_feed: 150,
        }
    }
}

impl CharClassifier {
    /// Score of a single category.
    #[must_use]
    pub const fn category_score(&self, category: CharCategory) -> i32 {
        self.category_scores[category.index()]
    }

    /// Score of a boundary between `prev` and `next`.
    #[must_use]
    pub fn boundary_score(&self, prev: Option<char>, next: Option<char>) -> i32 {
        let prev = CharCategory::of(prev);
        let next = CharCategory::of(next);
        if prev == CharCategory::LineBreakCr && next == CharCategory::LineBreakLf {
            // Never split a CRLF.
            return 0;
        }
        if prev == CharCategory::LineBreakLf {
            return self.after_line_feed;
        }
        let mut score = 0;
        if prev != next {
            score += self.category_change;
            if prev == CharCategory::WordLower && next == CharCategory::WordUpper {
                score += self.lower_to_upper;
            }
        }
        score + self.category_score(prev) + self.category_score(next)
    }

    /// ASCII letters and digits.
    #[must_use]
    pub const fn is_word_char(c: char) -> bool {
        c.is_ascii_alphanumeric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(CharCategory::of(Some('q')), CharCategory::WordLower);
        assert_eq!(CharCategory::of(Some('Q')), CharCategory::WordUpper);
        assert_eq!(CharCategory::of(Some('7')), CharCategory::WordNumber);
        assert_eq!(CharCategory::of(Some(';')), CharCategory::Separator);
        assert_eq!(CharCategory::of(Some('\t')), CharCategory::Space);
        assert_eq!(CharCategory::of(Some('é')), CharCategory::Other);
        assert_eq!(CharCategory::of(None), CharCategory::End);
    }

    #[test]
    fn test_boundary_scores() {
        let c = CharClassifier::default();
        assert_eq!(c.boundary_score(Some('\r'), Some('\n')), 0);
        assert_eq!(c.boundary_score(Some('\n'), Some('a')), 150);
        assert_eq!(c.boundary_score(Some('a'), Some('b')), 0);
        assert_eq!(c.boundary_score(Some('a'), Some('B')), 11);
        assert_eq!(c.boundary_score(Some('a'), Some(' ')), 13);
        assert_eq!(c.boundary_score(Some(','), Some(' ')), 43);
        assert_eq!(c.boundary_score(None, Some('x')), 20);
    }
}
