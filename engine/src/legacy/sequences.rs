//! Line and character sequences of the LCS pipeline.

use std::collections::HashMap;

use super::lcs::LcsSequence;

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Column of the first non-blank character, or `1` for a blank line.
pub(crate) fn first_non_blank_column(line: &str) -> usize {
    line.chars().position(|c| !is_blank(c)).map_or(1, |i| i + 1)
}

/// Column after the last non-blank character, or `1` for a blank line.
pub(crate) fn last_non_blank_column(line: &str) -> usize {
    let len = line.chars().count();
    line.chars()
        .rev()
        .position(|c| !is_blank(c))
        .map_or(1, |from_end| len - from_end + 1)
}

/// Lines keyed by their text without surrounding spaces and tabs.
#[derive(Debug, Clone)]
pub struct LineSequence<'a> {
    lines: &'a [&'a str],
    keys: Vec<u32>,
    trimmed: Vec<&'a str>,
    start_columns: Vec<usize>,
    end_columns: Vec<usize>,
}

impl<'a> LineSequence<'a> {
    /// Builds both sequences of a diff with shared keys.
    #[must_use]
    pub fn pair(original: &'a [&'a str], modified: &'a [&'a str]) -> (Self, Self) {
        let mut interner: HashMap<&'a str, u32> = HashMap::new();
        let original = Self::build(original, &mut interner);
        let modified = Self::build(modified, &mut interner);
        (original, modified)
    }

    fn build(lines: &'a [&'a str], interner: &mut HashMap<&'a str, u32>) -> Self {
        let trimmed: Vec<&'a str> = lines.iter().map(|l| l.trim_matches(is_blank)).collect();
        let keys = trimmed
            .iter()
            .map(|&t| {
                let next = interner.len() as u32;
                *interner.entry(t).or_insert(next)
            })
            .collect();
        Self {
            lines,
            keys,
            trimmed,
            start_columns: lines.iter().map(|l| first_non_blank_column(l)).collect(),
            end_columns: lines.iter().map(|l| last_non_blank_column(l)).collect(),
        }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The characters of lines `start_index..=end_index`. Surrounding
    /// blanks are skipped when `ignore_trim_whitespace` is set; otherwise
    /// the lines are joined with `\n`.
    #[must_use]
    pub fn create_char_sequence(&self, ignore_trim_whitespace: bool, start_index: usize, end_index: usize) -> CharSequence {
        let mut sequence = CharSequence::default();
        for index in start_index..=end_index {
            let line: Vec<char> = self.lines[index].chars().collect();
            let (start_column, end_column) = if ignore_trim_whitespace {
                (self.start_columns[index], self.end_columns[index])
            } else {
                (1, line.len() + 1)
            };
            for column in start_column..end_column {
                sequence.push(line[column - 1], index + 1, column);
            }
            if !ignore_trim_whitespace && index < end_index {
                sequence.push('\n', index + 1, line.len() + 1);
            }
        }
        sequence
    }
}

impl LcsSequence for LineSequence<'_> {
    fn keys(&self) -> &[u32] {
        &self.keys
    }

    fn has_text(&self) -> bool {
        true
    }

    fn text(&self, index: usize) -> Option<&str> {
        self.trimmed.get(index).copied()
    }

    fn strict_text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).copied()
    }
}

/// Characters of a line range with the position each one came from.
#[derive(Debug, Clone, Default)]
pub struct CharSequence {
    chars: Vec<char>,
    keys: Vec<u32>,
    line_numbers: Vec<usize>,
    columns: Vec<usize>,
}

impl CharSequence {
    fn push(&mut self, c: char, line_number: usize, column: usize) {
        self.chars.push(c);
        self.keys.push(u32::from(c));
        self.line_numbers.push(line_number);
        self.columns.push(column);
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if there are no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Line of the character at `index`; one past the end maps to the end of
    /// the last character.
    #[must_use]
    pub fn start_line_number(&self, index: usize) -> usize {
        if index > 0 && index == self.line_numbers.len() {
            return self.end_line_number(index - 1);
        }
        self.line_numbers[index]
    }

    /// Line after the character at `index`.
    #[must_use]
    pub fn end_line_number(&self, index: usize) -> usize {
        if self.chars[index] == '\n' {
            self.line_numbers[index] + 1
        } else {
            self.line_numbers[index]
        }
    }

    /// Column of the character at `index`.
    #[must_use]
    pub fn start_column(&self, index: usize) -> usize {
        if index > 0 && index == self.columns.len() {
            return self.end_column(index - 1);
        }
        self.columns[index]
    }

    /// Column after the character at `index`.
    #[must_use]
    pub fn end_column(&self, index: usize) -> usize {
        if self.chars[index] == '\n' { 1 } else { self.columns[index] + 1 }
    }
}

impl LcsSequence for CharSequence {
    fn keys(&self) -> &[u32] {
        &self.keys
    }
}
