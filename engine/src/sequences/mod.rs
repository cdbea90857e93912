//! Views of documents as sequences of comparable elements.

mod char_class;
mod line_sequence;
mod slice_char_sequence;

pub use char_class::{CharCategory, CharClassifier};
pub use line_sequence::LineSequence;
pub use slice_char_sequence::{LinesSliceCharSequence, OffsetPreference};

/// A sequence the diff algorithms can align.
pub trait Sequence {
    /// Comparison key of the element at `offset`.
    fn element(&self, offset: usize) -> u32;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How natural it is to put a diff boundary before the element at
    /// `length`; higher is better. `None` if the sequence has no opinion.
    fn boundary_score(&self, _length: usize) -> Option<i32> {
        None
    }

    /// Exact equality of two elements of this sequence, beyond their keys.
    fn is_strongly_equal(&self, offset1: usize, offset2: usize) -> bool;
}
