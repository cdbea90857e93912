//! Coordinate types shared by every stage of the engine.
//!
//! [`OffsetRange`] is 0-based and indexes sequence elements; [`LineRange`]
//! and [`Position`] are 1-based and address documents.

mod line_range;
mod line_range_set;
mod offset_range;
mod position;

pub use line_range::LineRange;
pub use line_range_set::LineRangeSet;
pub use offset_range::OffsetRange;
pub use position::{Position, Range};

/// Adds a signed shift to an offset.
///
/// # Panics
///
/// Panics if the result leaves the `usize` range; callers only shift by
/// amounts their own ranges allow.
pub(crate) const fn shift(value: usize, offset: isize) -> usize {
    match value.checked_add_signed(offset) {
        Some(shifted) => shifted,
        None => panic!("offset shifted out of range"),
    }
}
