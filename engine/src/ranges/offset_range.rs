//! Half-open `[start, end_exclusive)` offset intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DiffError;

/// A half-open interval of offsets. `start <= end_exclusive` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOffsetRange")]
pub struct OffsetRange {
    start: usize,
    end_exclusive: usize,
}

/// Wire form of [`OffsetRange`], checked on the way in.
#[derive(Deserialize)]
struct RawOffsetRange {
    start: usize,
    end_exclusive: usize,
}

impl TryFrom<RawOffsetRange> for OffsetRange {
    type Error = DiffError;

    fn try_from(raw: RawOffsetRange) -> Result<Self, Self::Error> {
        Self::try_new(raw.start, raw.end_exclusive)
    }
}

impl OffsetRange {
    /// Creates a range.
    ///
    /// # Panics
    ///
    /// Panics if `start > end_exclusive`; that only happens through a bug in
    /// the caller. Use [`OffsetRange::try_new`] for untrusted input.
    #[must_use]
    pub fn new(start: usize, end_exclusive: usize) -> Self {
        match Self::try_new(start, end_exclusive) {
            Ok(range) => range,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a range, rejecting `start > end_exclusive`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidRange`] if the bounds are reversed.
    pub fn try_new(start: usize, end_exclusive: usize) -> Result<Self, DiffError> {
        if start > end_exclusive {
            return Err(DiffError::InvalidRange {
                start,
                end_exclusive,
            });
        }
        Ok(Self {
            start,
            end_exclusive,
        })
    }

    /// `[0, length)`.
    #[must_use]
    pub const fn of_length(length: usize) -> Self {
        Self {
            start: 0,
            end_exclusive: length,
        }
    }

    /// `[start, start + length)`.
    #[must_use]
    pub const fn of_start_and_length(start: usize, length: usize) -> Self {
        Self {
            start,
            end_exclusive: start + length,
        }
    }

    /// Inclusive start.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end.
    #[must_use]
    pub const fn end_exclusive(&self) -> usize {
        self.end_exclusive
    }

    /// Returns `true` if the range holds no offset.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end_exclusive
    }

    /// Number of offsets in the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    /// Shifts both bounds.
    ///
    /// # Panics
    ///
    /// Panics if `offset` moves the start below zero. Use
    /// [`OffsetRange::delta_clamped`] to stop at zero instead.
    #[must_use]
    pub const fn delta(&self, offset: isize) -> Self {
        Self {
            start: super::shift(self.start, offset),
            end_exclusive: super::shift(self.end_exclusive, offset),
        }
    }

    /// Shifts both bounds, stopping at zero. The length shrinks when the
    /// start would go negative.
    #[must_use]
    pub const fn delta_clamped(&self, offset: isize) -> Self {
        Self {
            start: self.start.saturating_add_signed(offset),
            end_exclusive: self.end_exclusive.saturating_add_signed(offset),
        }
    }

    /// Shifts the start only, never past the end.
    #[must_use]
    pub fn delta_start(&self, offset: isize) -> Self {
        Self::new(
            self.start.saturating_add_signed(offset).min(self.end_exclusive),
            self.end_exclusive,
        )
    }

    /// Shifts the end only, never before the start.
    #[must_use]
    pub fn delta_end(&self, offset: isize) -> Self {
        Self::new(
            self.start,
            self.end_exclusive.saturating_add_signed(offset).max(self.start),
        )
    }

    /// Returns `true` if `offset` lies inside the range.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end_exclusive
    }

    /// Returns `true` if `other` lies inside the range.
    #[must_use]
    pub const fn contains_range(&self, other: &Self) -> bool {
        self.start <= other.start && other.end_exclusive <= self.end_exclusive
    }

    /// Smallest range containing both, even if they are disjoint.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self::new(
            self.start.min(other.start),
            self.end_exclusive.max(other.end_exclusive),
        )
    }

    /// Common part, `None` if the ranges neither overlap nor touch.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end_exclusive.min(other.end_exclusive);
        (start <= end).then(|| Self::new(start, end))
    }

    /// Returns `true` if the ranges share at least one offset.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.start.max(other.start) < self.end_exclusive.min(other.end_exclusive)
    }

    /// Returns `true` if the ranges share an offset or touch.
    #[must_use]
    pub fn intersects_or_touches(&self, other: &Self) -> bool {
        self.start.max(other.start) <= self.end_exclusive.min(other.end_exclusive)
    }

    /// Returns `true` if the range ends at or before `other` starts.
    #[must_use]
    pub const fn is_before(&self, other: &Self) -> bool {
        self.end_exclusive <= other.start
    }

    /// Returns `true` if the range starts at or after `other` ends.
    #[must_use]
    pub const fn is_after(&self, other: &Self) -> bool {
        self.start >= other.end_exclusive
    }

    /// The part of `items` covered by the range.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start..self.end_exclusive]
    }

    /// Clamps `value` into the range.
    ///
    /// # Panics
    ///
    /// Panics on an empty range.
    #[must_use]
    pub fn clip(&self, value: usize) -> usize {
        assert!(!self.is_empty(), "cannot clip into empty range {self}");
        value.clamp(self.start, self.end_exclusive - 1)
    }

    /// Iterates over the offsets.
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end_exclusive
    }

    /// Inserts `range` into `sorted_ranges`, merging it with every range it
    /// touches.
    pub fn add_range(range: Self, sorted_ranges: &mut Vec<Self>) {
        let mut i = 0;
        while i < sorted_ranges.len() && sorted_ranges[i].end_exclusive < range.start {
            i += 1;
        }
        let mut j = i;
        while j < sorted_ranges.len() && sorted_ranges[j].start <= range.end_exclusive {
            j += 1;
        }
        if i == j {
            sorted_ranges.insert(i, range);
        } else {
            let start = range.start.min(sorted_ranges[i].start);
            let end = range.end_exclusive.max(sorted_ranges[j - 1].end_exclusive);
            sorted_ranges.splice(i..j, [Self::new(start, end)]);
        }
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end_exclusive)
    }
}
