//! linediff - line and character level text diffing.
//!
//! The engine compares two versions of a text given as line arrays and
//! reports the changed line ranges, the character edits inside each of them
//! and blocks of lines that moved. Two pipelines are available:
//!
//! 1. [`DefaultLinesDiffComputer`]: line alignment (dynamic programming or
//!    Myers), heuristic clean-up, per-hunk character refinement and move
//!    detection.
//! 2. [`LegacyLinesDiffComputer`]: an LCS based pipeline with its own
//!    prettification pass.
//!
//! Both implement [`LinesDiffComputer`] and are bounded by a cooperative
//! [`Timeout`].

#![warn(clippy::pedantic)]

/// Half-open offset and line intervals, positions and ranges.
pub mod ranges;
/// Results expressed in document coordinates.
pub mod mapping;
/// The sequence diff algorithms.
pub mod algorithms;
/// Sequence views over lines and characters.
pub mod sequences;
/// Post-processing passes over raw alignments.
pub mod heuristics;
/// The modern end-to-end pipeline.
pub mod default_computer;
/// The LCS based pipeline.
pub mod legacy;
/// Re-applying a computed diff.
pub mod apply;
/// Options, tuning constants and settings loading.
pub mod config;
/// Error types.
pub mod error;
/// Cooperative time budgets.
pub mod timeout;
/// Logging setup.
pub mod telemetry;

mod computer;
mod util;

pub use computer::{LinesDiffComputer, LinesDiffOptions};
pub use config::{DiffSettings, DiffTuning};
pub use default_computer::DefaultLinesDiffComputer;
pub use error::DiffError;
pub use legacy::LegacyLinesDiffComputer;
pub use mapping::{DetailedLineRangeMapping, LineRangeMapping, LinesDiff, MovedText, RangeMapping};
pub use ranges::{LineRange, LineRangeSet, OffsetRange, Position, Range};
pub use timeout::{DateTimeout, InfiniteTimeout, Timeout};
