//! The entry point shared by both pipelines.

use serde::{Deserialize, Serialize};

use crate::error::DiffError;
use crate::mapping::LinesDiff;

/// Options of a single diff computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesDiffOptions {
    /// Treat lines differing only in leading/trailing whitespace as equal.
    #[serde(default = "default_true")]
    pub ignore_trim_whitespace: bool,
    /// Time budget in milliseconds, `0` for none.
    #[serde(default = "default_max_computation_time_ms")]
    pub max_computation_time_ms: u64,
    /// Run move detection.
    #[serde(default)]
    pub compute_moves: bool,
}

const fn default_true() -> bool {
    true
}

const fn default_max_computation_time_ms() -> u64 {
    5000
}

impl Default for LinesDiffOptions {
    fn default() -> Self {
        Self {
            ignore_trim_whitespace: default_true(),
            max_computation_time_ms: default_max_computation_time_ms(),
            compute_moves: false,
        }
    }
}

/// Computes the diff of two documents given as lines.
pub trait LinesDiffComputer {
    /// Diffs `original` against `modified`.
    ///
    /// # Errors
    ///
    /// Only returns an error when an internal consistency check fails,
    /// which indicates a bug. Running out of time is reported through
    /// [`LinesDiff::hit_timeout`].
    fn compute_diff(
        &self,
        original: &[&str],
        modified: &[&str],
        options: &LinesDiffOptions,
    ) -> Result<LinesDiff, DiffError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = LinesDiffOptions::default();
        assert!(options.ignore_trim_whitespace);
        assert_eq!(options.max_computation_time_ms, 5000);
        assert!(!options.compute_moves);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: LinesDiffOptions = serde_json::from_str(r#"{"compute_moves": true}"#).unwrap();
        assert!(options.compute_moves);
        assert!(options.ignore_trim_whitespace);
        assert_eq!(options.max_computation_time_ms, 5000);
    }
}
