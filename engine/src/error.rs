//! Error types for the diff engine.
//!
//! Well-formed inputs never produce an error. Every variant except
//! [`DiffError::Config`] signals a bug in the engine itself.

/// Errors raised by the diff engine.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// An offset range was built with `start > end_exclusive`.
    #[error("Invalid offset range: [{start}, {end_exclusive})")]
    InvalidRange {
        /// Requested start.
        start: usize,
        /// Requested exclusive end.
        end_exclusive: usize,
    },
    /// A line range was built with `start > end_exclusive`.
    #[error("Invalid line range: [{start}, {end_exclusive})")]
    InvalidLineRange {
        /// Requested start line number.
        start: usize,
        /// Requested exclusive end line number.
        end_exclusive: usize,
    },
    /// A post-computation check on the result failed.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    /// Settings could not be loaded.
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
}

impl DiffError {
    /// Returns `true` if this error indicates a bug in the engine rather than
    /// a problem with the environment.
    #[must_use]
    pub fn is_bug(&self) -> bool {
        match self {
            Self::InvalidRange { .. } | Self::InvalidLineRange { .. } => true,
            Self::InvariantViolation(_) => true,
            Self::Config(_) => false,
        }
    }
}
