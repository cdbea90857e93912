//! Cooperative time budgets.
//!
//! Hot loops poll [`Timeout::is_valid`] and return their best partial result
//! once the budget is exhausted. Nothing is preempted.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A time budget polled by the diff algorithms.
pub trait Timeout {
    /// Returns `false` once the budget is exhausted.
    fn is_valid(&self) -> bool;
}

/// A budget that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfiniteTimeout;

impl InfiniteTimeout {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl Timeout for InfiniteTimeout {
    fn is_valid(&self) -> bool {
        true
    }
}

/// A wall-clock budget. Once it has expired it stays expired.
#[derive(Debug)]
pub struct DateTimeout {
    start: Instant,
    budget: Duration,
    valid: Cell<bool>,
}

impl DateTimeout {
    /// Starts a budget of `budget` from now.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
            valid: Cell::new(true),
        }
    }

    /// Starts a budget of `ms` milliseconds from now.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Timeout for DateTimeout {
    fn is_valid(&self) -> bool {
        if self.valid.get() && self.start.elapsed() >= self.budget {
            self.valid.set(false);
            tracing::debug!(budget_ms = self.budget.as_millis(), "diff time budget exhausted");
        }
        self.valid.get()
    }
}

/// Returns the budget for `max_ms` milliseconds, where `0` means unbounded.
#[must_use]
pub fn timeout_for(max_ms: u64) -> Box<dyn Timeout> {
    if max_ms == 0 {
        Box::new(InfiniteTimeout)
    } else {
        Box::new(DateTimeout::from_millis(max_ms))
    }
}

/// A budget that expires after a fixed number of polls. Used by tests to make
/// timeouts deterministic.
#[derive(Debug)]
pub struct CountingTimeout {
    remaining: Cell<usize>,
}

impl CountingTimeout {
    /// Allows `polls` successful polls.
    #[must_use]
    pub fn new(polls: usize) -> Self {
        Self {
            remaining: Cell::new(polls),
        }
    }
}

impl Timeout for CountingTimeout {
    fn is_valid(&self) -> bool {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return false;
        }
        self.remaining.set(remaining - 1);
        true
    }
}
