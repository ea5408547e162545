// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded retry for resolutions attempted before the style has compiled.

/// Fixed-delay, bounded retry policy.
///
/// The first attempt runs immediately; each failed attempt schedules another
/// one `delay_ms` later until `max_retries` retries have run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RetryPolicy {
    /// Delay between attempts, in milliseconds.
    pub delay_ms: u64,
    /// Number of retries after the initial attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay_ms: 300,
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(delay_ms: u64, max_retries: u32) -> Self {
        Self {
            delay_ms,
            max_retries,
        }
    }

    /// Returns the delay before the next attempt, given how many retries have
    /// already run, or `None` when the budget is spent.
    #[must_use]
    pub const fn next_delay(&self, retries_done: u32) -> Option<u64> {
        if retries_done < self.max_retries {
            Some(self.delay_ms)
        } else {
            None
        }
    }

    /// Total time from the first attempt to the last retry.
    #[must_use]
    pub const fn budget_ms(&self) -> u64 {
        self.delay_ms * self.max_retries as u64
    }
}
