use std::time::Duration;

use crate::types::{MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY};

/// Bounded-attempt, flat-delay recovery budget.
///
/// Deliberately simple: the delay is constant, with no backoff. The budget
/// resets whenever a connection is successfully established, so transient
/// blips never accumulate toward the limit.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    attempts: u32,
    max_attempts: u32,
    delay: Duration,
}

impl RetryBudget {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            delay,
        }
    }

    /// True once every permitted attempt has been consumed; no further
    /// retries may be scheduled.
    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Consumes one attempt and returns the delay to wait before it.
    ///
    /// Callers must check [`exhausted`](Self::exhausted) first; `attempts`
    /// never exceeds `max_attempts`.
    pub fn record_attempt(&mut self) -> Duration {
        debug_assert!(!self.exhausted());
        self.attempts = (self.attempts + 1).min(self.max_attempts);
        self.delay
    }

    /// Clears the attempt counter (successful connection, or a fresh
    /// explicit `connect()`).
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(
            MAX_RECONNECT_ATTEMPTS,
            Duration::from_millis(RECONNECT_DELAY),
        )
    }
}
