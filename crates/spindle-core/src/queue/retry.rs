//! Retry policy: decides whether a failed id stays pending.

use crate::domain::Decision;

/// Retry policy for ids that failed to index.
///
/// Counting: an id tracked from a notification starts at 0. Each failed
/// attempt adds one. Once the count exceeds `max_retries` the id is given up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Judge a failure of an id that had already failed `retries` times.
    pub fn after_failure(&self, retries: u32) -> Decision {
        let retries = retries.saturating_add(1);
        if retries > self.max_retries {
            Decision::GiveUp { retries }
        } else {
            Decision::Retry { retries }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES)
    }
}
