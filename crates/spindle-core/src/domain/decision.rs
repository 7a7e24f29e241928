//! Decision model: what happens to a pending id after a failed attempt.

/// Outcome of a failed indexing attempt, as judged by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the id pending with the new retry count.
    Retry { retries: u32 },

    /// Retry budget exhausted; drop the id from pending.
    GiveUp { retries: u32 },
}

impl Decision {
    pub fn retries(&self) -> u32 {
        match self {
            Decision::Retry { retries } | Decision::GiveUp { retries } => *retries,
        }
    }
}
