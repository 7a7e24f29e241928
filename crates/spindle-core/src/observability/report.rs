use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Pending ids at the start of the pass.
    pub pending_before: usize,
    /// Pending ids that were indexed.
    pub retry_indexed: usize,
    /// Pending ids that failed again and stay pending.
    pub retry_failed: usize,
    /// Pending ids dropped after exhausting their retries.
    pub given_up: usize,
    /// Pending ids no longer present in the store.
    pub vanished: usize,
    /// Pages fetched by the catch-up scan.
    pub pages: usize,
    pub scan_indexed: usize,
    pub scan_failed: usize,
    pub scan_skipped: usize,
    /// New cursor, when the pass persisted one.
    pub cursor_saved: Option<DateTime<Utc>>,
    pub pending_after: usize,
}

impl PassReport {
    /// Number of calls made to the index client during the pass.
    pub fn index_calls(&self) -> usize {
        self.retry_indexed + self.retry_failed + self.given_up + self.scan_indexed + self.scan_failed
    }

    /// Nothing happened worth an info line.
    pub fn is_idle(&self) -> bool {
        self.index_calls() == 0 && self.vanished == 0 && self.cursor_saved.is_none()
    }
}
