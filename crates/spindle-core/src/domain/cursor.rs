//! Synchronization cursor: the persisted indexing watermark.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// "Every task updated at or before this instant has been indexed at least once."
///
/// The store persists exactly one of these. It only ever moves forward; see
/// [`SyncCursor::advance_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncCursor(DateTime<Utc>);

impl SyncCursor {
    /// The value used when nothing has been saved yet.
    pub const EPOCH: SyncCursor = SyncCursor(DateTime::<Utc>::UNIX_EPOCH);

    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the later of the two positions.
    pub fn advance_to(self, candidate: DateTime<Utc>) -> Self {
        if candidate > self.0 {
            Self(candidate)
        } else {
            self
        }
    }
}

impl Default for SyncCursor {
    fn default() -> Self {
        Self::EPOCH
    }
}

impl From<DateTime<Utc>> for SyncCursor {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn default_is_epoch() {
        assert_eq!(SyncCursor::default().at().timestamp(), 0);
    }

    #[test]
    fn advance_never_moves_backwards() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let cursor = SyncCursor::new(t0);

        assert_eq!(cursor.advance_to(t0 - Duration::seconds(5)), cursor);
        assert_eq!(cursor.advance_to(t0), cursor);
        assert_eq!(
            cursor.advance_to(t0 + Duration::seconds(1)).at(),
            t0 + Duration::seconds(1)
        );
    }
}
