//! RecordStore port - タスクの正本と同期 cursor の永続化

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{SyncCursor, Task, TaskId};
use crate::error::StoreError;

/// Read side of the task store plus the persisted synchronization cursor.
///
/// # Contract
/// - `tasks_by_ids` returns the subset of ids that still exist, in any order.
/// - `tasks_updated_after` returns tasks with `updated_at` strictly greater
///   than `after`, ascending by `updated_at`, at most `limit` of them.
/// - `load_cursor` returns [`SyncCursor::EPOCH`] when nothing was saved yet.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn tasks_by_ids(&self, ids: &[TaskId]) -> Result<Vec<Task>, StoreError>;

    async fn tasks_updated_after(
        &self,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Task>, StoreError>;

    async fn load_cursor(&self) -> Result<SyncCursor, StoreError>;

    async fn save_cursor(&self, cursor: SyncCursor) -> Result<(), StoreError>;
}
