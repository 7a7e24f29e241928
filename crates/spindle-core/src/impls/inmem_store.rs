//! InMemoryRecordStore - 開発用の record store
//!
//! # 実装詳細
//! - HashMap<TaskId, Task> を std の RwLock で保護（ロックを跨いで await しない）
//! - `upsert` は Clock で `updated_at` を打刻
//! - 障害注入（unavailable / cursor 保存失敗）でテストから失敗経路を再現できる

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{SyncCursor, Task, TaskId};
use crate::error::StoreError;
use crate::ports::{Clock, RecordStore, SystemClock};

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    cursor: Option<SyncCursor>,
    unavailable: bool,
    fail_cursor_saves: bool,
    cursor_saves: usize,
}

/// In-memory task table plus a single cursor row.
pub struct InMemoryRecordStore<C = SystemClock> {
    clock: C,
    state: RwLock<StoreState>,
}

impl InMemoryRecordStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryRecordStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryRecordStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert or replace a task, keeping its `updated_at` as given.
    pub fn insert(&self, task: Task) {
        self.write().tasks.insert(task.id.clone(), task);
    }

    /// Insert or replace a task, stamping `updated_at` with the store clock.
    /// Returns the stored copy.
    pub fn upsert(&self, mut task: Task) -> Task {
        let now = self.clock.now();
        let mut state = self.write();
        match state.tasks.get(&task.id) {
            Some(existing) => task.created_at = existing.created_at,
            None => task.created_at = now,
        }
        task.updated_at = now;
        state.tasks.insert(task.id.clone(), task.clone());
        task
    }

    pub fn remove(&self, id: &str) -> Option<Task> {
        self.write().tasks.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.read().tasks.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().tasks.is_empty()
    }

    /// The saved cursor, if any was ever saved.
    pub fn saved_cursor(&self) -> Option<SyncCursor> {
        self.read().cursor
    }

    /// How many times `save_cursor` succeeded.
    pub fn cursor_saves(&self) -> usize {
        self.read().cursor_saves
    }

    /// Overwrite the cursor row directly, bypassing `save_cursor`.
    pub fn seed_cursor(&self, cursor: SyncCursor) {
        self.write().cursor = Some(cursor);
    }

    /// Make every call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().unavailable = unavailable;
    }

    /// Make `save_cursor` fail while reads keep working.
    pub fn set_fail_cursor_saves(&self, fail: bool) {
        self.write().fail_cursor_saves = fail;
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn available(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        let state = self.read();
        if state.unavailable {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl<C: Clock> RecordStore for InMemoryRecordStore<C> {
    async fn tasks_by_ids(&self, ids: &[TaskId]) -> Result<Vec<Task>, StoreError> {
        let state = self.available()?;
        Ok(ids
            .iter()
            .filter(|id| !id.is_empty())
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    async fn tasks_updated_after(
        &self,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Task>, StoreError> {
        let state = self.available()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.updated_at > after)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then_with(|| a.id.cmp(&b.id)));
        if limit > 0 {
            tasks.truncate(limit);
        }
        Ok(tasks)
    }

    async fn load_cursor(&self) -> Result<SyncCursor, StoreError> {
        let state = self.available()?;
        Ok(state.cursor.unwrap_or_default())
    }

    async fn save_cursor(&self, cursor: SyncCursor) -> Result<(), StoreError> {
        let mut state = self.write();
        if state.unavailable || state.fail_cursor_saves {
            return Err(StoreError::Unavailable("cursor row is read-only".to_string()));
        }
        state.cursor = Some(cursor);
        state.cursor_saves += 1;
        Ok(())
    }
}
