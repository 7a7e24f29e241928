//! Pending retry set: task ids awaiting (re-)indexing with their retry counters.

use std::collections::HashMap;

use crate::domain::TaskId;

/// In-memory working set owned by the scheduler loop.
///
/// Design:
/// - Not persisted. Anything lost on restart is rediscovered by the catch-up
///   scan as long as its `updated_at` is after the saved cursor.
/// - Owned by exactly one task, so no locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSet {
    entries: HashMap<TaskId, u32>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `id` with retry count 0. An existing entry keeps its count.
    pub fn track(&mut self, id: TaskId) {
        if id.is_empty() {
            return;
        }
        self.entries.entry(id).or_insert(0);
    }

    /// Set the retry count for `id`, overwriting any previous value.
    pub fn insert(&mut self, id: TaskId, retries: u32) {
        self.entries.insert(id, retries);
    }

    pub fn remove(&mut self, id: &str) -> Option<u32> {
        self.entries.remove(id)
    }

    pub fn retries(&self, id: &str) -> Option<u32> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the tracked ids, sorted for stable store lookups and logs.
    pub fn ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl FromIterator<(TaskId, u32)> for PendingSet {
    fn from_iter<I: IntoIterator<Item = (TaskId, u32)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
