//! TaskIndexer - 1 タスクの索引付け
//!
//! Projection to [`IndexDocument`] plus one bounded call to the index client.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::error;

use crate::domain::{IndexDocument, Task};
use crate::error::IndexError;
use crate::ports::IndexClient;

#[derive(Clone)]
pub struct TaskIndexer {
    client: Arc<dyn IndexClient>,
    timeout: Duration,
}

impl TaskIndexer {
    pub fn new(client: Arc<dyn IndexClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Index one task. Every failure is logged here with the task id, so
    /// callers only need to count it.
    pub async fn index(&self, task: &Task) -> Result<(), IndexError> {
        let document = IndexDocument::from_task(task);
        let result = match time::timeout(self.timeout, self.client.index_task(&document)).await {
            Ok(result) => result,
            Err(_) => Err(IndexError::Timeout(self.timeout)),
        };

        if let Err(e) = &result {
            error!(task_id = %task.id, error = %e, "failed to index task in search");
        }
        result
    }
}
