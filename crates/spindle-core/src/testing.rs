//! Test doubles for the ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{IndexDocument, TaskId};
use crate::error::IndexError;
use crate::ports::IndexClient;

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    Times(u32),
}

#[derive(Debug, Default)]
struct Script {
    failures: HashMap<TaskId, Failure>,
    calls: Vec<TaskId>,
    delay: Option<Duration>,
}

/// Index client that records every call and fails on request.
#[derive(Debug, Default)]
pub struct ScriptedIndexClient {
    script: Mutex<Script>,
}

impl ScriptedIndexClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_always(&self, id: &str) {
        self.lock().failures.insert(TaskId::from(id), Failure::Always);
    }

    /// Fail the next `n` calls for `id`, then succeed.
    pub fn fail_times(&self, id: &str, n: u32) {
        self.lock().failures.insert(TaskId::from(id), Failure::Times(n));
    }

    /// Sleep this long inside every call.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<TaskId> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == id).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }
}

#[async_trait]
impl IndexClient for ScriptedIndexClient {
    async fn index_task(&self, document: &IndexDocument) -> Result<(), IndexError> {
        let (delay, outcome) = {
            let mut script = self.lock();
            script.calls.push(document.task_id.clone());
            let outcome = match script.failures.get_mut(&document.task_id) {
                Some(Failure::Always) => Err(IndexError::Rejected("scripted failure".to_string())),
                Some(Failure::Times(n)) if *n > 0 => {
                    *n -= 1;
                    Err(IndexError::Rejected("scripted failure".to_string()))
                }
                _ => Ok(()),
            };
            (script.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
