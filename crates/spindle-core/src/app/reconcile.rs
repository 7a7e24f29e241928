//! Reconciler - 1 回分の同期パス
//!
//! # フロー
//! 1. Phase A: pending の id をまとめて store から引き、1 件ずつ索引付け
//!    （成功 → 除去、失敗 → retry +1、上限超過 → 破棄）
//! 2. Phase B: [`CursorScanner`] で cursor 以降を追いつきスキャン
//!
//! The pass never fails as a whole. Every error is logged and folded into the
//! returned pending set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument};

use super::indexer::TaskIndexer;
use super::scanner::{CursorScanner, bounded};
use crate::domain::{Decision, Task, TaskId};
use crate::observability::PassReport;
use crate::ports::RecordStore;
use crate::queue::{PendingSet, RetryPolicy};

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
    indexer: TaskIndexer,
    scanner: CursorScanner,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        indexer: TaskIndexer,
        batch_size: usize,
        policy: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        let scanner = CursorScanner::new(store.clone(), indexer.clone(), batch_size, call_timeout);
        Self {
            store,
            indexer,
            scanner,
            policy,
            call_timeout,
        }
    }

    /// Run one pass over `pending` and return the next pending set.
    #[instrument(name = "search_sync_pass", skip_all, fields(pending = pending.len()))]
    pub async fn run_pass(&self, pending: PendingSet) -> (PendingSet, PassReport) {
        let mut report = PassReport {
            pending_before: pending.len(),
            ..Default::default()
        };
        let mut next = pending.clone();
        let mut processed = HashSet::new();

        if !pending.is_empty() {
            let ids = pending.ids();
            let found = match bounded(self.call_timeout, self.store.tasks_by_ids(&ids)).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    error!(error = %e, "failed to fetch pending tasks for indexing");
                    report.pending_after = next.len();
                    return (next, report);
                }
            };
            let by_id: HashMap<TaskId, Task> = found
                .into_iter()
                .filter(|task| !task.id.is_empty())
                .map(|task| (task.id.clone(), task))
                .collect();

            for id in ids {
                let Some(task) = by_id.get(&id) else {
                    next.remove(id.as_str());
                    report.vanished += 1;
                    continue;
                };

                if self.indexer.index(task).await.is_ok() {
                    next.remove(id.as_str());
                    report.retry_indexed += 1;
                    processed.insert(id);
                    continue;
                }

                let decision = self
                    .policy
                    .after_failure(pending.retries(id.as_str()).unwrap_or(0));
                match decision {
                    Decision::Retry { .. } => {
                        next.insert(id, decision.retries());
                        report.retry_failed += 1;
                    }
                    Decision::GiveUp { .. } => {
                        error!(
                            task_id = %id,
                            retries = decision.retries(),
                            "max retries exceeded when indexing task"
                        );
                        next.remove(id.as_str());
                        report.given_up += 1;
                    }
                }
            }
        }

        self.scanner.scan(&mut processed, &mut next, &mut report).await;

        report.pending_after = next.len();
        if !report.is_idle() {
            info!(
                indexed = report.retry_indexed + report.scan_indexed,
                failed = report.retry_failed + report.scan_failed,
                given_up = report.given_up,
                vanished = report.vanished,
                pending = report.pending_after,
                cursor = ?report.cursor_saved,
                "search sync pass finished"
            );
        }
        (next, report)
    }
}
