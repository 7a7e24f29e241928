//! CursorScanner - cursor 方式の追いつきスキャン
//!
//! Notifications can be dropped (full queue, restart). The scanner pages
//! through every task updated after the persisted cursor so nothing is missed
//! for good.
//!
//! # 不変条件
//! - cursor は単調非減少（保存は前進するときだけ）
//! - cursor は索引付けに成功したタスクの `updated_at` までしか進まない
//! - 1 ページ内で `updated_at` が進まなければスキャンを打ち切る（無限ループ防止）

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, error};

use super::indexer::TaskIndexer;
use crate::domain::{SyncCursor, TaskId};
use crate::error::StoreError;
use crate::observability::PassReport;
use crate::ports::RecordStore;
use crate::queue::PendingSet;

/// Run a store call with an upper bound on its duration.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    time::timeout(limit, call)
        .await
        .unwrap_or(Err(StoreError::Timeout(limit)))
}

#[derive(Clone)]
pub struct CursorScanner {
    store: Arc<dyn RecordStore>,
    indexer: TaskIndexer,
    batch_size: usize,
    call_timeout: Duration,
}

impl CursorScanner {
    pub fn new(
        store: Arc<dyn RecordStore>,
        indexer: TaskIndexer,
        batch_size: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            indexer,
            batch_size: batch_size.max(1),
            call_timeout,
        }
    }

    /// Scan everything after the persisted cursor.
    ///
    /// Tasks in `processed` or already in `pending` are skipped. Successful
    /// tasks join `processed`; failed ones enter `pending` with one retry.
    pub async fn scan(
        &self,
        processed: &mut HashSet<TaskId>,
        pending: &mut PendingSet,
        report: &mut PassReport,
    ) {
        let loaded = match bounded(self.call_timeout, self.store.load_cursor()).await {
            Ok(cursor) => cursor,
            Err(e) => {
                error!(error = %e, "failed to load search cursor");
                return;
            }
        };

        let mut fetch_cursor = loaded.at();
        let mut indexed_up_to = loaded;

        loop {
            let page = match bounded(
                self.call_timeout,
                self.store.tasks_updated_after(fetch_cursor, self.batch_size),
            )
            .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(error = %e, after = %fetch_cursor, "failed to fetch tasks for indexing");
                    break;
                }
            };
            let Some(last_updated) = page.last().map(|task| task.updated_at) else {
                break;
            };
            report.pages += 1;

            for task in &page {
                if task.id.is_empty() {
                    continue;
                }
                if processed.contains(&task.id) || pending.contains(task.id.as_str()) {
                    report.scan_skipped += 1;
                    continue;
                }

                match self.indexer.index(task).await {
                    Ok(()) => {
                        processed.insert(task.id.clone());
                        indexed_up_to = indexed_up_to.advance_to(task.updated_at);
                        report.scan_indexed += 1;
                    }
                    Err(_) => {
                        pending.insert(task.id.clone(), 1);
                        report.scan_failed += 1;
                    }
                }
            }

            if last_updated <= fetch_cursor {
                debug!(after = %fetch_cursor, "scan page did not advance, stopping");
                break;
            }
            fetch_cursor = last_updated;

            if page.len() < self.batch_size {
                break;
            }
        }

        if indexed_up_to > loaded {
            self.save(indexed_up_to, report).await;
        }
    }

    async fn save(&self, cursor: SyncCursor, report: &mut PassReport) {
        match bounded(self.call_timeout, self.store.save_cursor(cursor)).await {
            Ok(()) => {
                debug!(cursor = %cursor, "search cursor advanced");
                report.cursor_saved = Some(cursor.at());
            }
            Err(e) => error!(error = %e, cursor = %cursor, "failed to save search cursor"),
        }
    }
}
