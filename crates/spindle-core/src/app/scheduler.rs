//! Scheduler - 検索インデックス同期のバックグラウンドループ
//!
//! # 設計
//! - ループは 1 つの tokio task が所有し、pending set もそこだけが触る（ロック不要）
//! - 共有されるのは bounded な通知キューだけ（満杯なら捨てる）
//! - `start` / `stop` はそれぞれ 1 回だけ効く
//! - 進行中のパスはキャンセルと競合させる（停止をブロックしない）

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::builder::SchedulerBuilder;
use super::indexer::TaskIndexer;
use super::reconcile::Reconciler;
use crate::config::SchedulerConfig;
use crate::domain::TaskId;
use crate::observability::PassReport;
use crate::ports::{IndexClient, RecordStore};
use crate::queue::{
    Delivery, NotificationReceiver, NotificationSender, PendingSet, RetryPolicy,
    notification_channel,
};

/// Scheduler handle.
/// - `notify_task_changed` はどのスレッドからでも、`start` 前でも呼べる
/// - `stop` は何度呼んでもよい（`start` 前でも可）
/// - `stop_and_join()` でループの終了を待てる
pub struct Scheduler {
    config: SchedulerConfig,
    index_timeout: Duration,
    store: Option<Arc<dyn RecordStore>>,
    client: Option<Arc<dyn IndexClient>>,

    sender: NotificationSender,
    receiver: Mutex<Option<NotificationReceiver>>,
    reports: Arc<watch::Sender<PassReport>>,

    started: AtomicBool,
    stopped: AtomicBool,
    shutdown: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    pub(crate) fn new(
        config: SchedulerConfig,
        index_timeout: Duration,
        store: Option<Arc<dyn RecordStore>>,
        client: Option<Arc<dyn IndexClient>>,
    ) -> Self {
        let (sender, receiver) = notification_channel(config.queue_capacity());
        let (reports, _) = watch::channel(PassReport::default());

        Self {
            config,
            index_timeout,
            store,
            client,
            sender,
            receiver: Mutex::new(Some(receiver)),
            reports: Arc::new(reports),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Both the record store and the index client are wired.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some() && self.client.is_some()
    }

    pub fn queue_capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Spawn the background loop under a child of `parent`.
    ///
    /// Returns `true` only for the call that actually started it. Must be
    /// called from within a tokio runtime.
    pub fn start(&self, parent: &CancellationToken) -> bool {
        let (Some(store), Some(client)) = (self.store.clone(), self.client.clone()) else {
            warn!("search scheduler not started: missing dependencies");
            return false;
        };
        // stop は恒久的: stop 後の start は起動しない
        if self.stopped.load(Ordering::Acquire) {
            debug!("search scheduler already stopped, not starting");
            return false;
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let Some(receiver) = lock(&self.receiver).take() else {
            return false;
        };

        let reconciler = Reconciler::new(
            store,
            TaskIndexer::new(client, self.index_timeout),
            self.config.batch_size(),
            RetryPolicy::new(self.config.max_retries()),
            self.config.call_timeout(),
        );
        let interval = self.config.interval();
        let signals = Signals {
            parent: parent.child_token(),
            shutdown: self.shutdown.clone(),
        };
        let reports = Arc::clone(&self.reports);

        info!(
            interval_ms = interval.as_millis() as u64,
            batch_size = self.config.batch_size(),
            max_retries = self.config.max_retries(),
            queue_capacity = self.sender.capacity(),
            "search scheduler started"
        );
        let join = tokio::spawn(async move {
            scheduler_loop(reconciler, receiver, interval, signals, reports).await;
        });
        *lock(&self.handle) = Some(join);
        true
    }

    /// Request the loop to stop. An in-flight pass is abandoned.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shutdown.cancel();
        debug!("search scheduler stop requested");
    }

    /// Stop and wait for the loop to return.
    pub async fn stop_and_join(&self) {
        self.stop();
        let Some(join) = lock(&self.handle).take() else {
            return;
        };
        if let Err(e) = join.await {
            warn!(error = %e, "search scheduler loop ended abnormally");
        }
    }

    /// Loop was spawned and has not returned yet.
    pub fn is_running(&self) -> bool {
        lock(&self.handle)
            .as_ref()
            .is_some_and(|join| !join.is_finished())
    }

    /// Record that a task changed. Never blocks; a full queue drops the id.
    pub fn notify_task_changed(&self, id: impl Into<TaskId>) -> Delivery {
        if self.client.is_none() {
            return Delivery::Ignored;
        }
        self.sender.notify(id.into())
    }

    /// Watch the report of the most recent pass.
    pub fn reports(&self) -> watch::Receiver<PassReport> {
        self.reports.subscribe()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Signals {
    parent: CancellationToken,
    shutdown: CancellationToken,
}

impl Signals {
    async fn cancelled(&self) {
        tokio::select! {
            _ = self.parent.cancelled() => {}
            _ = self.shutdown.cancelled() => {}
        }
    }
}

async fn scheduler_loop(
    reconciler: Reconciler,
    mut receiver: NotificationReceiver,
    interval: Duration,
    signals: Signals,
    reports: Arc<watch::Sender<PassReport>>,
) {
    // 最初のパスは start から 1 interval 後
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut pending = PendingSet::new();

    loop {
        tokio::select! {
            biased;
            _ = signals.cancelled() => break,
            _ = ticker.tick() => {
                receiver.drain_into(&mut pending);
                let current = std::mem::take(&mut pending);
                // パス中もキャンセルを優先（途中の結果は捨てる）
                tokio::select! {
                    biased;
                    _ = signals.cancelled() => break,
                    (next, report) = reconciler.run_pass(current) => {
                        pending = next;
                        reports.send_replace(report);
                    }
                }
            }
            Some(id) = receiver.recv() => pending.track(id),
        }
    }

    debug!(pending = pending.len(), "search scheduler loop stopped");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
