use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use spindle_core::domain::{IndexDocument, SyncCursor, Task};
use spindle_core::error::IndexError;
use spindle_core::impls::InMemoryRecordStore;
use spindle_core::ports::{FixedClock, IndexClient};
use spindle_core::queue::Delivery;
use spindle_core::{Scheduler, SchedulerConfig};

const INTERVAL: Duration = Duration::from_secs(10);

/// Records documents; fails an id while its failure budget lasts.
#[derive(Default)]
struct FlakyIndex {
    budget: Mutex<HashMap<String, u32>>,
    seen: Mutex<Vec<IndexDocument>>,
}

impl FlakyIndex {
    fn failing(id: &str, times: u32) -> Self {
        let index = Self::default();
        index.budget.lock().unwrap().insert(id.to_string(), times);
        index
    }

    fn calls_for(&self, id: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.task_id.as_str() == id)
            .count()
    }

    fn total(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl IndexClient for FlakyIndex {
    async fn index_task(&self, document: &IndexDocument) -> Result<(), IndexError> {
        self.seen.lock().unwrap().push(document.clone());
        let mut budget = self.budget.lock().unwrap();
        match budget.get_mut(document.task_id.as_str()) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(IndexError::UnexpectedStatus(503))
            }
            _ => Ok(()),
        }
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
}

fn scheduler(store: Arc<InMemoryRecordStore<FixedClock>>, index: Arc<FlakyIndex>, max_retries: i64) -> Scheduler {
    Scheduler::builder()
        .config(SchedulerConfig {
            interval_ms: INTERVAL.as_millis() as i64,
            max_retries,
            ..Default::default()
        })
        .store(store)
        .client(index)
        .build()
}

/// Start, then park half an interval out of phase with the ticker.
async fn start(s: &Scheduler) {
    assert!(s.start(&CancellationToken::new()));
    tokio::time::sleep(INTERVAL / 2).await;
}

/// Sleep until `n` more passes have run.
async fn passes(n: u32) {
    tokio::time::sleep(INTERVAL * n).await;
}

#[tokio::test(start_paused = true)]
async fn notified_and_missed_tasks_both_reach_the_index() {
    let store = Arc::new(InMemoryRecordStore::with_clock(FixedClock::new(t0())));
    let index = Arc::new(FlakyIndex::default());
    let s = scheduler(store.clone(), index.clone(), 3);
    start(&s).await;

    store.upsert(Task::new("a", "Task A", t0()));
    s.notify_task_changed("a");
    // "b" changes without a notification; only the scan can find it.
    store.clock().advance(ChronoDuration::seconds(2));
    store.upsert(Task::new("b", "Task B", t0()));

    passes(1).await;

    assert_eq!(index.calls_for("a"), 1);
    assert_eq!(index.calls_for("b"), 1);
    assert_eq!(store.saved_cursor(), Some(SyncCursor::new(t0() + ChronoDuration::seconds(2))));
    assert_eq!(s.reports().borrow().pending_after, 0);

    s.stop_and_join().await;
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_drop_the_task() {
    let store = Arc::new(InMemoryRecordStore::with_clock(FixedClock::new(t0())));
    store.seed_cursor(SyncCursor::new(t0() + ChronoDuration::hours(1)));
    let index = Arc::new(FlakyIndex::failing("c", 10));
    let s = scheduler(store.clone(), index.clone(), 2);
    start(&s).await;

    store.upsert(Task::new("c", "Task C", t0()));
    s.notify_task_changed("c");

    passes(3).await;
    assert_eq!(index.calls_for("c"), 3);
    assert_eq!(s.reports().borrow().given_up, 1);

    // Cursor is past "c", so nothing brings it back.
    passes(3).await;
    assert_eq!(index.calls_for("c"), 3);

    s.stop_and_join().await;
}

#[tokio::test(start_paused = true)]
async fn idle_store_causes_no_new_calls_and_cursor_only_moves_forward() {
    let store = Arc::new(InMemoryRecordStore::with_clock(FixedClock::new(t0())));
    let index = Arc::new(FlakyIndex::default());
    for id in ["a", "b", "c"] {
        store.clock().advance(ChronoDuration::seconds(1));
        store.upsert(Task::new(id, id, t0()));
    }
    let s = scheduler(store.clone(), index.clone(), 3);
    start(&s).await;

    passes(1).await;
    let after_first = store.saved_cursor();
    let calls = index.total();
    assert_eq!(calls, 3);

    passes(2).await;
    assert_eq!(index.total(), calls);
    assert_eq!(store.saved_cursor(), after_first);
    assert_eq!(store.cursor_saves(), 1);

    store.clock().advance(ChronoDuration::seconds(5));
    store.upsert(Task::new("d", "d", t0()));
    passes(1).await;
    assert!(store.saved_cursor() > after_first);

    s.stop_and_join().await;
}

#[tokio::test(start_paused = true)]
async fn task_deleted_while_pending_is_dropped() {
    let store = Arc::new(InMemoryRecordStore::with_clock(FixedClock::new(t0())));
    store.seed_cursor(SyncCursor::new(t0() + ChronoDuration::hours(1)));
    let index = Arc::new(FlakyIndex::failing("gone", 1));
    let s = scheduler(store.clone(), index.clone(), 3);
    start(&s).await;

    store.upsert(Task::new("gone", "Soon deleted", t0()));
    s.notify_task_changed("gone");
    passes(1).await;
    assert_eq!(s.reports().borrow().pending_after, 1);

    assert!(store.remove("gone").is_some());
    passes(1).await;
    let report = s.reports().borrow().clone();
    assert_eq!(report.vanished, 1);
    assert_eq!(report.pending_after, 0);
    assert_eq!(index.calls_for("gone"), 1);

    s.stop_and_join().await;
}

#[tokio::test]
async fn burst_of_notifications_is_bounded() {
    let store = Arc::new(InMemoryRecordStore::with_clock(FixedClock::new(t0())));
    let s = Scheduler::builder()
        .config(SchedulerConfig {
            queue_capacity: 10,
            ..Default::default()
        })
        .store(store)
        .client(Arc::new(FlakyIndex::default()))
        .build();

    let outcomes: Vec<Delivery> = (0..1000).map(|i| s.notify_task_changed(format!("t{i}"))).collect();
    assert_eq!(outcomes.iter().filter(|d| **d == Delivery::Queued).count(), 10);
    assert_eq!(outcomes.iter().filter(|d| **d == Delivery::Dropped).count(), 990);
}
