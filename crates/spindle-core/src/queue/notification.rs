//! Bounded change-notification queue.
//!
//! Many producers, one consumer (the scheduler loop). Producers never wait:
//! when the buffer is full the id is dropped and the catch-up scan is relied
//! on to pick the change up later.

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

use super::PendingSet;
use crate::domain::TaskId;

/// What happened to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Empty id, never enqueued.
    Ignored,
    /// Queue full (or consumer gone).
    Dropped,
}

/// Create a queue holding at most `capacity` ids (minimum 1).
pub fn notification_channel(capacity: usize) -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (NotificationSender { tx }, NotificationReceiver { rx })
}

/// Producer handle. Cheap to clone and safe to use from any task or thread.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<TaskId>,
}

impl NotificationSender {
    /// Try to enqueue `id` without blocking.
    pub fn notify(&self, id: TaskId) -> Delivery {
        if id.is_empty() {
            return Delivery::Ignored;
        }

        match self.tx.try_send(id) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(id)) => {
                warn!(task_id = %id, "search scheduler queue is full, dropping task id");
                Delivery::Dropped
            }
            Err(TrySendError::Closed(id)) => {
                debug!(task_id = %id, "search scheduler is not running, dropping task id");
                Delivery::Dropped
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer handle, owned by the scheduler loop.
#[derive(Debug)]
pub struct NotificationReceiver {
    rx: mpsc::Receiver<TaskId>,
}

impl NotificationReceiver {
    /// Wait for the next id. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<TaskId> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<TaskId> {
        match self.rx.try_recv() {
            Ok(id) => Some(id),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Move everything currently buffered into `pending`. Returns how many ids were read.
    pub fn drain_into(&mut self, pending: &mut PendingSet) -> usize {
        let mut drained = 0;
        while let Some(id) = self.try_recv() {
            pending.track(id);
            drained += 1;
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_ignored() {
        let (tx, mut rx) = notification_channel(4);
        assert_eq!(tx.notify(TaskId::from("")), Delivery::Ignored);
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (tx, mut rx) = notification_channel(10);

        let mut queued = 0;
        let mut dropped = 0;
        for _ in 0..1000 {
            match tx.notify(TaskId::from("x")) {
                Delivery::Queued => queued += 1,
                Delivery::Dropped => dropped += 1,
                Delivery::Ignored => unreachable!(),
            }
        }
        assert_eq!(queued, 10);
        assert_eq!(dropped, 990);

        let mut retained = 0;
        while rx.try_recv().is_some() {
            retained += 1;
        }
        assert_eq!(retained, 10);
    }

    #[test]
    fn closed_queue_drops() {
        let (tx, rx) = notification_channel(1);
        drop(rx);
        assert_eq!(tx.notify(TaskId::from("a")), Delivery::Dropped);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (tx, _rx) = notification_channel(0);
        assert_eq!(tx.capacity(), 1);
        assert_eq!(tx.notify(TaskId::from("a")), Delivery::Queued);
    }

    #[test]
    fn drain_keeps_existing_retry_counts() {
        let (tx, mut rx) = notification_channel(8);
        let mut pending = PendingSet::new();
        pending.insert(TaskId::from("a"), 2);

        tx.notify(TaskId::from("a"));
        tx.notify(TaskId::from("b"));
        tx.notify(TaskId::from("b"));

        assert_eq!(rx.drain_into(&mut pending), 3);
        assert_eq!(pending.retries("a"), Some(2));
        assert_eq!(pending.retries("b"), Some(0));
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn notify_from_many_threads() {
        let (tx, mut rx) = notification_channel(64);
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let tx = tx.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        tx.notify(TaskId::new(format!("{n}-{i}")));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut pending = PendingSet::new();
        assert_eq!(rx.drain_into(&mut pending), 64);
    }
}
