//! Bounded reconciliation job queue.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// One unit of pending reconciliation work: poll the accrual service for
/// this order again. Ephemeral, lives only in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileJob {
    pub order_number: String,
    pub user_id: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("reconciliation queue is closed")]
pub struct QueueClosed;

/// Producer side of the job queue. `enqueue` awaits while the queue is
/// full; backpressure, never a silent drop.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: ReconcileJob) -> Result<(), QueueClosed>;
}

/// In-memory bounded queue over a tokio mpsc channel.
///
/// The channel closes once every strong handle is dropped; the worker
/// treats "closed and drained" as its terminal condition. The worker's own
/// requeue handle must therefore be a [`ChannelQueue::downgrade`]d one, so
/// it does not keep the queue alive.
#[derive(Clone)]
pub struct ChannelQueue {
    tx: QueueSender,
}

#[derive(Clone)]
enum QueueSender {
    Strong(mpsc::Sender<ReconcileJob>),
    Weak(mpsc::WeakSender<ReconcileJob>),
}

impl ChannelQueue {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ReconcileJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx: QueueSender::Strong(tx),
            },
            rx,
        )
    }

    /// A handle that does not hold the queue open. Enqueueing through it
    /// fails with `QueueClosed` once all strong handles are gone.
    pub fn downgrade(&self) -> Self {
        let weak = match &self.tx {
            QueueSender::Strong(tx) => tx.downgrade(),
            QueueSender::Weak(weak) => weak.clone(),
        };
        Self {
            tx: QueueSender::Weak(weak),
        }
    }
}

#[async_trait]
impl JobQueue for ChannelQueue {
    async fn enqueue(&self, job: ReconcileJob) -> Result<(), QueueClosed> {
        let tx = match &self.tx {
            QueueSender::Strong(tx) => tx.clone(),
            QueueSender::Weak(weak) => weak.upgrade().ok_or(QueueClosed)?,
        };
        tx.send(job).await.map_err(|_| QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn job(number: &str) -> ReconcileJob {
        ReconcileJob {
            order_number: number.to_string(),
            user_id: 1,
        }
    }

    #[tokio::test]
    async fn enqueue_blocks_when_full() {
        let (queue, mut rx) = ChannelQueue::bounded(1);
        queue.enqueue(job("1")).await.expect("first enqueue");

        // Queue is at capacity; the second enqueue must not complete.
        let pending = tokio::time::timeout(Duration::from_millis(50), queue.enqueue(job("2")));
        assert!(pending.await.is_err(), "enqueue should backpressure");

        assert_eq!(rx.recv().await, Some(job("1")));
        queue.enqueue(job("2")).await.expect("slot freed");
    }

    #[tokio::test]
    async fn enqueue_fails_once_receiver_is_gone() {
        let (queue, rx) = ChannelQueue::bounded(4);
        drop(rx);
        assert_eq!(queue.enqueue(job("1")).await, Err(QueueClosed));
    }

    #[tokio::test]
    async fn weak_handle_does_not_hold_the_queue_open() {
        let (queue, mut rx) = ChannelQueue::bounded(4);
        let weak = queue.downgrade();

        weak.enqueue(job("1")).await.expect("strong handle alive");
        drop(queue);

        // Queued jobs still drain after close.
        assert_eq!(rx.recv().await, Some(job("1")));
        // Closed once the last strong handle is dropped.
        assert_eq!(rx.recv().await, None);
        assert_eq!(weak.enqueue(job("2")).await, Err(QueueClosed));
    }
}
