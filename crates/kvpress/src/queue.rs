//! Bounded multi-producer, multi-consumer job queue.
//!
//! The queue is a bounded [`mpsc`] channel whose single receiver is shared by
//! every worker behind an async mutex. Producers hold a [`JobQueue`]; workers
//! hold a clone of the [`JobReceiver`].
//!
//! ## Guarantees
//! - `enqueue` waits while the queue holds `capacity` jobs. It never drops a
//!   job; this is the engine's only backpressure mechanism.
//! - Every enqueued job is handed to exactly one `dequeue` call.
//! - Delivery order across workers is not guaranteed.

use crate::{Error, Job, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Default number of jobs the queue can hold before producers block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Creates a queue holding at most `capacity` jobs.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `capacity` is zero.
pub fn channel(capacity: usize) -> Result<(JobQueue, JobReceiver)> {
    if capacity == 0 {
        return Err(Error::InvalidConfig {
            reason: "queue capacity must be greater than 0".to_string(),
        });
    }

    let (tx, rx) = mpsc::channel(capacity);
    Ok((
        JobQueue {
            tx: Some(tx),
            capacity,
        },
        JobReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    ))
}

/// Producer half of the queue.
#[derive(Debug)]
pub struct JobQueue {
    tx: Option<mpsc::Sender<Job>>,
    capacity: usize,
}

impl JobQueue {
    /// Pushes `job`, waiting for space if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the queue was closed or every worker
    /// has gone away. Neither happens while a benchmark is running.
    pub async fn enqueue(&self, job: Job) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::QueueClosed)?;
        tx.send(job).await.map_err(|_| Error::QueueClosed)
    }

    /// Drops the producer side. Workers drain what is left and then stop.
    pub fn close(&mut self) {
        self.tx = None;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(mpsc::Sender::is_closed)
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs currently waiting to be picked up.
    pub fn len(&self) -> usize {
        self.tx
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Consumer half of the queue. Cheap to clone; every clone competes for the
/// same jobs.
#[derive(Clone, Debug)]
pub struct JobReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobReceiver {
    /// Waits for the next job. Returns `None` once the queue is closed and
    /// drained.
    pub async fn dequeue(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, CompletionLatch};
    use std::collections::HashSet;
    use std::time::Duration;

    fn job(i: usize, latch: &Arc<CompletionLatch>) -> Job {
        Job::new(Command::new("noop").arg(i.to_string()), Arc::clone(latch))
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(channel(0), Err(Error::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn enqueue_blocks_when_full() {
        let (queue, _rx) = channel(2).unwrap();
        let latch = Arc::new(CompletionLatch::new(3));

        queue.enqueue(job(0, &latch)).await.unwrap();
        queue.enqueue(job(1, &latch)).await.unwrap();
        assert_eq!(queue.len(), 2);

        let third = tokio::time::timeout(Duration::from_millis(50), queue.enqueue(job(2, &latch)));
        assert!(third.await.is_err(), "enqueue on a full queue must block");
    }

    #[tokio::test]
    async fn enqueue_after_close_fails() {
        let (mut queue, _rx) = channel(1).unwrap();
        queue.close();
        assert!(queue.is_closed());

        let latch = Arc::new(CompletionLatch::new(1));
        assert!(matches!(
            queue.enqueue(job(0, &latch)).await,
            Err(Error::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let (mut queue, rx) = channel(4).unwrap();
        let latch = Arc::new(CompletionLatch::new(2));
        queue.enqueue(job(0, &latch)).await.unwrap();
        queue.enqueue(job(1, &latch)).await.unwrap();
        queue.close();

        assert!(rx.dequeue().await.is_some());
        assert!(rx.dequeue().await.is_some());
        assert!(rx.dequeue().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_job_is_dequeued_exactly_once() {
        const TOTAL: usize = 5_000;

        for capacity in [1, 3, 100] {
            let (mut queue, rx) = channel(capacity).unwrap();
            let latch = Arc::new(CompletionLatch::new(TOTAL));

            let consumers: Vec<_> = (0..8)
                .map(|_| {
                    let rx = rx.clone();
                    tokio::spawn(async move {
                        let mut seen = Vec::new();
                        while let Some(job) = rx.dequeue().await {
                            seen.push(job.command().args()[0].clone());
                            job.complete();
                        }
                        seen
                    })
                })
                .collect();
            drop(rx);

            for i in 0..TOTAL {
                queue.enqueue(job(i, &latch)).await.unwrap();
            }
            queue.close();

            let mut all = HashSet::with_capacity(TOTAL);
            let mut count = 0;
            for handle in consumers {
                for arg in handle.await.unwrap() {
                    assert!(all.insert(arg), "duplicate delivery");
                    count += 1;
                }
            }
            assert_eq!(count, TOTAL, "capacity {capacity}");
            assert!(latch.is_released());
        }
    }
}
