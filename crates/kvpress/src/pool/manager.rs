//! Fixed-size pool of connection-pinned workers.
//!
//! This module defines the [`WorkerPool`] struct, which starts a set of
//! asynchronous workers once, pins one dialed connection to each, and feeds
//! them all through a single bounded [`JobQueue`].
//!
//! The pool is never resized. It lives until [`WorkerPool::shutdown`] is
//! called or it is dropped, at which point the queue closes and the workers
//! drain and exit.

use crate::{
    ConnectionPool, Dialer, Error, ExecStats, Job, JobQueue, Result,
    pool::worker::worker_loop,
    queue,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Default number of workers (and therefore backend connections).
pub const DEFAULT_NUM_WORKERS: usize = 50;

/// A fixed set of workers sharing one bounded job queue.
#[derive(Debug)]
pub struct WorkerPool {
    queue: JobQueue,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Dials `num_workers` connections from `connections` and spawns one
    /// worker per connection.
    ///
    /// Connections are dialed one at a time, each right before its worker is
    /// spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `num_workers` or `queue_capacity` is zero.
    /// - Any dial fails. Workers spawned before the failure are stopped.
    pub async fn start<D: Dialer>(
        connections: &ConnectionPool<D>,
        num_workers: usize,
        queue_capacity: usize,
        stats: Arc<ExecStats>,
    ) -> Result<Self> {
        if num_workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "number of workers must be greater than 0".to_string(),
            });
        }

        let (queue, rx) = queue::channel(queue_capacity)?;
        let mut handles = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            // Dropping `queue` on the error path closes the channel, which
            // stops every worker spawned so far.
            let conn = connections.acquire().await.inspect_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to dial connection for worker {worker_id}: {_e}");
            })?;

            handles.push(tokio::spawn(worker_loop(
                worker_id,
                conn,
                rx.clone(),
                Arc::clone(&stats),
            )));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Started {num_workers} workers with queue capacity {queue_capacity}"
        );

        Ok(Self { queue, handles })
    }

    /// Hands `job` to whichever worker is free next, waiting while the queue
    /// is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the pool has been shut down.
    pub async fn submit(&self, job: Job) -> Result<()> {
        self.queue.enqueue(job).await
    }

    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    pub const fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Closes the queue and waits for every worker to drain it and exit.
    ///
    /// A worker stuck on a stalled connection makes this wait forever; wrap
    /// the call in a timeout if that matters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] for the first worker that panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Closing job queue ({} jobs pending)", self.queue.len());
        self.queue.close();

        let results = futures::future::join_all(self.handles.drain(..)).await;

        let mut first_panic = None;
        for (worker_id, result) in results.into_iter().enumerate() {
            if let Err(_e) = result {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {worker_id} terminated abnormally: {_e}");
                first_panic.get_or_insert(worker_id);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool shutdown complete");

        match first_panic {
            Some(worker_id) => Err(Error::WorkerPanicked { worker_id }),
            None => Ok(()),
        }
    }
}
