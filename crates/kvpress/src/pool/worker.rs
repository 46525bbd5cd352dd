use crate::{Connection, ExecStats, JobReceiver};
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc};

/// Worker task responsible for executing [`Job`](crate::Job)s.
///
/// Each worker owns exactly one connection for its whole lifetime. It pulls
/// jobs from the shared queue until the queue is closed and drained, runs
/// each command on its connection, and then signals the job's batch latch.
///
/// This function is designed to be spawned as a Tokio task.
///
/// # Arguments
///
/// - `worker_id`: Numeric identifier for this worker (used for logs/tracing).
/// - `conn`: The connection pinned to this worker.
/// - `jobs`: Shared receiving end of the job queue.
/// - `stats`: Counters that record every execution attempt.
///
/// # Error handling
///
/// Command failures are fire-and-forget: they are counted in `stats` and
/// otherwise dropped. A panic inside the backend is caught and counted the
/// same way, and the worker keeps its connection and goes on to the next job.
/// The latch is signalled whatever the outcome, so a misbehaving backend can
/// never hang a batch or shrink the pool.
pub async fn worker_loop<C: Connection>(
    worker_id: usize,
    mut conn: C,
    jobs: JobReceiver,
    stats: Arc<ExecStats>,
) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    while let Some(job) = jobs.dequeue().await {
        let attempt = AssertUnwindSafe(conn.execute(job.command()))
            .catch_unwind()
            .await;
        let failed = match attempt {
            Ok(Ok(())) => false,
            Ok(Err(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!("Worker {worker_id} swallowed error: {_e}");
                true
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Worker {worker_id} recovered from a panic in the backend");
                true
            }
        };
        stats.record(failed);
        job.complete();
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
    #[cfg(not(feature = "tracing"))]
    let _ = worker_id;
}
