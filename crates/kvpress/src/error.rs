//! Error types for the dispatch engine.
//!
//! This module defines the central `Error` enum. Only a subset of these
//! errors ever reaches a caller: command failures are swallowed at the worker
//! boundary and merely counted (see [`crate::ExecStats`]).
//!
//! ## Error Cases
//! - `Dial`: A connection could not be established. Fatal to whoever asked
//!   for the connection (worker pool startup or the direct-mode driver).
//! - `Command`: The backend rejected or failed a command. Never propagated
//!   out of a worker.
//! - `QueueClosed`: A job was enqueued after the queue was closed.
//! - `InvalidConfig`: The engine was configured with unusable sizes.
//! - `WorkerPanicked`: A worker task panicked and was observed during
//!   shutdown.

/// Boxed error type carried by backend failures.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the dispatch engine.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Dialing a backend connection failed.
    #[error("Dial error: {source}")]
    Dial {
        #[source]
        source: BoxError,
    },

    /// Executing a command on a connection failed.
    #[error("Command `{command}` failed: {source}")]
    Command {
        command: String,
        #[source]
        source: BoxError,
    },

    /// The job queue was closed while a producer still held it.
    #[error("Job queue is closed")]
    QueueClosed,

    /// The engine was configured with values it cannot run with.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A worker task terminated by panicking.
    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}

impl Error {
    /// Wraps any backend error raised while dialing.
    pub fn dial(source: impl Into<BoxError>) -> Self {
        Self::Dial {
            source: source.into(),
        }
    }

    /// Wraps any backend error raised while executing `command`.
    pub fn command(command: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Command {
            command: command.into(),
            source: source.into(),
        }
    }
}
