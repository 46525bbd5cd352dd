//! # kvpress
//!
//! A concurrent dispatch engine for key/value throughput benchmarks.
//!
//! The engine fans a fixed volume of backend commands out across a fixed pool
//! of workers and reports how long each batch took:
//!
//! - [`ConnectionPool`] dials backend connections on demand.
//! - [`WorkerPool`] starts N workers once, pinning one connection to each.
//! - [`JobQueue`] carries [`Job`]s to the workers and applies backpressure.
//! - [`CompletionLatch`] tells the driver when a whole batch has executed.
//! - [`Driver`] generates each [`Phase`], waits for it, and returns a
//!   [`PhaseReport`].
//!
//! Backends plug in through the [`Dialer`] and [`Connection`] traits; the
//! engine never looks at wire formats or reply values.
//!
//! ## Example
//!
//! ```
//! use kvpress::{Command, Connection, Dialer, Driver, DriverConfig, Phase, Result};
//!
//! struct NullDialer;
//! struct NullConn;
//!
//! impl Dialer for NullDialer {
//!     type Conn = NullConn;
//!     async fn dial(&self) -> Result<NullConn> {
//!         Ok(NullConn)
//!     }
//! }
//!
//! impl Connection for NullConn {
//!     async fn execute(&mut self, _command: &Command) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap().block_on(async {
//! let config = DriverConfig { num_workers: 4, queue_capacity: 16 };
//! let mut driver = Driver::start(NullDialer, config).await?;
//!
//! let put = Phase::pooled("put", 1_000, |i| {
//!     Command::new("set").arg(format!("key-{i}")).arg(format!("value-{i}"))
//! });
//! let report = driver.run_phase(&put).await?;
//! assert_eq!(report.executed, 1_000);
//!
//! driver.shutdown().await?;
//! # Ok::<(), kvpress::Error>(())
//! # }).unwrap();
//! ```

mod backend;
mod command;
mod driver;
mod error;
mod job;
mod latch;
pub mod pool;
pub mod queue;
mod stats;

#[cfg(test)]
mod mock;

pub use crate::backend::*;
pub use crate::command::*;
pub use crate::driver::*;
pub use crate::error::*;
pub use crate::job::*;
pub use crate::latch::*;
pub use crate::pool::{connection::ConnectionPool, manager::WorkerPool, worker::worker_loop};
pub use crate::queue::{JobQueue, JobReceiver};
pub use crate::stats::*;
