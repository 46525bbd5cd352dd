//! Connection and worker pools.
//!
//! ## Structure
//!
//! - [`connection`] - Dial-on-demand connection pool (`ConnectionPool`).
//! - [`manager`] - Fixed-size pool of workers (`WorkerPool`).
//! - [`worker`] - The per-worker execution loop.

pub mod connection;
pub mod manager;
pub mod worker;
