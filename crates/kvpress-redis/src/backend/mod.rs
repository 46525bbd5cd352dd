//! Backend implementations of the [`kvpress::Dialer`] and
//! [`kvpress::Connection`] capabilities.
//!
//! - [`redis`] - RESP over TCP via the `redis` crate.

pub mod redis;
