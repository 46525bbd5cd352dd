//! Capabilities the engine consumes from a backend.
//!
//! The engine knows nothing about wire protocols, authentication, or reply
//! shapes. A backend supplies two things:
//!
//! - a [`Dialer`] that opens a fresh session on demand, and
//! - a [`Connection`] that executes one named command at a time.
//!
//! Reply values are discarded by the engine, so [`Connection::execute`] only
//! reports success or failure.

use crate::{Command, Result};
use core::future::Future;

/// An exclusively-owned backend session.
///
/// A connection is held by exactly one worker (or by the driver in direct
/// mode) for its entire lifetime and is never shared, so `execute` takes
/// `&mut self`.
pub trait Connection: Send + 'static {
    /// Executes `command` and waits for the backend to answer.
    ///
    /// The reply is discarded. Implementations should map backend failures to
    /// [`Error::Command`](crate::Error::Command).
    fn execute(&mut self, command: &Command) -> impl Future<Output = Result<()>> + Send;
}

/// Opens backend sessions on demand.
pub trait Dialer: Send + Sync + 'static {
    type Conn: Connection;

    /// Establishes a new session.
    ///
    /// Failures should be reported as [`Error::Dial`](crate::Error::Dial).
    fn dial(&self) -> impl Future<Output = Result<Self::Conn>> + Send;
}
