//! In-memory backends for unit tests.

use crate::{Command, Connection, Dialer, Error, Result};
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Dials connections that count every executed command.
#[derive(Clone, Debug, Default)]
pub struct CountingDialer {
    pub executed: Arc<AtomicUsize>,
}

pub struct CountingConn {
    executed: Arc<AtomicUsize>,
}

impl Dialer for CountingDialer {
    type Conn = CountingConn;

    async fn dial(&self) -> Result<Self::Conn> {
        Ok(CountingConn {
            executed: Arc::clone(&self.executed),
        })
    }
}

impl Connection for CountingConn {
    async fn execute(&mut self, _command: &Command) -> Result<()> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(())
    }
}

/// Succeeds `ok_dials` times, then refuses every further dial.
#[derive(Debug)]
pub struct FailingDialer {
    ok_dials: usize,
    attempts: AtomicUsize,
}

impl FailingDialer {
    pub const fn after(ok_dials: usize) -> Self {
        Self {
            ok_dials,
            attempts: AtomicUsize::new(0),
        }
    }
}

impl Dialer for FailingDialer {
    type Conn = CountingConn;

    async fn dial(&self) -> Result<Self::Conn> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) >= self.ok_dials {
            return Err(Error::dial("connection refused"));
        }
        Ok(CountingConn {
            executed: Arc::default(),
        })
    }
}

/// Dials connections whose every command fails.
#[derive(Clone, Debug, Default)]
pub struct BrokenDialer;

pub struct BrokenConn;

impl Dialer for BrokenDialer {
    type Conn = BrokenConn;

    async fn dial(&self) -> Result<Self::Conn> {
        Ok(BrokenConn)
    }
}

impl Connection for BrokenConn {
    async fn execute(&mut self, command: &Command) -> Result<()> {
        Err(Error::command(command.name(), "backend unavailable"))
    }
}
