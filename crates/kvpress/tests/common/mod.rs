#![allow(dead_code)]

use kvpress::{Command, Connection, Dialer, Error, Result};
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Every command bumps a shared counter.
#[derive(Clone, Default)]
pub struct CounterDialer {
    pub count: Arc<AtomicUsize>,
}

pub struct CounterConn {
    count: Arc<AtomicUsize>,
}

impl Dialer for CounterDialer {
    type Conn = CounterConn;

    async fn dial(&self) -> Result<CounterConn> {
        Ok(CounterConn {
            count: Arc::clone(&self.count),
        })
    }
}

impl Connection for CounterConn {
    async fn execute(&mut self, _command: &Command) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(())
    }
}

/// Records the name of every executed command, in execution order.
#[derive(Clone, Default)]
pub struct RecordingDialer {
    pub log: Arc<Mutex<Vec<String>>>,
}

pub struct RecordingConn {
    log: Arc<Mutex<Vec<String>>>,
}

impl Dialer for RecordingDialer {
    type Conn = RecordingConn;

    async fn dial(&self) -> Result<RecordingConn> {
        Ok(RecordingConn {
            log: Arc::clone(&self.log),
        })
    }
}

impl Connection for RecordingConn {
    async fn execute(&mut self, command: &Command) -> Result<()> {
        // Give other workers a chance to interleave.
        tokio::task::yield_now().await;
        self.log.lock().unwrap().push(command.name().to_string());
        Ok(())
    }
}

/// Tracks how many commands are in flight at once across all connections.
#[derive(Clone, Default)]
pub struct ConcurrencyDialer {
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    pub total: Arc<AtomicUsize>,
    pub dials: Arc<AtomicUsize>,
}

pub struct ConcurrencyConn {
    shared: ConcurrencyDialer,
}

impl Dialer for ConcurrencyDialer {
    type Conn = ConcurrencyConn;

    async fn dial(&self) -> Result<ConcurrencyConn> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        Ok(ConcurrencyConn {
            shared: self.clone(),
        })
    }
}

impl Connection for ConcurrencyConn {
    async fn execute(&mut self, _command: &Command) -> Result<()> {
        let now = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_micros(50)).await;
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.shared.total.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connections block on every command until permits are released.
#[derive(Clone)]
pub struct StallingDialer {
    pub gate: Arc<Semaphore>,
    pub started: Arc<Notify>,
    pub entered: Arc<AtomicUsize>,
}

impl Default for StallingDialer {
    fn default() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            started: Arc::new(Notify::new()),
            entered: Arc::default(),
        }
    }
}

pub struct StallingConn {
    shared: StallingDialer,
}

impl Dialer for StallingDialer {
    type Conn = StallingConn;

    async fn dial(&self) -> Result<StallingConn> {
        Ok(StallingConn {
            shared: self.clone(),
        })
    }
}

impl Connection for StallingConn {
    async fn execute(&mut self, _command: &Command) -> Result<()> {
        self.shared.entered.fetch_add(1, Ordering::SeqCst);
        self.shared.started.notify_one();
        let permit = self
            .shared
            .gate
            .acquire()
            .await
            .map_err(|e| Error::command("stall", e))?;
        permit.forget();
        Ok(())
    }
}

/// Every command fails.
#[derive(Clone, Default)]
pub struct FailingDialer {
    pub attempts: Arc<AtomicUsize>,
}

pub struct FailingConn {
    attempts: Arc<AtomicUsize>,
}

impl Dialer for FailingDialer {
    type Conn = FailingConn;

    async fn dial(&self) -> Result<FailingConn> {
        Ok(FailingConn {
            attempts: Arc::clone(&self.attempts),
        })
    }
}

impl Connection for FailingConn {
    async fn execute(&mut self, command: &Command) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::command(command.name(), "injected failure"))
    }
}

/// Refuses every dial.
#[derive(Clone, Default)]
pub struct UnreachableDialer;

impl Dialer for UnreachableDialer {
    type Conn = CounterConn;

    async fn dial(&self) -> Result<CounterConn> {
        Err(Error::dial("connection refused"))
    }
}

/// Panics on the very first command it sees, across all connections. Every
/// later command sleeps briefly and records which connection ran it.
#[derive(Clone, Default)]
pub struct PanickingDialer {
    pub attempts: Arc<AtomicUsize>,
    pub served_by: Arc<Mutex<Vec<usize>>>,
    dials: Arc<AtomicUsize>,
}

pub struct PanickingConn {
    id: usize,
    shared: PanickingDialer,
}

impl PanickingDialer {
    /// Distinct connections that have served at least one command.
    pub fn connections_used(&self) -> usize {
        let mut ids = self.served_by.lock().unwrap().clone();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

impl Dialer for PanickingDialer {
    type Conn = PanickingConn;

    async fn dial(&self) -> Result<PanickingConn> {
        Ok(PanickingConn {
            id: self.dials.fetch_add(1, Ordering::SeqCst),
            shared: self.clone(),
        })
    }
}

impl Connection for PanickingConn {
    async fn execute(&mut self, _command: &Command) -> Result<()> {
        if self.shared.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("backend blew up on connection {}", self.id);
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.shared.served_by.lock().unwrap().push(self.id);
        Ok(())
    }
}
