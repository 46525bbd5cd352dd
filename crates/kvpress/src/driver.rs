//! Benchmark driver: runs phases and times them.
//!
//! A [`Phase`] is a named batch of `iterations` commands produced by a
//! deterministic generator `Fn(usize) -> Command`. Each phase has a fixed
//! [`DispatchMode`]:
//!
//! - [`DispatchMode::Pooled`]: every command is wrapped in a [`Job`] tied to a
//!   fresh [`CompletionLatch`], pushed through the worker pool's bounded
//!   queue, and the driver waits for the latch. Elapsed time covers generation,
//!   enqueueing, and the wait.
//! - [`DispatchMode::Direct`]: commands are issued one by one on a single
//!   driver-held connection. No queue, no concurrency. This is the baseline.
//!
//! Phases are strictly sequential. A pooled phase is fully drained before
//! the next phase generates its first command.
//!
//! Command failures never abort a phase. They are counted and reported in
//! [`PhaseReport::failed`]; throughput numbers from a phase with failures
//! should be treated as suspect.

use crate::{
    Command, CompletionLatch, Connection, ConnectionPool, Dialer, ExecStats, Job, Result,
    WorkerPool,
    pool::manager::DEFAULT_NUM_WORKERS,
    queue::DEFAULT_QUEUE_CAPACITY,
};
use core::fmt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// How a phase dispatches its commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// Fan out across the worker pool.
    Pooled,
    /// One command at a time on the driver's own connection.
    Direct,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pooled => write!(f, "pooled"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Lifecycle of a single phase.
///
/// Pooled: `Pending → Generating → AwaitingCompletion → Done`.
/// Direct: `Pending → Executing → Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseState {
    Pending,
    Generating,
    AwaitingCompletion,
    Executing,
    Done,
}

impl PhaseState {
    /// Returns the state that follows `self` for a phase running in `mode`.
    /// `Done` is terminal.
    ///
    /// Advancing from a state the mode never visits (for example `Executing`
    /// in a pooled phase) is a bug: it trips a debug assertion and otherwise
    /// ends the phase.
    #[must_use]
    pub const fn advance(self, mode: DispatchMode) -> Self {
        debug_assert!(
            self.belongs_to(mode),
            "phase state does not belong to this dispatch mode"
        );
        match (self, mode) {
            (Self::Pending, DispatchMode::Pooled) => Self::Generating,
            (Self::Pending, DispatchMode::Direct) => Self::Executing,
            (Self::Generating, DispatchMode::Pooled) => Self::AwaitingCompletion,
            _ => Self::Done,
        }
    }

    /// Whether a phase running in `mode` can ever be in this state.
    pub const fn belongs_to(self, mode: DispatchMode) -> bool {
        match (self, mode) {
            (Self::Pending | Self::Done, _)
            | (Self::Generating | Self::AwaitingCompletion, DispatchMode::Pooled)
            | (Self::Executing, DispatchMode::Direct) => true,
            (Self::Generating | Self::AwaitingCompletion, DispatchMode::Direct)
            | (Self::Executing, DispatchMode::Pooled) => false,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }
}

type Generator = Box<dyn Fn(usize) -> Command + Send + Sync>;

/// A named batch of commands.
pub struct Phase {
    name: String,
    mode: DispatchMode,
    iterations: usize,
    generator: Generator,
}

impl Phase {
    /// A phase fanned out across the worker pool.
    pub fn pooled<F>(name: impl Into<String>, iterations: usize, generator: F) -> Self
    where
        F: Fn(usize) -> Command + Send + Sync + 'static,
    {
        Self::new(name, DispatchMode::Pooled, iterations, generator)
    }

    /// A phase issued sequentially on the driver's connection.
    pub fn direct<F>(name: impl Into<String>, iterations: usize, generator: F) -> Self
    where
        F: Fn(usize) -> Command + Send + Sync + 'static,
    {
        Self::new(name, DispatchMode::Direct, iterations, generator)
    }

    pub fn new<F>(name: impl Into<String>, mode: DispatchMode, iterations: usize, generator: F) -> Self
    where
        F: Fn(usize) -> Command + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            mode,
            iterations,
            generator: Box::new(generator),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Builds the `i`-th command of this phase.
    pub fn command(&self, i: usize) -> Command {
        (self.generator)(i)
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

/// Outcome of one completed phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseReport {
    pub name: String,
    pub mode: DispatchMode,
    pub iterations: usize,
    pub elapsed: Duration,
    /// Commands attempted during the phase.
    pub executed: u64,
    /// Commands whose errors were swallowed.
    pub failed: u64,
}

impl PhaseReport {
    /// Operations per second over the phase's wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.iterations as f64 / secs
        }
    }
}

/// Sizing of the worker pool built by [`Driver::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    pub num_workers: usize,
    pub queue_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Owns the benchmark context and runs phases against it.
///
/// The context is explicit: the connection pool, the worker pool, the shared
/// execution counters, and (once a direct phase has run) the driver's own
/// connection. Nothing is global.
pub struct Driver<D: Dialer> {
    connections: ConnectionPool<D>,
    workers: WorkerPool,
    stats: Arc<ExecStats>,
    direct: Option<D::Conn>,
}

impl<D: Dialer> Driver<D> {
    /// Builds a connection pool around `dialer`, starts the worker pool, and
    /// returns a driver ready to run phases.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or any worker connection cannot
    /// be dialed.
    pub async fn start(dialer: D, config: DriverConfig) -> Result<Self> {
        let connections = ConnectionPool::new(dialer);
        let stats = Arc::new(ExecStats::new());
        let workers = WorkerPool::start(
            &connections,
            config.num_workers,
            config.queue_capacity,
            Arc::clone(&stats),
        )
        .await?;

        Ok(Self::new(connections, workers, stats))
    }

    /// Assembles a driver from already-built parts. `stats` should be the
    /// same counters the workers were started with.
    pub fn new(connections: ConnectionPool<D>, workers: WorkerPool, stats: Arc<ExecStats>) -> Self {
        Self {
            connections,
            workers,
            stats,
            direct: None,
        }
    }

    pub const fn connections(&self) -> &ConnectionPool<D> {
        &self.connections
    }

    pub const fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub fn stats(&self) -> &ExecStats {
        &self.stats
    }

    /// Runs `phase` to completion and reports how long it took.
    ///
    /// # Errors
    ///
    /// - Direct phases fail if the driver's connection cannot be dialed.
    /// - Pooled phases fail if the worker pool has been shut down.
    ///
    /// Individual command failures are never returned here.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(phase = %phase.name(), mode = %phase.mode(), iterations = phase.iterations())))]
    pub async fn run_phase(&mut self, phase: &Phase) -> Result<PhaseReport> {
        let before = self.stats.snapshot();
        let elapsed = match phase.mode() {
            DispatchMode::Pooled => self.run_pooled(phase).await?,
            DispatchMode::Direct => self.run_direct(phase).await?,
        };
        let delta = self.stats.snapshot().since(before);

        #[cfg(feature = "tracing")]
        {
            if delta.failed > 0 {
                tracing::warn!(
                    "Phase {} swallowed {} of {} command errors",
                    phase.name(),
                    delta.failed,
                    delta.executed
                );
            }
        }

        Ok(PhaseReport {
            name: phase.name().to_string(),
            mode: phase.mode(),
            iterations: phase.iterations(),
            elapsed,
            executed: delta.executed,
            failed: delta.failed,
        })
    }

    /// Runs every phase in order, stopping at the first setup error.
    pub async fn run_plan(&mut self, phases: &[Phase]) -> Result<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(phases.len());
        for phase in phases {
            reports.push(self.run_phase(phase).await?);
        }
        Ok(reports)
    }

    async fn run_pooled(&mut self, phase: &Phase) -> Result<Duration> {
        let mode = DispatchMode::Pooled;
        let mut state = PhaseState::Pending;
        let latch = Arc::new(CompletionLatch::new(phase.iterations()));

        let start = Instant::now();
        state = transition(state, mode);
        for i in 0..phase.iterations() {
            let job = Job::new(phase.command(i), Arc::clone(&latch));
            self.workers.submit(job).await?;
        }

        state = transition(state, mode);
        latch.wait().await;
        let elapsed = start.elapsed();

        let state = transition(state, mode);
        debug_assert!(state.is_terminal());
        Ok(elapsed)
    }

    async fn run_direct(&mut self, phase: &Phase) -> Result<Duration> {
        let mode = DispatchMode::Direct;
        let conn = match &mut self.direct {
            Some(conn) => conn,
            slot @ None => slot.insert(self.connections.acquire().await?),
        };

        let mut state = PhaseState::Pending;
        let start = Instant::now();
        state = transition(state, mode);
        for i in 0..phase.iterations() {
            let command = phase.command(i);
            let failed = match conn.execute(&command).await {
                Ok(()) => false,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("Direct connection swallowed error: {_e}");
                    true
                }
            };
            self.stats.record(failed);
        }
        let elapsed = start.elapsed();

        let state = transition(state, mode);
        debug_assert!(state.is_terminal());
        Ok(elapsed)
    }

    /// Stops the worker pool and drops every connection.
    ///
    /// # Errors
    ///
    /// See [`WorkerPool::shutdown`].
    pub async fn shutdown(self) -> Result<()> {
        drop(self.direct);
        self.workers.shutdown().await
    }
}

fn transition(from: PhaseState, mode: DispatchMode) -> PhaseState {
    let to = from.advance(mode);
    #[cfg(feature = "tracing")]
    tracing::debug!("{from:?} -> {to:?}");
    to
}
