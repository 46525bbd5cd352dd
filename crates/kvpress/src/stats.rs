use portable_atomic::{AtomicU64, Ordering};

/// Process-wide execution counters shared by every worker and the direct
/// path.
///
/// Command failures are swallowed at the worker boundary; these counters are
/// the only place they remain visible. Updating them never blocks and never
/// changes control flow.
#[derive(Debug, Default)]
pub struct ExecStats {
    executed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`ExecStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecSnapshot {
    pub executed: u64,
    pub failed: u64,
}

impl ExecStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one execution attempt and whether it failed.
    pub fn record(&self, failed: bool) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ExecSnapshot {
        ExecSnapshot {
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl ExecSnapshot {
    /// Counts accumulated between `earlier` and `self`.
    #[must_use]
    pub const fn since(self, earlier: Self) -> Self {
        Self {
            executed: self.executed.saturating_sub(earlier.executed),
            failed: self.failed.saturating_sub(earlier.failed),
        }
    }
}
