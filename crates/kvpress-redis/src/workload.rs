//! The default benchmark plan.
//!
//! Two phase families are measured. The pooled phases use the backend's
//! `tikv.*` command family and fan out across the worker pool; the direct
//! phases use plain `set` / `get` on one connection. They exercise different
//! backend command paths, so their timings are reported side by side and
//! never compared as if they measured the same operation.

use crate::config::PhaseKind;
use kvpress::{Command, Phase};

impl PhaseKind {
    /// Name of the backend command this phase issues.
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::PooledPut => "tikv.put",
            Self::PooledGet => "tikv.cget",
            Self::DirectSet => "set",
            Self::DirectGet => "get",
        }
    }

    /// Label printed in the `Run <label> <n>` header. The pooled read is
    /// labelled `tikv.get` although it sends `tikv.cget`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PooledGet => "tikv.get",
            other => other.command_name(),
        }
    }
}

/// Builds the phase for `kind`. The `i`-th command depends only on `i` and
/// `value_suffix`.
pub fn build_phase(kind: PhaseKind, iterations: usize, value_suffix: &str) -> Phase {
    let name = kind.to_string();
    let command = kind.command_name();
    let suffix = value_suffix.to_string();

    match kind {
        PhaseKind::PooledPut => Phase::pooled(name, iterations, move |i| {
            Command::new(command)
                .arg(format!("pkey-{i}"))
                .arg(format!("pvaluedata-{i}-{suffix}"))
        }),
        PhaseKind::PooledGet => Phase::pooled(name, iterations, move |i| {
            Command::new(command).arg(format!("pkey-{i}"))
        }),
        PhaseKind::DirectSet => Phase::direct(name, iterations, move |i| {
            Command::new(command)
                .arg(format!("key-{i}"))
                .arg(format!("valuedata-{i}-{suffix}"))
        }),
        PhaseKind::DirectGet => Phase::direct(name, iterations, move |i| {
            Command::new(command).arg(format!("key-{i}"))
        }),
    }
}
