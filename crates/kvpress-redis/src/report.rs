//! Operator-facing output.
//!
//! Text format mirrors the classic harness output:
//!
//! ```text
//! Run tikv.put 40000
//! Time: 1.482310537s
//! ```
//!
//! followed by a failure line whenever the backend rejected commands, since
//! timings from such a phase are not trustworthy. JSON format writes one
//! object per completed phase.

use crate::config::{OutputFormat, PhaseKind};
use kvpress::PhaseReport;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct PhaseLine<'a> {
    phase: &'a str,
    mode: String,
    command: &'a str,
    iterations: usize,
    elapsed_ms: f64,
    ops_per_sec: f64,
    executed: u64,
    failed: u64,
}

pub struct Reporter<W> {
    format: OutputFormat,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub const fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn phase_started(&mut self, kind: PhaseKind, iterations: usize) -> anyhow::Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "Run {} {iterations}", kind.label())?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn phase_finished(&mut self, kind: PhaseKind, report: &PhaseReport) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "Time: {:?}", report.elapsed)?;
                if report.failed > 0 {
                    writeln!(
                        self.out,
                        "Failed: {} of {} commands (timing is not reliable)",
                        report.failed, report.executed
                    )?;
                }
            }
            OutputFormat::Json => {
                let line = PhaseLine {
                    phase: &report.name,
                    mode: report.mode.to_string(),
                    command: kind.command_name(),
                    iterations: report.iterations,
                    elapsed_ms: report.elapsed.as_secs_f64() * 1_000.0,
                    ops_per_sec: report.throughput(),
                    executed: report.executed,
                    failed: report.failed,
                };
                serde_json::to_writer(&mut self.out, &line)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
