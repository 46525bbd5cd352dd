//! `kvpress`: measures write and read throughput of a Redis-protocol
//! key/value service.
//!
//! Pooled phases fan commands out over a fixed pool of workers, each with its
//! own connection; direct phases issue the same volume one command at a time
//! on a single connection. Elapsed wall-clock time is printed per phase.

mod backend;
mod config;
mod report;
mod telemetry;
mod workload;

use anyhow::Context;
use backend::redis::RedisDialer;
use clap::Parser;
use config::{BenchConfig, CliArgs};
use kvpress::{Driver, DriverConfig};
use report::Reporter;
use telemetry::{init_telemetry, record_phase, shutdown_telemetry};
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = BenchConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let res = run_until_interrupted(run(&config), shutdown_signal()).await;

    shutdown_telemetry(providers);
    res
}

async fn run(config: &BenchConfig) -> anyhow::Result<()> {
    let dialer = RedisDialer::open(&config.url)
        .with_context(|| format!("invalid backend address `{}`", config.url))?;

    let driver_config = DriverConfig {
        num_workers: config.num_workers,
        queue_capacity: config.queue_capacity,
    };
    let mut driver = Driver::start(dialer, driver_config)
        .await
        .with_context(|| {
            format!(
                "failed to start {} workers against {}",
                config.num_workers, config.url
            )
        })?;
    tracing::debug!("Dialed {} worker connections", driver.connections().dialed());

    let mut reporter = Reporter::new(config.format, std::io::stdout());
    for &kind in &config.phases {
        let phase = workload::build_phase(kind, config.iterations, &config.value_suffix);

        reporter.phase_started(kind, phase.iterations())?;
        let report = driver
            .run_phase(&phase)
            .await
            .with_context(|| format!("phase {kind} could not run"))?;
        record_phase(&report);
        reporter.phase_finished(kind, &report)?;
    }

    let totals = driver.stats().snapshot();
    if totals.failed > 0 {
        tracing::warn!(
            "{} of {} commands failed; throughput numbers are suspect",
            totals.failed,
            totals.executed
        );
    }

    driver.shutdown().await?;
    Ok(())
}

/// Drives `bench` until it finishes or `interrupt` fires, whichever comes
/// first. An interrupt is not an error: phases already reported stay on
/// stdout and the rest are skipped.
async fn run_until_interrupted<B, I>(bench: B, interrupt: I) -> anyhow::Result<()>
where
    B: Future<Output = anyhow::Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        res = bench => res,
        () = interrupt => {
            tracing::warn!("Benchmark interrupted; remaining phases skipped");
            Ok(())
        },
    }
}

fn log_startup_info(config: &BenchConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting benchmark with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting benchmark against {} with {} workers, {} ops per phase",
            config.url,
            config.num_workers,
            config.iterations
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
