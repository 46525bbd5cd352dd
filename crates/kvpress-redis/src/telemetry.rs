//! # Telemetry Features
//!
//! Console logging is always on. Optional OpenTelemetry metrics are compiled
//! in with cargo features.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry metrics (counters and histograms).
//! - `stdout`: Enables the stdout metrics exporter.
//!
//! ## Feature constraints
//!
//! - `stdout` requires `metrics`.
//!
//! ## Metrics behavior
//!
//! Each completed phase records:
//!
//! - `commands`: commands attempted, by phase and mode
//! - `command_errors`: commands whose errors were swallowed
//! - `phase_duration`: wall-clock duration of the phase (ms)
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --features metrics,stdout -- --iterations 1000
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`). Logs go to stderr so
//! that stdout only carries the report.

#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires 'metrics' to be enabled.");

use kvpress::PhaseReport;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let scope = InstrumentationScope::builder("kvpress")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

/// Flushes and shuts down whatever providers were started.
pub fn shutdown_telemetry(_providers: TelemetryProviders) {
    #[cfg(feature = "metrics")]
    {
        if let Err(err) = _providers.meter_provider.force_flush() {
            eprintln!("Error flushing metrics: {err:#?}");
        }
        if let Err(err) = _providers.meter_provider.shutdown() {
            eprintln!("Error shutting down meter: {err:#?}");
        }
    }
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("kvpress")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

#[cfg(feature = "metrics")]
static COMMANDS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static COMMAND_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PHASE_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = COMMANDS.set(
        meter
            .u64_counter("commands")
            .with_description("Commands attempted against the backend")
            .build(),
    );

    let _ = COMMAND_ERRORS.set(
        meter
            .u64_counter("command_errors")
            .with_description("Commands whose backend errors were swallowed")
            .build(),
    );

    let _ = PHASE_DURATION_MS.set(
        meter
            .f64_histogram("phase_duration")
            .with_unit("ms")
            .with_description("Wall-clock duration of a benchmark phase")
            .build(),
    );
}

// Compiles to a no-op when metrics are disabled
#[cfg(feature = "metrics")]
pub fn record_phase(report: &PhaseReport) {
    let attrs = [
        KeyValue::new("phase", report.name.clone()),
        KeyValue::new("mode", report.mode.to_string()),
    ];
    if let Some(counter) = COMMANDS.get() {
        counter.add(report.executed, &attrs);
    }
    if let Some(counter) = COMMAND_ERRORS.get() {
        counter.add(report.failed, &attrs);
    }
    if let Some(histogram) = PHASE_DURATION_MS.get() {
        histogram.record(report.elapsed.as_secs_f64() * 1_000.0, &attrs);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_phase(_report: &PhaseReport) {}
