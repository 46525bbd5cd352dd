use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::fmt;
use kvpress::{pool::manager::DEFAULT_NUM_WORKERS, queue::DEFAULT_QUEUE_CAPACITY};

/// Runtime configuration for the `kvpress` binary.
///
/// These settings control the size of the workload, the concurrency of the
/// pooled phases, and how results are printed. All values are parsed from CLI
/// arguments or environment variables (a `.env` file is honored), with
/// defaults matching the reference harness: 40 000 operations per phase, 50
/// workers, and a queue of 100 jobs.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kvpress",
    version,
    about = "Throughput harness for Redis-protocol key/value services"
)]
pub struct CliArgs {
    /// Backend address.
    ///
    /// Either `host:port` or a full `redis://` / `rediss://` URL.
    ///
    /// Environment variable: `KVPRESS_ADDR`
    #[arg(long, env = "KVPRESS_ADDR", default_value_t = String::from("127.0.0.1:6379"))]
    pub addr: String,

    /// Number of operations issued by every phase.
    ///
    /// Environment variable: `KVPRESS_ITERATIONS`
    #[arg(short = 'n', long, env = "KVPRESS_ITERATIONS", default_value_t = 40_000)]
    pub iterations: usize,

    /// Number of workers in the pool. Each worker holds its own connection
    /// for the whole run.
    ///
    /// Environment variable: `KVPRESS_NUM_WORKERS`
    #[arg(long, env = "KVPRESS_NUM_WORKERS", default_value_t = DEFAULT_NUM_WORKERS)]
    pub num_workers: usize,

    /// Capacity of the job queue between the driver and the workers.
    ///
    /// When the queue is full the driver waits, so lower values apply
    /// backpressure sooner.
    ///
    /// Environment variable: `KVPRESS_QUEUE_CAPACITY`
    #[arg(long, env = "KVPRESS_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Phases to run, in order (comma separated).
    ///
    /// Environment variable: `KVPRESS_PHASES`
    #[arg(
        long,
        env = "KVPRESS_PHASES",
        value_enum,
        value_delimiter = ',',
        default_values_t = vec![
            PhaseKind::PooledPut,
            PhaseKind::PooledGet,
            PhaseKind::DirectSet,
            PhaseKind::DirectGet,
        ]
    )]
    pub phases: Vec<PhaseKind>,

    /// Tail appended to every generated value.
    ///
    /// Environment variable: `KVPRESS_VALUE_SUFFIX`
    #[arg(long, env = "KVPRESS_VALUE_SUFFIX", default_value_t = String::from("123456789809"))]
    pub value_suffix: String,

    /// Report format written to stdout.
    ///
    /// Environment variable: `KVPRESS_FORMAT`
    #[arg(long, env = "KVPRESS_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// The workload phases the binary knows how to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PhaseKind {
    /// `tikv.put pkey-{i} pvaluedata-{i}-{suffix}` through the worker pool.
    PooledPut,
    /// `tikv.cget pkey-{i}` through the worker pool.
    PooledGet,
    /// `set key-{i} valuedata-{i}-{suffix}` on a single connection.
    DirectSet,
    /// `get key-{i}` on a single connection.
    DirectGet,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PooledPut => write!(f, "pooled-put"),
            Self::PooledGet => write!(f, "pooled-get"),
            Self::DirectSet => write!(f, "direct-set"),
            Self::DirectGet => write!(f, "direct-get"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `Run <command> <n>` / `Time: <elapsed>` lines.
    Text,
    /// One JSON object per phase.
    Json,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub url: String,
    pub iterations: usize,
    pub num_workers: usize,
    pub queue_capacity: usize,
    pub phases: Vec<PhaseKind>,
    pub value_suffix: String,
    pub format: OutputFormat,
}

impl TryFrom<CliArgs> for BenchConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("KVPRESS_NUM_WORKERS must be greater than 0");
        }

        if args.queue_capacity == 0 {
            bail!("KVPRESS_QUEUE_CAPACITY must be greater than 0");
        }

        if args.phases.is_empty() {
            bail!("KVPRESS_PHASES must name at least one phase");
        }

        if args.addr.trim().is_empty() {
            bail!("KVPRESS_ADDR must not be empty");
        }

        Ok(Self {
            url: to_url(args.addr.trim()),
            iterations: args.iterations,
            num_workers: args.num_workers,
            queue_capacity: args.queue_capacity,
            phases: args.phases,
            value_suffix: args.value_suffix,
            format: args.format,
        })
    }
}

fn to_url(addr: &str) -> String {
    if addr.starts_with("redis://") || addr.starts_with("rediss://") {
        addr.to_string()
    } else {
        format!("redis://{addr}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<BenchConfig> {
        let argv = core::iter::once("kvpress").chain(args.iter().copied());
        BenchConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_match_reference_harness() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.url, "redis://127.0.0.1:6379/");
        assert_eq!(config.iterations, 40_000);
        assert_eq!(config.num_workers, 50);
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(
            config.phases,
            vec![
                PhaseKind::PooledPut,
                PhaseKind::PooledGet,
                PhaseKind::DirectSet,
                PhaseKind::DirectGet
            ]
        );
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn phases_are_parsed_in_order() {
        let config = parse(&["--phases", "direct-get,pooled-put", "-n", "10"]).unwrap();
        assert_eq!(config.phases, vec![PhaseKind::DirectGet, PhaseKind::PooledPut]);
        assert_eq!(config.iterations, 10);
    }

    #[test]
    fn urls_pass_through() {
        let config = parse(&["--addr", "rediss://cache.internal:6380/2"]).unwrap();
        assert_eq!(config.url, "rediss://cache.internal:6380/2");
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(parse(&["--num-workers", "0"]).is_err());
        assert!(parse(&["--queue-capacity", "0"]).is_err());
    }

    #[test]
    fn unknown_phase_is_rejected() {
        assert!(parse(&["--phases", "pooled-delete"]).is_err());
    }
}
