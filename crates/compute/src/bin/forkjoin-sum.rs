//! forkjoin-sum — sums `1..=n` with the fork/join engine and prints the total.
//!
//! Configuration is layered: `--config` TOML file, otherwise `FORKJOIN_*`
//! environment variables (a `.env` file is honoured), then CLI overrides.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use forkjoin_compute::{
    AnyPool, ForkJoinSum, NoopObserver, PoolKind, ReduceConfig, TaskObserver, TracingObserver,
};
use forkjoin_core::config::load_dotenv;

// ── CLI ─────────────────────────────────────────────────────────────

/// Fork/join parallel sum of the integers 1..=n.
#[derive(Parser, Debug)]
#[command(name = "forkjoin-sum", version, about)]
struct Cli {
    /// Upper bound of the summed range.
    #[arg(short, long, default_value_t = 20)]
    n: i64,

    /// Path to a TOML config file.
    #[arg(long, env = "FORKJOIN_CONFIG")]
    config: Option<String>,

    /// Leaf threshold (overrides config).
    #[arg(long)]
    threshold: Option<usize>,

    /// Worker threads, 0 = available parallelism (overrides config).
    #[arg(long)]
    workers: Option<usize>,

    /// Scheduler: `inline` or `work-stealing` (overrides config).
    #[arg(long)]
    pool: Option<PoolKind>,

    /// Log every leaf computation at debug level.
    #[arg(long)]
    trace_leaves: bool,

    /// Print the run report as JSON instead of the plain total.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<ReduceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let cfg = ReduceConfig::from_file(path)?;
                info!(path = %path, "loaded config");
                cfg
            }
            None => ReduceConfig::from_env(),
        };
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.worker_threads = workers;
        }
        if let Some(pool) = self.pool {
            config.pool = pool;
        }
        Ok(config)
    }
}

fn run<O: TaskObserver + 'static>(
    engine: ForkJoinSum<AnyPool>,
    observer: O,
    n: i64,
    json: bool,
) -> anyhow::Result<()> {
    let engine = engine.with_observer(observer);
    let total = engine.sum_range_closed(n)?;

    if json {
        let report = engine
            .last_report()
            .context("run finished without a report")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Total sum: {}", total);
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let threshold = config.threshold()?;
    let pool = AnyPool::from_config(&config)?;
    let engine = ForkJoinSum::new(pool, threshold);

    if cli.trace_leaves {
        run(engine, TracingObserver, cli.n, cli.json)
    } else {
        run(engine, NoopObserver, cli.n, cli.json)
    }
}
