use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;
use forkjoin_core::{Result, Threshold};
use tracing::{info, warn};

use crate::metrics::{RunMetrics, RunReport};
use crate::observer::{CountingObserver, NoopObserver, TaskObserver};
use crate::scheduler::ForkJoinPool;
use crate::task::{SumTask, Summand};

/// Sum `sequence` on `pool`, splitting ranges longer than `threshold`.
pub fn sum<P, T>(pool: &P, threshold: Threshold, sequence: &[T]) -> Result<T>
where
    P: ForkJoinPool,
    T: Summand,
{
    pool.invoke(|| SumTask::root(sequence).compute(pool, threshold, &NoopObserver))
}

/// The integers `1..=n`, the canonical input for [`ForkJoinSum::sum_range_closed`].
pub fn range_closed(n: i64) -> Vec<i64> {
    (1..=n).collect()
}

/// Fork/join summation engine bound to one injected pool.
pub struct ForkJoinSum<P> {
    pool: P,
    threshold: Threshold,
    observer: Arc<dyn TaskObserver>,
    metrics: RwLock<RunMetrics>,
}

impl<P: ForkJoinPool> ForkJoinSum<P> {
    pub fn new(pool: P, threshold: Threshold) -> Self {
        Self {
            pool,
            threshold,
            observer: Arc::new(NoopObserver),
            metrics: RwLock::new(RunMetrics::default()),
        }
    }

    /// Attach a per-fork / per-leaf observer.
    pub fn with_observer(mut self, observer: impl TaskObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Sum the whole sequence. Either the full sum is returned or the run
    /// fails as a whole.
    pub fn sum<T: Summand>(&self, sequence: &[T]) -> Result<T> {
        info!(
            pool = self.pool.name(),
            workers = self.pool.workers(),
            threshold = self.threshold.get(),
            elements = sequence.len(),
            "fork/join sum starting"
        );

        let counter = CountingObserver::wrapping(self.observer.as_ref());
        let root = SumTask::root(sequence);
        let pool = &self.pool;
        let threshold = self.threshold;

        let started = Instant::now();
        let total = match pool.invoke(|| root.compute(pool, threshold, &counter)) {
            Ok(total) => total,
            Err(e) => {
                warn!(error = %e, "fork/join sum failed");
                if let Ok(mut m) = self.metrics.write() {
                    m.record_failure();
                }
                return Err(e);
            }
        };
        let elapsed = started.elapsed();

        let report = RunReport {
            pool: pool.name().to_string(),
            workers: pool.workers(),
            threshold: threshold.get(),
            elements: sequence.len(),
            forks: counter.forks(),
            leaves: counter.leaves(),
            elapsed,
            completed_at: Utc::now(),
        };
        info!(
            forks = report.forks,
            leaves = report.leaves,
            "fork/join sum done in {:.3}ms",
            elapsed.as_secs_f64() * 1000.0
        );

        if let Ok(mut m) = self.metrics.write() {
            m.record(report);
        }
        Ok(total)
    }

    /// Sum of `1..=n`.
    pub fn sum_range_closed(&self, n: i64) -> Result<i64> {
        self.sum(&range_closed(n))
    }

    /// Snapshot of the metrics recorded so far.
    pub fn metrics(&self) -> RunMetrics {
        self.metrics
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Report of the most recent successful run.
    pub fn last_report(&self) -> Option<RunReport> {
        self.metrics().last
    }
}
