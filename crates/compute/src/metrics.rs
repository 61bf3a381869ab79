use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one top-level fork/join computation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Scheduler implementation that executed the run.
    pub pool: String,
    /// Worker count of that scheduler.
    pub workers: usize,
    /// Leaf threshold in effect.
    pub threshold: usize,
    /// Length of the input sequence.
    pub elements: usize,
    /// Number of tasks that split and forked a child.
    pub forks: usize,
    /// Number of sequential leaf computations.
    pub leaves: usize,
    /// Wall-clock time inside `invoke`.
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

/// Metrics accumulated across runs of one engine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    /// Successful runs.
    pub runs: u64,
    /// Failed runs.
    pub failures: u64,
    /// Rolling average of `elapsed` over successful runs.
    pub avg_duration: Duration,
    /// Report of the most recent successful run.
    pub last: Option<RunReport>,
}

impl RunMetrics {
    /// Record a successful run.
    pub fn record(&mut self, report: RunReport) {
        self.runs += 1;

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        self.avg_duration = if self.runs == 1 {
            report.elapsed
        } else {
            let prev_nanos = self.avg_duration.as_nanos() as f64;
            let cur_nanos = report.elapsed.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / self.runs as f64;
            Duration::from_nanos(avg_nanos as u64)
        };

        self.last = Some(report);
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}
