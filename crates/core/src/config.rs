use std::env;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ForkJoinError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Threshold ─────────────────────────────────────────────────

/// Maximum subrange length computed sequentially instead of being split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threshold(NonZeroUsize);

impl Threshold {
    pub const DEFAULT: Threshold = match NonZeroUsize::new(10) {
        Some(n) => Threshold(n),
        None => unreachable!(),
    };

    pub fn new(value: usize) -> Result<Self> {
        NonZeroUsize::new(value)
            .map(Threshold)
            .ok_or(ForkJoinError::InvalidThreshold(value))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Pool selection ────────────────────────────────────────────

/// Which scheduler implementation executes the reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolKind {
    /// Forked work runs immediately on the calling thread.
    Inline,
    /// Dedicated rayon work-stealing pool.
    #[default]
    WorkStealing,
}

impl FromStr for PoolKind {
    type Err = ForkJoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "sync" => Ok(PoolKind::Inline),
            "work-stealing" | "work_stealing" | "rayon" => Ok(PoolKind::WorkStealing),
            other => Err(ForkJoinError::Config(format!("unknown pool kind: {}", other))),
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Inline => f.write_str("inline"),
            PoolKind::WorkStealing => f.write_str("work-stealing"),
        }
    }
}

// ── Reduction config ──────────────────────────────────────────

/// Reduction configuration, typically parsed from TOML or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReduceConfig {
    /// Subranges of this length or shorter are summed sequentially.
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// Number of worker threads. 0 = available parallelism.
    #[serde(default)]
    pub worker_threads: usize,
    /// Scheduler implementation.
    #[serde(default)]
    pub pool: PoolKind,
}

fn default_threshold() -> usize { Threshold::DEFAULT.get() }

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            worker_threads: 0,
            pool: PoolKind::default(),
        }
    }
}

impl ReduceConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ForkJoinError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ForkJoinError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    /// Build config from environment variables (call `load_dotenv()` first).
    ///
    /// Reads `FORKJOIN_THRESHOLD`, `FORKJOIN_WORKERS` and `FORKJOIN_POOL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable key lookup.
    /// Values that fail to parse keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("FORKJOIN_THRESHOLD") {
            match raw.trim().parse() {
                Ok(v) => config.threshold = v,
                Err(_) => warn!(value = %raw, "ignoring unparsable FORKJOIN_THRESHOLD"),
            }
        }
        if let Some(raw) = get("FORKJOIN_WORKERS") {
            match raw.trim().parse() {
                Ok(v) => config.worker_threads = v,
                Err(_) => warn!(value = %raw, "ignoring unparsable FORKJOIN_WORKERS"),
            }
        }
        if let Some(raw) = get("FORKJOIN_POOL") {
            match raw.parse() {
                Ok(v) => config.pool = v,
                Err(e) => warn!(error = %e, "ignoring FORKJOIN_POOL"),
            }
        }
        config
    }

    /// Validated threshold.
    pub fn threshold(&self) -> Result<Threshold> {
        Threshold::new(self.threshold)
    }

    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}
