use std::any::Any;

use forkjoin_core::{ForkJoinError, PoolKind, ReduceConfig, Result};
use tracing::info;

use super::inline::InlinePool;
use super::work_stealing::WorkStealingPool;

/// Worker-scheduling capability consumed by fork/join tasks.
///
/// `fork_join` is the fork + join pair in one scoped call: `forked` is
/// submitted for asynchronous execution, `inline` runs on the calling
/// context, and the call returns only once both have completed. Because
/// both closures finish before the call returns, they may borrow from the
/// caller's stack.
///
/// # Liveness
///
/// Every non-leaf task blocks inside `fork_join` while deeper recursion is
/// still pending. An implementation backed by a bounded set of workers must
/// let a blocked worker keep executing other queued work (e.g. work
/// stealing), otherwise recursive joins can starve the pool.
pub trait ForkJoinPool: Sync {
    /// Human-readable name for logging and reports.
    fn name(&self) -> &str;

    /// Number of worker execution contexts.
    fn workers(&self) -> usize;

    /// Fork `forked`, run `inline` on the current context, then join.
    ///
    /// Returns `(forked_result, inline_result)`.
    fn fork_join<F, I, FR, IR>(&self, forked: F, inline: I) -> (FR, IR)
    where
        F: FnOnce() -> FR + Send,
        I: FnOnce() -> IR + Send,
        FR: Send,
        IR: Send;

    /// Run `task` to completion and block until its result is available.
    ///
    /// A panic raised by the task or any of its forked subtasks aborts the
    /// whole computation and surfaces as [`ForkJoinError::TaskPanicked`].
    fn invoke<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send;
}

impl<P: ForkJoinPool + ?Sized> ForkJoinPool for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn workers(&self) -> usize {
        (**self).workers()
    }

    fn fork_join<F, I, FR, IR>(&self, forked: F, inline: I) -> (FR, IR)
    where
        F: FnOnce() -> FR + Send,
        I: FnOnce() -> IR + Send,
        FR: Send,
        IR: Send,
    {
        (**self).fork_join(forked, inline)
    }

    fn invoke<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        (**self).invoke(task)
    }
}

/// A pool selected at runtime from [`ReduceConfig`].
#[derive(Debug)]
pub enum AnyPool {
    Inline(InlinePool),
    WorkStealing(WorkStealingPool),
}

impl AnyPool {
    /// Build the pool described by `config`.
    pub fn from_config(config: &ReduceConfig) -> Result<Self> {
        let pool = match config.pool {
            PoolKind::Inline => AnyPool::Inline(InlinePool),
            PoolKind::WorkStealing => AnyPool::WorkStealing(WorkStealingPool::new(
                config.resolved_worker_threads(),
            )?),
        };
        info!(pool = pool.name(), workers = pool.workers(), "worker pool ready");
        Ok(pool)
    }
}

impl ForkJoinPool for AnyPool {
    fn name(&self) -> &str {
        match self {
            AnyPool::Inline(p) => p.name(),
            AnyPool::WorkStealing(p) => p.name(),
        }
    }

    fn workers(&self) -> usize {
        match self {
            AnyPool::Inline(p) => p.workers(),
            AnyPool::WorkStealing(p) => p.workers(),
        }
    }

    fn fork_join<F, I, FR, IR>(&self, forked: F, inline: I) -> (FR, IR)
    where
        F: FnOnce() -> FR + Send,
        I: FnOnce() -> IR + Send,
        FR: Send,
        IR: Send,
    {
        match self {
            AnyPool::Inline(p) => p.fork_join(forked, inline),
            AnyPool::WorkStealing(p) => p.fork_join(forked, inline),
        }
    }

    fn invoke<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        match self {
            AnyPool::Inline(p) => p.invoke(task),
            AnyPool::WorkStealing(p) => p.invoke(task),
        }
    }
}

/// Convert a caught panic payload into a [`ForkJoinError`].
pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> ForkJoinError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    ForkJoinError::TaskPanicked(message)
}
