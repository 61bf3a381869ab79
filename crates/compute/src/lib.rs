//! Divide-and-conquer parallel summation over a shared, read-only sequence.
//!
//! A [`SumTask`] splits its range at the midpoint until it falls under the
//! [`Threshold`], forking the left half and computing the right half inline.
//! The pool it forks onto is injected through [`ForkJoinPool`].

pub mod engine;
pub mod metrics;
pub mod observer;
pub mod scheduler;
pub mod task;

pub use engine::{range_closed, sum, ForkJoinSum};
pub use forkjoin_core::{ForkJoinError, PoolKind, ReduceConfig, Result, Threshold};
pub use metrics::{RunMetrics, RunReport};
pub use observer::{CountingObserver, NoopObserver, TaskObserver, TracingObserver};
pub use scheduler::{AnyPool, ForkJoinPool, InlinePool, WorkStealingPool};
pub use task::{SumTask, Summand};
