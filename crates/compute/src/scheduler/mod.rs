//! Scheduler boundary for fork/join reductions.
//!
//! A [`ForkJoinPool`] is the only capability a task needs: fork one side,
//! run the other side inline, join, and a top-level `invoke` that runs a
//! whole computation to completion. Pools are built by the caller and
//! passed in explicitly; there is no process-wide pool.

pub mod inline;
pub mod pool;
pub mod work_stealing;

pub use inline::InlinePool;
pub use pool::{AnyPool, ForkJoinPool};
pub use work_stealing::WorkStealingPool;
