use std::panic::{self, AssertUnwindSafe};

use forkjoin_core::Result;

use super::pool::{panicked, ForkJoinPool};

/// Fully synchronous pool: a forked task executes immediately on the
/// calling thread, before the inline side.
///
/// Single worker, no concurrency. Never blocks, so the liveness
/// precondition holds trivially.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePool;

impl ForkJoinPool for InlinePool {
    fn name(&self) -> &str {
        "inline"
    }

    fn workers(&self) -> usize {
        1
    }

    fn fork_join<F, I, FR, IR>(&self, forked: F, inline: I) -> (FR, IR)
    where
        F: FnOnce() -> FR + Send,
        I: FnOnce() -> IR + Send,
        FR: Send,
        IR: Send,
    {
        let forked_result = forked();
        let inline_result = inline();
        (forked_result, inline_result)
    }

    fn invoke<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        panic::catch_unwind(AssertUnwindSafe(task)).map_err(panicked)
    }
}
