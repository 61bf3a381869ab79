use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use forkjoin_core::{ForkJoinError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::pool::{panicked, ForkJoinPool};

/// Dedicated rayon pool.
///
/// `fork_join` maps onto [`rayon::join`]: the inline side runs on the current
/// worker while the forked side sits on that worker's deque where idle
/// workers can steal it. A worker waiting in the join keeps executing other
/// pending jobs, which satisfies the liveness precondition of
/// [`ForkJoinPool`] for any pool size, including one worker.
pub struct WorkStealingPool {
    pool: ThreadPool,
}

impl WorkStealingPool {
    /// Build a pool with `workers` threads. 0 lets rayon pick.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("forkjoin-worker-{}", i))
            .build()
            .map_err(|e| ForkJoinError::PoolBuild(e.to_string()))?;
        Ok(Self { pool })
    }
}

impl fmt::Debug for WorkStealingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkStealingPool")
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl ForkJoinPool for WorkStealingPool {
    fn name(&self) -> &str {
        "work-stealing"
    }

    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn fork_join<F, I, FR, IR>(&self, forked: F, inline: I) -> (FR, IR)
    where
        F: FnOnce() -> FR + Send,
        I: FnOnce() -> IR + Send,
        FR: Send,
        IR: Send,
    {
        // Outside the pool, hop in first so the fork lands on a worker deque.
        let (inline_result, forked_result) = if self.pool.current_thread_index().is_some() {
            rayon::join(inline, forked)
        } else {
            self.pool.install(|| rayon::join(inline, forked))
        };
        (forked_result, inline_result)
    }

    fn invoke<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(task))).map_err(panicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_requested_workers() {
        let pool = WorkStealingPool::new(2).unwrap();
        assert_eq!(pool.workers(), 2);
        assert_eq!(pool.name(), "work-stealing");
    }

    #[test]
    fn invoke_runs_on_named_worker() {
        let pool = WorkStealingPool::new(2).unwrap();
        let name = pool
            .invoke(|| std::thread::current().name().map(str::to_string))
            .unwrap()
            .unwrap();
        assert!(name.starts_with("forkjoin-worker-"), "got {}", name);
    }

    #[test]
    fn fork_join_returns_forked_then_inline() {
        let pool = WorkStealingPool::new(4).unwrap();
        let data = vec![1_i64, 2, 3, 4];
        let (left, right) = pool
            .invoke(|| {
                pool.fork_join(
                    || data[..2].iter().sum::<i64>(),
                    || data[2..].iter().sum::<i64>(),
                )
            })
            .unwrap();
        assert_eq!((left, right), (3, 7));
    }

    #[test]
    fn fork_join_from_outside_the_pool() {
        let pool = WorkStealingPool::new(2).unwrap();
        let (a, b) = pool.fork_join(rayon::current_thread_index, || 5);
        assert!(a.is_some());
        assert_eq!(b, 5);
    }

    #[test]
    fn single_worker_nested_joins_do_not_deadlock() {
        fn depth(pool: &WorkStealingPool, n: u32) -> u32 {
            if n == 0 {
                return 1;
            }
            let (a, b) = pool.fork_join(|| depth(pool, n - 1), || depth(pool, n - 1));
            a + b
        }

        let pool = WorkStealingPool::new(1).unwrap();
        assert_eq!(pool.invoke(|| depth(&pool, 10)).unwrap(), 1024);
    }

    #[test]
    fn panic_in_forked_side_surfaces_from_invoke() {
        let pool = WorkStealingPool::new(2).unwrap();
        let result = pool.invoke(|| {
            pool.fork_join(|| -> i64 { panic!("forked side failed") }, || 1_i64)
        });
        match result {
            Err(ForkJoinError::TaskPanicked(msg)) => assert_eq!(msg, "forked side failed"),
            other => panic!("expected TaskPanicked, got {:?}", other),
        }
    }
}
