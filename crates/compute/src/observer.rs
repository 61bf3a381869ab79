//! Observability hooks invoked from inside the compute path.
//!
//! Observers are optional: the algorithm never depends on them, and the
//! default [`NoopObserver`] keeps tests free of log coupling.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace};

/// Callbacks fired while a task tree executes. May be called concurrently
/// from several workers.
pub trait TaskObserver: Send + Sync {
    /// A task split and forked its left half.
    fn on_fork(&self, _left: Range<usize>, _right: Range<usize>) {}

    /// A leaf summed `range` sequentially, producing `partial`.
    fn on_leaf(&self, _range: Range<usize>, _partial: &dyn fmt::Debug) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TaskObserver for NoopObserver {}

/// Logs every leaf with the executing thread's name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TaskObserver for TracingObserver {
    fn on_fork(&self, left: Range<usize>, right: Range<usize>) {
        trace!(?left, ?right, "fork");
    }

    fn on_leaf(&self, range: Range<usize>, partial: &dyn fmt::Debug) {
        let thread = std::thread::current();
        debug!(
            thread = thread.name().unwrap_or("unnamed"),
            start = range.start,
            end = range.end,
            sum = ?partial,
            "leaf computed"
        );
    }
}

static NOOP: NoopObserver = NoopObserver;

/// Counts forks and leaves, forwarding every event to an inner observer.
pub struct CountingObserver<'a> {
    forks: AtomicUsize,
    leaves: AtomicUsize,
    inner: &'a dyn TaskObserver,
}

impl CountingObserver<'static> {
    pub fn new() -> Self {
        Self::wrapping(&NOOP)
    }
}

impl Default for CountingObserver<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CountingObserver<'a> {
    pub fn wrapping(inner: &'a dyn TaskObserver) -> Self {
        Self {
            forks: AtomicUsize::new(0),
            leaves: AtomicUsize::new(0),
            inner,
        }
    }

    pub fn forks(&self) -> usize {
        self.forks.load(Ordering::Relaxed)
    }

    pub fn leaves(&self) -> usize {
        self.leaves.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for CountingObserver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingObserver")
            .field("forks", &self.forks())
            .field("leaves", &self.leaves())
            .finish()
    }
}

impl TaskObserver for CountingObserver<'_> {
    fn on_fork(&self, left: Range<usize>, right: Range<usize>) {
        self.forks.fetch_add(1, Ordering::Relaxed);
        self.inner.on_fork(left, right);
    }

    fn on_leaf(&self, range: Range<usize>, partial: &dyn fmt::Debug) {
        self.leaves.fetch_add(1, Ordering::Relaxed);
        self.inner.on_leaf(range, partial);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording {
        leaves: Mutex<Vec<Range<usize>>>,
    }

    impl TaskObserver for Recording {
        fn on_leaf(&self, range: Range<usize>, _partial: &dyn fmt::Debug) {
            self.leaves.lock().unwrap().push(range);
        }
    }

    #[test]
    fn counting_forwards_to_inner() {
        let recording = Recording::default();
        let counter = CountingObserver::wrapping(&recording);

        counter.on_fork(0..5, 5..10);
        counter.on_leaf(0..5, &15_i64);
        counter.on_leaf(5..10, &40_i64);

        assert_eq!(counter.forks(), 1);
        assert_eq!(counter.leaves(), 2);
        assert_eq!(*recording.leaves.lock().unwrap(), vec![0..5, 5..10]);
    }

    #[test]
    fn default_counter_starts_at_zero() {
        let counter = CountingObserver::default();
        assert_eq!(counter.forks(), 0);
        assert_eq!(counter.leaves(), 0);
    }

    #[test]
    fn tracing_observer_without_subscriber() {
        TracingObserver.on_fork(0..1, 1..2);
        TracingObserver.on_leaf(0..1, &1_i64);
    }
}
