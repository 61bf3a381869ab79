use std::fmt;
use std::ops::{Add, Range};

use forkjoin_core::{ForkJoinError, Result, Threshold};

use crate::observer::TaskObserver;
use crate::scheduler::ForkJoinPool;

/// Element type a [`SumTask`] can reduce. Addition must be associative and
/// commutative; overflow is the element type's own behaviour.
pub trait Summand: Copy + Default + Add<Output = Self> + Send + Sync + fmt::Debug {}

impl<T> Summand for T where T: Copy + Default + Add<Output = T> + Send + Sync + fmt::Debug {}

/// A recursively splittable sum over the half-open range `[start, end)` of a
/// shared, read-only sequence.
///
/// [`compute`](Self::compute) consumes the task, so a task runs at most once.
#[derive(Debug)]
pub struct SumTask<'a, T> {
    sequence: &'a [T],
    start: usize,
    end: usize,
}

impl<'a, T: Summand> SumTask<'a, T> {
    /// Task spanning the whole sequence.
    pub fn root(sequence: &'a [T]) -> Self {
        Self {
            sequence,
            start: 0,
            end: sequence.len(),
        }
    }

    /// Task over `[start, end)`. Fails unless `start <= end <= sequence.len()`.
    pub fn new(sequence: &'a [T], start: usize, end: usize) -> Result<Self> {
        if start > end || end > sequence.len() {
            return Err(ForkJoinError::InvalidRange {
                start,
                end,
                len: sequence.len(),
            });
        }
        Ok(Self {
            sequence,
            start,
            end,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Midpoint split, or `None` when the task is a leaf under `threshold`.
    ///
    /// The left half gets `floor(len / 2)` elements, the right half the rest.
    /// With `threshold >= 1` both halves are non-empty.
    pub fn split(&self, threshold: Threshold) -> Option<(Self, Self)> {
        let len = self.len();
        if len <= threshold.get() {
            return None;
        }
        let mid = self.start + len / 2;
        let left = Self {
            sequence: self.sequence,
            start: self.start,
            end: mid,
        };
        let right = Self {
            sequence: self.sequence,
            start: mid,
            end: self.end,
        };
        Some((left, right))
    }

    /// Sum the range on the current thread without splitting.
    pub fn compute_sequentially(&self) -> T {
        let mut sum = T::default();
        for &value in &self.sequence[self.start..self.end] {
            sum = sum + value;
        }
        sum
    }

    /// Fork the left half, compute the right half inline, join, combine.
    ///
    /// Ranges of length `<= threshold` are leaves and never fork.
    pub fn compute<P, O>(self, pool: &P, threshold: Threshold, observer: &O) -> T
    where
        P: ForkJoinPool,
        O: TaskObserver + ?Sized,
    {
        let Some((left, right)) = self.split(threshold) else {
            let sum = self.compute_sequentially();
            observer.on_leaf(self.range(), &sum);
            return sum;
        };

        observer.on_fork(left.range(), right.range());
        let (left_sum, right_sum) = pool.fork_join(
            move || left.compute(pool, threshold, observer),
            move || right.compute(pool, threshold, observer),
        );
        left_sum + right_sum
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::observer::{CountingObserver, NoopObserver};
    use crate::scheduler::InlinePool;

    use super::*;

    fn threshold(n: usize) -> Threshold {
        Threshold::new(n).unwrap()
    }

    #[derive(Default)]
    struct LeafLog {
        ranges: Mutex<Vec<Range<usize>>>,
    }

    impl TaskObserver for LeafLog {
        fn on_leaf(&self, range: Range<usize>, _partial: &dyn fmt::Debug) {
            self.ranges.lock().unwrap().push(range);
        }
    }

    #[test]
    fn root_spans_sequence() {
        let data = [1_i64, 2, 3];
        let task = SumTask::root(&data);
        assert_eq!(task.range(), 0..3);
        assert_eq!(task.len(), 3);
        assert!(!task.is_empty());
    }

    #[test]
    fn new_rejects_invalid_ranges() {
        let data = [1_i64, 2, 3];
        assert!(matches!(
            SumTask::new(&data, 2, 1),
            Err(ForkJoinError::InvalidRange { start: 2, end: 1, len: 3 })
        ));
        assert!(matches!(
            SumTask::new(&data, 0, 4),
            Err(ForkJoinError::InvalidRange { .. })
        ));
        assert!(SumTask::new(&data, 3, 3).unwrap().is_empty());
    }

    #[test]
    fn split_is_midpoint_with_larger_right_half() {
        let data: Vec<i64> = (0..11).collect();
        let (left, right) = SumTask::root(&data).split(threshold(10)).unwrap();
        assert_eq!(left.range(), 0..5);
        assert_eq!(right.range(), 5..11);
    }

    #[test]
    fn split_never_produces_empty_halves() {
        let data: Vec<i64> = vec![0; 64];
        for t in 1..8 {
            for start in 0..8 {
                for end in start..=64 {
                    let task = SumTask::new(&data, start, end).unwrap();
                    match task.split(threshold(t)) {
                        None => assert!(task.len() <= t),
                        Some((left, right)) => {
                            assert!(!left.is_empty() && !right.is_empty());
                            assert_eq!(left.end(), right.start());
                            assert_eq!(left.len(), task.len() / 2);
                            assert_eq!(left.len() + right.len(), task.len());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn leaf_at_exact_threshold() {
        let data: Vec<i64> = (1..=10).collect();
        let counter = CountingObserver::new();
        let sum = SumTask::root(&data).compute(&InlinePool, threshold(10), &counter);
        assert_eq!(sum, 55);
        assert_eq!(counter.forks(), 0);
        assert_eq!(counter.leaves(), 1);
    }

    #[test]
    fn sub_range_sum() {
        let data: Vec<i64> = (1..=20).collect();
        let task = SumTask::new(&data, 5, 15).unwrap();
        let expected: i64 = data[5..15].iter().sum();
        assert_eq!(task.compute(&InlinePool, threshold(2), &NoopObserver), expected);
    }

    #[test]
    fn leaves_cover_range_without_overlap() {
        let data: Vec<i64> = (1..=20).collect();
        let log = LeafLog::default();
        let sum = SumTask::root(&data).compute(&InlinePool, threshold(3), &log);
        assert_eq!(sum, 210);

        let mut ranges = log.ranges.into_inner().unwrap();
        ranges.sort_by_key(|r| r.start);
        let mut next = 0;
        for r in &ranges {
            assert_eq!(r.start, next);
            assert!(r.len() <= 3 && !r.is_empty());
            next = r.end;
        }
        assert_eq!(next, 20);
    }

    #[test]
    fn one_to_twenty_forks_once_at_default_threshold() {
        let data: Vec<i64> = (1..=20).collect();
        let counter = CountingObserver::new();
        let sum = SumTask::root(&data).compute(&InlinePool, Threshold::DEFAULT, &counter);
        assert_eq!(sum, 210);
        assert_eq!(counter.forks(), 1);
        assert_eq!(counter.leaves(), 2);
    }

    #[test]
    fn generic_element_types() {
        let floats = [0.5_f64, 1.5, 2.0];
        assert_eq!(SumTask::root(&floats).compute(&InlinePool, threshold(1), &NoopObserver), 4.0);

        let small: Vec<u32> = (1..=100).collect();
        assert_eq!(SumTask::root(&small).compute(&InlinePool, threshold(7), &NoopObserver), 5050);
    }
}
