//! Bounded, single coarse-mutex work queue.
//!
//! A single mutex is sufficient here because the backend worker polls
//! (see [`crate::backend`]) rather than waiting on a condition variable, and
//! producers are expected to run far faster than the I/O-bound consumer.
//! Ordering of successful `push` calls from the same producer is preserved
//! because `push` holds the mutex for the entire append.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Default queue capacity, honored unless overridden at construction.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// Thread-safe bounded FIFO queue with drop-on-full push semantics.
pub struct WorkQueue<T> {
    inner: Mutex<VecDeque<T>>,
    capacity: usize,
    /// 98% of capacity, per the near-full reporting contract.
    threshold: usize,
}

impl<T> WorkQueue<T> {
    /// Creates a queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        WorkQueue {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(4096))),
            capacity,
            threshold: capacity * 98 / 100,
        }
    }

    /// Appends `value` to the back of the queue. Returns `false` without
    /// blocking when the queue is already at capacity.
    pub fn push(&self, value: T) -> bool {
        let mut guard = self.inner.lock();
        if guard.len() >= self.capacity {
            return false;
        }
        guard.push_back(value);
        true
    }

    /// Removes and returns the front element, or `None` if the queue is
    /// empty.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Returns the queue's fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` once the queue holds more than 98% of its capacity.
    pub fn is_almost_full(&self) -> bool {
        self.inner.lock().len() > self.threshold
    }

    /// Current number of queued entries. Exposed for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when the queue currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_fails_once_full() {
        let q = WorkQueue::new(2);
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(!q.push(3));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn pop_preserves_fifo_order() {
        let q = WorkQueue::new(4);
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.try_pop(), Some(1));
        assert_eq!(q.try_pop(), Some(2));
        assert_eq!(q.try_pop(), Some(3));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn near_full_threshold_is_98_percent() {
        let q: WorkQueue<u8> = WorkQueue::new(100);
        for i in 0..98 {
            q.push(i);
        }
        assert!(!q.is_almost_full());
        q.push(98);
        assert!(q.is_almost_full());
    }

    #[test]
    fn empty_queue_pop_returns_none() {
        let q: WorkQueue<u8> = WorkQueue::new(10);
        assert!(q.is_empty());
        assert_eq!(q.try_pop(), None);
    }
}
