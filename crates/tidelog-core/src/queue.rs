//! Fixed-capacity FIFO shared between producers and the writer.
//!
//! Producers block in [`BoundedQueue::push`] while the queue is full; nothing
//! is ever dropped or grown. Closing the queue releases every blocked party.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Blocking bounded FIFO.
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items (minimum 1).
    ///
    /// Storage grows with use; the capacity is only a limit.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Append an item, waiting while the queue is full.
    ///
    /// Returns the item back if the queue is (or becomes) closed.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut inner = self.inner.lock();
        while inner.items.len() >= self.capacity && !inner.closed {
            self.not_full.wait(&mut inner);
        }
        if inner.closed {
            return Err(item);
        }
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the oldest item, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// Remove the oldest item if there is one.
    pub fn try_pop(&self) -> Option<T> {
        let item = self.inner.lock().items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Reject further pushes and wake everyone waiting.
    ///
    /// Items already queued can still be popped.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new(3);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.is_empty());
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let queue: BoundedQueue<u8> = BoundedQueue::new(0);
        assert_eq!(queue.capacity(), 1);
    }

    #[test]
    fn test_push_blocks_while_full() {
        let queue = Arc::new(BoundedQueue::new(1));
        queue.push("first").unwrap();

        let pushed = Arc::new(AtomicBool::new(false));
        let handle = {
            let queue = Arc::clone(&queue);
            let pushed = Arc::clone(&pushed);
            thread::spawn(move || {
                queue.push("second").unwrap();
                pushed.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!pushed.load(Ordering::SeqCst), "push should block while full");
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.pop(), Some("first"));
        handle.join().unwrap();
        assert!(pushed.load(Ordering::SeqCst));
        assert_eq!(queue.pop(), Some("second"));
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue = Arc::new(BoundedQueue::new(2));
        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(50));
        queue.push(42).unwrap();
        assert_eq!(handle.join().unwrap(), Some(42));
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let queue = BoundedQueue::new(usize::MAX);
        assert_eq!(queue.capacity(), usize::MAX);
        queue.push("only").unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_pop(), Some("only"));
    }

    #[test]
    fn test_close_releases_blocked_producer() {
        let queue = Arc::new(BoundedQueue::new(1));
        queue.push(1).unwrap();
        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push(2))
        };
        thread::sleep(Duration::from_millis(50));
        queue.close();
        assert_eq!(handle.join().unwrap(), Err(2));
        assert!(queue.is_closed());

        // Queued items survive the close, then pop reports the end.
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_many_producers_no_loss() {
        let queue = Arc::new(BoundedQueue::new(4));
        let producers: Vec<_> = (0..8)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..250 {
                        queue.push(p * 1000 + i).unwrap();
                    }
                })
            })
            .collect();

        let mut seen = Vec::new();
        while seen.len() < 2000 {
            seen.push(queue.pop().unwrap());
        }
        for p in producers {
            p.join().unwrap();
        }

        // Per-producer order is preserved.
        for p in 0..8 {
            let mine: Vec<_> = seen.iter().filter(|v| **v / 1000 == p).copied().collect();
            let expected: Vec<_> = (0..250).map(|i| p * 1000 + i).collect();
            assert_eq!(mine, expected);
        }
    }
}
