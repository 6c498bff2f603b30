use log::{debug, trace};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct QueueState<T> {
    items: VecDeque<T>,
    shutdown: bool,
}

/// Unbounded FIFO shared by any number of producers and a single consumer.
///
/// Producers never block beyond the short critical section of `enqueue`. The
/// consumer blocks in `dequeue` until an item arrives or shutdown is signaled.
/// Items enqueued before `signal_shutdown` are still handed out; `dequeue`
/// returns `None` only once the queue is both shut down and empty.
pub struct HandoffQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandoffQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
        }
    }

    // A panicking producer cannot leave the deque half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item` to the tail and wakes the consumer.
    pub fn enqueue(&self, item: T) {
        let depth = {
            let mut state = self.lock();
            state.items.push_back(item);
            state.items.len()
        };
        trace!("Item enqueued, depth {}", depth);
        self.available.notify_one();
    }

    /// Blocks until an item is available and returns the oldest one.
    /// Returns `None` (end of stream) once shutdown was signaled and every
    /// pending item has been handed out.
    pub fn dequeue(&self) -> Option<T> {
        let state = self.lock();
        let mut state = self
            .available
            .wait_while(state, |s| s.items.is_empty() && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        state.items.pop_front()
    }

    /// Marks the stream as finished and wakes every blocked consumer.
    /// Pending items are kept.
    pub fn signal_shutdown(&self) {
        let pending = {
            let mut state = self.lock();
            state.shutdown = true;
            state.items.len()
        };
        debug!("Shutdown signaled with {} pending items", pending);
        self.available.notify_all();
    }

    /// Drops pending items and clears the shutdown flag. Only call it while
    /// no consumer is running.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.items.clear();
        state.shutdown = false;
    }

    /// Number of pending items (queue depth).
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }
}
