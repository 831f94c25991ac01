//! Bounded FIFO queue with blocking insert and remove.

use super::{QueueError, QueueResult, QueueStats};
use crate::core::{BufferError, CancellationCallbackGuard, CancellationToken, Result};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct State<T> {
    items: VecDeque<T>,
    stats: QueueStats,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> Shared<T> {
    fn wake_all(&self) {
        // Taking the lock orders this broadcast after any waiter's predicate check.
        let _state = self.state.lock();
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

/// Waits on `condvar`, returning true if `deadline` passed.
fn wait_deadline<T>(
    condvar: &Condvar,
    state: &mut MutexGuard<'_, State<T>>,
    deadline: Option<Instant>,
) -> bool {
    match deadline {
        Some(deadline) => condvar.wait_until(state, deadline).timed_out(),
        None => {
            condvar.wait(state);
            false
        }
    }
}

/// A fixed-capacity FIFO queue shared by any number of producers and consumers.
///
/// All state sits behind a single mutex, so inserts and removes are totally
/// ordered and items leave in exactly the order they were committed. Every
/// state change wakes *all* waiters of the opposite kind; each waiter re-checks
/// its predicate and only the first to reacquire the lock proceeds.
///
/// Cloning the queue yields another handle to the same buffer.
///
/// # Example
///
/// ```rust
/// use rust_bounded_buffer::queue::{BoundedQueue, QueueError};
///
/// # fn main() -> rust_bounded_buffer::Result<()> {
/// let queue = BoundedQueue::new(2)?;
/// queue.insert(1);
/// queue.insert(2);
///
/// // Full: the item comes back instead of blocking
/// assert_eq!(queue.try_insert(3), Err(QueueError::Full(3)));
///
/// assert_eq!(queue.remove(), 1);
/// assert_eq!(queue.remove(), 2);
/// # Ok(())
/// # }
/// ```
pub struct BoundedQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.shared.capacity)
            .field("len", &self.size())
            .finish()
    }
}

impl<T> BoundedQueue<T> {
    /// Creates a new bounded queue with the specified capacity.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::invalid_config(
                "capacity",
                "Queue capacity must be greater than 0",
            ));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    items: VecDeque::with_capacity(capacity),
                    stats: QueueStats::default(),
                }),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Returns the maximum capacity of this queue.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Appends `item`, blocking while the queue is full.
    ///
    /// Returns once the item is committed.
    pub fn insert(&self, item: T) {
        let mut state = self.shared.state.lock();
        while state.items.len() >= self.shared.capacity {
            self.shared.not_full.wait(&mut state);
        }
        self.push_locked(&mut state, item);
    }

    /// Removes the head item, blocking while the queue is empty.
    pub fn remove(&self) -> T {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(item) = self.pop_locked(&mut state) {
                return item;
            }
            self.shared.not_empty.wait(&mut state);
        }
    }

    /// Attempts to append `item` without blocking.
    pub fn try_insert(&self, item: T) -> QueueResult<(), T> {
        let mut state = self.shared.state.lock();
        if state.items.len() >= self.shared.capacity {
            return Err(QueueError::Full(item));
        }
        self.push_locked(&mut state, item);
        Ok(())
    }

    /// Attempts to remove the head item without blocking.
    pub fn try_remove(&self) -> QueueResult<T, T> {
        let mut state = self.shared.state.lock();
        self.pop_locked(&mut state).ok_or(QueueError::Empty)
    }

    /// Appends `item`, blocking for at most `timeout` while the queue is full.
    ///
    /// A timeout too large to represent as a deadline waits without one.
    pub fn insert_timeout(&self, item: T, timeout: Duration) -> QueueResult<(), T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        while state.items.len() >= self.shared.capacity {
            if wait_deadline(&self.shared.not_full, &mut state, deadline)
                && state.items.len() >= self.shared.capacity
            {
                return Err(QueueError::Timeout(Some(item)));
            }
        }
        self.push_locked(&mut state, item);
        Ok(())
    }

    /// Removes the head item, blocking for at most `timeout` while the queue is empty.
    ///
    /// A timeout too large to represent as a deadline waits without one.
    pub fn remove_timeout(&self, timeout: Duration) -> QueueResult<T, T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        loop {
            if let Some(item) = self.pop_locked(&mut state) {
                return Ok(item);
            }
            if wait_deadline(&self.shared.not_empty, &mut state, deadline) {
                return self.pop_locked(&mut state).ok_or(QueueError::Timeout(None));
            }
        }
    }

    /// Returns the current number of items.
    pub fn size(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// Returns true if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().items.is_empty()
    }

    /// Returns true if the queue holds `capacity` items.
    pub fn is_full(&self) -> bool {
        self.shared.state.lock().items.len() >= self.shared.capacity
    }

    /// Returns a snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        self.shared.state.lock().stats
    }

    fn push_locked(&self, state: &mut State<T>, item: T) {
        state.items.push_back(item);
        state.stats.total_inserted += 1;
        state.stats.peak_len = state.stats.peak_len.max(state.items.len());
        self.shared.not_empty.notify_all();
    }

    fn pop_locked(&self, state: &mut State<T>) -> Option<T> {
        let item = state.items.pop_front()?;
        state.stats.total_removed += 1;
        self.shared.not_full.notify_all();
        Some(item)
    }
}

impl<T: Send + 'static> BoundedQueue<T> {
    /// Appends `item`, blocking while the queue is full or until `token` is cancelled.
    ///
    /// On cancellation the queue is left untouched and the item is returned
    /// inside [`QueueError::Cancelled`].
    pub fn insert_cancellable(&self, item: T, token: &CancellationToken) -> QueueResult<(), T> {
        if token.is_cancelled() {
            return Err(QueueError::Cancelled(Some(item)));
        }

        {
            let mut state = self.shared.state.lock();
            if state.items.len() < self.shared.capacity {
                self.push_locked(&mut state, item);
                return Ok(());
            }
        }

        let _wake = self.wake_on_cancel(token);
        let mut state = self.shared.state.lock();
        loop {
            if token.is_cancelled() {
                return Err(QueueError::Cancelled(Some(item)));
            }
            if state.items.len() < self.shared.capacity {
                break;
            }
            self.shared.not_full.wait(&mut state);
        }
        self.push_locked(&mut state, item);
        Ok(())
    }

    /// Removes the head item, blocking while the queue is empty or until `token` is cancelled.
    pub fn remove_cancellable(&self, token: &CancellationToken) -> QueueResult<T, T> {
        if token.is_cancelled() {
            return Err(QueueError::Cancelled(None));
        }

        {
            let mut state = self.shared.state.lock();
            if let Some(item) = self.pop_locked(&mut state) {
                return Ok(item);
            }
        }

        let _wake = self.wake_on_cancel(token);
        let mut state = self.shared.state.lock();
        loop {
            if token.is_cancelled() {
                return Err(QueueError::Cancelled(None));
            }
            if let Some(item) = self.pop_locked(&mut state) {
                return Ok(item);
            }
            self.shared.not_empty.wait(&mut state);
        }
    }

    /// Must be called without holding the state lock: an already cancelled
    /// token runs the callback inline.
    fn wake_on_cancel(&self, token: &CancellationToken) -> CancellationCallbackGuard {
        let shared = Arc::downgrade(&self.shared);
        token.on_cancel(move || {
            if let Some(shared) = shared.upgrade() {
                shared.wake_all();
            }
        })
    }
}
