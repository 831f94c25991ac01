//! Producer side of the buffer

use super::{emit, finish, WorkerReport};
use crate::core::{CancellationToken, EventHook, EventKind, WorkerId};
use crate::queue::BoundedQueue;
use std::time::Duration;

/// Inserts an assigned sequence of items, in order, into a [`BoundedQueue`]
///
/// # Example
///
/// ```rust
/// use rust_bounded_buffer::prelude::*;
///
/// # fn main() -> Result<()> {
/// let queue = BoundedQueue::new(4)?;
/// let token = CancellationToken::new();
///
/// let report = ProducerWorker::new(WorkerId::producer(0), vec![1u64, 2, 3]).run(&queue, &token);
///
/// assert!(report.is_complete());
/// assert_eq!(queue.size(), 3);
/// # Ok(())
/// # }
/// ```
pub struct ProducerWorker<T> {
    id: WorkerId,
    source: Vec<T>,
    delay: Option<Duration>,
    hook: Option<EventHook<T>>,
}

impl<T> std::fmt::Debug for ProducerWorker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerWorker")
            .field("id", &self.id)
            .field("assigned", &self.source.len())
            .field("delay", &self.delay)
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl<T: Clone + Send + 'static> ProducerWorker<T> {
    /// Create a producer for `source`
    pub fn new(id: WorkerId, source: impl IntoIterator<Item = T>) -> Self {
        Self {
            id,
            source: source.into_iter().collect(),
            delay: None,
            hook: None,
        }
    }

    /// Pause for `delay` after each successful insert
    ///
    /// Only useful to make blocking visible; correctness never depends on it.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report progress to `hook`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_hook(mut self, hook: EventHook<T>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Worker identity
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Number of items assigned to this producer
    pub fn assigned(&self) -> usize {
        self.source.len()
    }

    /// Insert every assigned item, stopping early if `token` is cancelled
    ///
    /// The produced count only advances after an insert has committed.
    pub fn run(self, queue: &BoundedQueue<T>, token: &CancellationToken) -> WorkerReport {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("producer", worker = %self.id).entered();

        let Self {
            id,
            source,
            delay,
            hook,
        } = self;
        let assigned = source.len();
        let mut produced = 0;

        for item in source {
            let echo = hook.as_ref().map(|_| item.clone());
            if queue.insert_cancellable(item, token).is_err() {
                break;
            }
            produced += 1;

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_produced(id);

            if let Some(item) = echo.as_ref() {
                emit(hook.as_ref(), id, EventKind::Produced(item));
            }

            if let Some(delay) = delay {
                if produced < assigned && !token.sleep(delay) {
                    break;
                }
            }
        }

        let report = WorkerReport::new(id, assigned, produced);
        finish(hook.as_ref(), &report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkerEvent;
    use crate::worker::WorkerStatus;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_producer_inserts_in_order() {
        let queue = BoundedQueue::new(10).unwrap();
        let token = CancellationToken::new();

        let report = ProducerWorker::new(WorkerId::producer(0), 1..=5).run(&queue, &token);

        assert_eq!(report.processed, 5);
        assert_eq!(report.status, WorkerStatus::Completed);
        let drained: Vec<_> = (0..5).map(|_| queue.remove()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_producer_blocks_on_full_queue() {
        let queue = BoundedQueue::new(2).unwrap();
        let token = CancellationToken::new();

        let q = queue.clone();
        let t = token.clone();
        let handle =
            thread::spawn(move || ProducerWorker::new(WorkerId::producer(0), 1..=5).run(&q, &t));

        thread::sleep(Duration::from_millis(100));
        assert!(!handle.is_finished());
        assert_eq!(queue.size(), 2);

        for expected in 1..=5 {
            assert_eq!(queue.remove(), expected);
        }
        let report = handle.join().unwrap();
        assert_eq!(report.processed, 5);
    }

    #[test]
    fn test_cancelled_producer_reports_partial_count() {
        let queue = BoundedQueue::new(2).unwrap();
        let token = CancellationToken::new();

        let q = queue.clone();
        let t = token.clone();
        let handle =
            thread::spawn(move || ProducerWorker::new(WorkerId::producer(0), 1..=5).run(&q, &t));

        thread::sleep(Duration::from_millis(100));
        token.cancel();

        let report = handle.join().unwrap();
        assert_eq!(report.status, WorkerStatus::Cancelled);
        assert_eq!(report.processed, 2);
        assert!(report.processed < report.assigned);
        assert_eq!(queue.size(), 2);
    }

    #[test]
    fn test_delay_is_cut_short_by_cancel() {
        let queue = BoundedQueue::new(10).unwrap();
        let token = CancellationToken::new();

        let q = queue.clone();
        let t = token.clone();
        let handle = thread::spawn(move || {
            ProducerWorker::new(WorkerId::producer(0), 1..=5)
                .with_delay(Duration::from_secs(30))
                .run(&q, &t)
        });

        thread::sleep(Duration::from_millis(100));
        token.cancel();

        let report = handle.join().unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.status, WorkerStatus::Cancelled);
    }

    #[test]
    fn test_hook_sees_every_insert_and_finish() {
        let queue = BoundedQueue::new(10).unwrap();
        let token = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let hook: EventHook<u64> = Arc::new(move |event: &WorkerEvent<'_, u64>| {
            let line = match event.kind {
                EventKind::Produced(item) => format!("{} produced {}", event.worker, item),
                EventKind::Finished { count } => format!("{} finished {}", event.worker, count),
                _ => format!("{} other", event.worker),
            };
            seen_clone.lock().push(line);
        });

        ProducerWorker::new(WorkerId::producer(1), vec![7u64, 8])
            .with_hook(hook)
            .run(&queue, &token);

        assert_eq!(
            *seen.lock(),
            vec!["P2 produced 7", "P2 produced 8", "P2 finished 2"]
        );
    }
}
