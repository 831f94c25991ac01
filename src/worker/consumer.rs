//! Consumer side of the buffer

use super::{emit, finish, WorkerReport};
use crate::core::{CancellationToken, EventHook, EventKind, WorkerId};
use crate::queue::{BoundedQueue, Sink};
use std::time::Duration;

/// Removes a fixed number of items from a [`BoundedQueue`] into a shared [`Sink`]
pub struct ConsumerWorker<T> {
    id: WorkerId,
    target: usize,
    delay: Option<Duration>,
    hook: Option<EventHook<T>>,
}

impl<T> std::fmt::Debug for ConsumerWorker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerWorker")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("delay", &self.delay)
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl<T: Send + 'static> ConsumerWorker<T> {
    /// Create a consumer that removes exactly `target` items
    pub fn new(id: WorkerId, target: usize) -> Self {
        Self {
            id,
            target,
            delay: None,
            hook: None,
        }
    }

    /// Pause for `delay` after each recorded item
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

    /// Number of items this consumer will remove
    pub fn target(&self) -> usize {
        self.target
    }

    /// Remove `target` items into `sink`, stopping early if `token` is cancelled
    pub fn run(
        self,
        queue: &BoundedQueue<T>,
        sink: &Sink<T>,
        token: &CancellationToken,
    ) -> WorkerReport {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("consumer", worker = %self.id).entered();

        let mut consumed = 0;

        while consumed < self.target {
            let item = match queue.remove_cancellable(token) {
                Ok(item) => item,
                Err(_) => break,
            };

            emit(self.hook.as_ref(), self.id, EventKind::Consumed(&item));
            sink.push(item);
            consumed += 1;

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_consumed(self.id);

            if let Some(delay) = self.delay {
                if consumed < self.target && !token.sleep(delay) {
                    break;
                }
            }
        }

        let report = WorkerReport::new(self.id, self.target, consumed);
        finish(self.hook.as_ref(), &report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkerEvent;
    use crate::worker::WorkerStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_consumer_consumes_all_items() {
        let queue = BoundedQueue::new(10).unwrap();
        let sink = Sink::new();
        let token = CancellationToken::new();
        for i in 1..=5 {
            queue.insert(i);
        }

        let report = ConsumerWorker::new(WorkerId::consumer(0), 5).run(&queue, &sink, &token);

        assert_eq!(report.processed, 5);
        assert!(report.is_complete());
        assert_eq!(sink.snapshot(), vec![1, 2, 3, 4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_consumer_leaves_surplus_in_queue() {
        let queue = BoundedQueue::new(10).unwrap();
        let sink = Sink::new();
        let token = CancellationToken::new();
        for i in 1..=5 {
            queue.insert(i);
        }

        ConsumerWorker::new(WorkerId::consumer(0), 3).run(&queue, &sink, &token);

        assert_eq!(sink.len(), 3);
        assert_eq!(queue.size(), 2);
        assert_eq!(queue.remove(), 4);
    }

    #[test]
    fn test_consumer_blocks_when_queue_empty() {
        let queue = BoundedQueue::new(10).unwrap();
        let sink = Sink::new();
        let token = CancellationToken::new();

        let q = queue.clone();
        let s = sink.clone();
        let t = token.clone();
        let handle =
            thread::spawn(move || ConsumerWorker::new(WorkerId::consumer(0), 3).run(&q, &s, &t));

        thread::sleep(Duration::from_millis(100));
        assert!(!handle.is_finished());
        assert!(sink.is_empty());

        queue.insert(1);
        queue.insert(2);
        queue.insert(3);

        let report = handle.join().unwrap();
        assert_eq!(report.processed, 3);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_cancelled_consumer_reports_partial_count() {
        let queue = BoundedQueue::new(10).unwrap();
        let sink = Sink::new();
        let token = CancellationToken::new();
        queue.insert(1);

        let q = queue.clone();
        let s = sink.clone();
        let t = token.clone();
        let handle =
            thread::spawn(move || ConsumerWorker::new(WorkerId::consumer(0), 4).run(&q, &s, &t));

        thread::sleep(Duration::from_millis(100));
        token.cancel();

        let report = handle.join().unwrap();
        assert_eq!(report.status, WorkerStatus::Cancelled);
        assert_eq!(report.processed, 1);
        assert_eq!(sink.snapshot(), vec![1]);
    }

    #[test]
    fn test_hook_counts_consumed_events() {
        let queue = BoundedQueue::new(10).unwrap();
        let sink = Sink::new();
        let token = CancellationToken::new();
        for i in 0..4u32 {
            queue.insert(i);
        }

        let consumed = Arc::new(AtomicUsize::new(0));
        let consumed_clone = Arc::clone(&consumed);
        let hook: EventHook<u32> = Arc::new(move |event: &WorkerEvent<'_, u32>| {
            if let EventKind::Consumed(_) = event.kind {
                consumed_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        ConsumerWorker::new(WorkerId::consumer(0), 4)
            .with_hook(hook)
            .run(&queue, &sink, &token);

        assert_eq!(consumed.load(Ordering::SeqCst), 4);
    }
}
