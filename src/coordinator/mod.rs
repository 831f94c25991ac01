//! Run orchestration: partition, spawn, await, validate
//!
//! The [`Coordinator`] owns one run at a time. It builds the queue and the
//! sink, hands each producer a contiguous slice of `1..=total_items` and each
//! consumer a removal quota, starts every worker on its own OS thread, then
//! waits for all of them within the configured timeout. Workers still running
//! at the deadline are cancelled and the run is reported as timed out.

mod config;
mod partition;
mod report;

pub use config::RunConfig;
pub use partition::{partition, source_ranges};
pub use report::RunReport;

use crate::core::error::panic_message;
use crate::core::{
    BufferError, CancellationReason, CancellationToken, EventHook, Result, WorkerId,
};
use crate::queue::{BoundedQueue, Sink};
use crate::worker::{ConsumerWorker, ProducerWorker, WorkerReport};
use crossbeam_channel::{RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use uuid::Uuid;

/// Item type moved by coordinated runs
pub type Item = u64;

/// Everything a run leaves behind
#[derive(Debug)]
pub struct RunOutput {
    /// Validation report
    pub report: RunReport,
    /// Items recorded by consumers, in append order
    pub sink: Vec<Item>,
}

/// Completion signal: the worker and whether it panicked
type Done = (WorkerId, bool);

/// A spawned worker thread that always signals completion, even on panic
struct WorkerThread {
    id: WorkerId,
    handle: JoinHandle<thread::Result<WorkerReport>>,
}

impl WorkerThread {
    fn spawn<F>(name: String, id: WorkerId, done: Sender<Done>, body: F) -> Result<Self>
    where
        F: FnOnce() -> WorkerReport + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(body));
                let _ = done.send((id, outcome.is_err()));
                outcome
            })
            .map_err(|e| {
                BufferError::spawn_with_source(id.to_string(), "Cannot create worker thread", e)
            })?;

        Ok(Self { id, handle })
    }

    fn join(self) -> Result<WorkerReport> {
        match self.handle.join() {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(payload)) | Err(payload) => Err(BufferError::worker_panic(
                self.id.to_string(),
                panic_message(payload.as_ref()),
            )),
        }
    }
}

/// Orchestrates producer/consumer runs over a [`BoundedQueue`]
///
/// # Example
///
/// ```rust
/// use rust_bounded_buffer::prelude::*;
///
/// # fn main() -> Result<()> {
/// let coordinator = Coordinator::new(RunConfig::new(5, 2, 2, 10))?;
/// let output = coordinator.run()?;
///
/// assert!(output.report.success);
/// assert_eq!(output.sink.len(), 10);
/// # Ok(())
/// # }
/// ```
pub struct Coordinator {
    config: RunConfig,
    hook: Option<EventHook<Item>>,
    token: CancellationToken,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl Coordinator {
    /// Create a coordinator, rejecting invalid configurations up front
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            hook: None,
            token: CancellationToken::new(),
        })
    }

    /// Forward every worker event to `hook`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_hook(mut self, hook: EventHook<Item>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// The configuration runs use
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Cancel the current run, and every later one, from any thread
    ///
    /// Workers stop at their next blocking point; the run still returns a
    /// report with `cancelled` set.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel()`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Execute one run and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned or a worker
    /// panics. Timeouts and cancellation are reported in [`RunReport`].
    pub fn run(&self) -> Result<RunOutput> {
        let config = &self.config;
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let deadline = started.checked_add(config.timeout);

        log::info!(
            "run {}: capacity={}, producers={}, consumers={}, items={}",
            run_id,
            config.capacity,
            config.num_producers,
            config.num_consumers,
            config.total_items
        );
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_run_start(
            config.capacity,
            config.num_producers,
            config.num_consumers,
        );

        let queue = BoundedQueue::new(config.capacity)?;
        let sink = Sink::new();
        let run_token = self.token.child();
        let (done_tx, done_rx) = crossbeam_channel::unbounded();

        let mut producers = Vec::with_capacity(config.num_producers);
        for (index, range) in source_ranges(config.total_items, config.num_producers)
            .into_iter()
            .enumerate()
        {
            let id = WorkerId::producer(index);
            let mut worker = ProducerWorker::new(id, range);
            if let Some(delay) = config.producer_delay {
                worker = worker.with_delay(delay);
            }
            if let Some(hook) = &self.hook {
                worker = worker.with_hook(Arc::clone(hook));
            }

            let queue = queue.clone();
            let token = run_token.child();
            let name = format!("{}-producer-{}", config.thread_name_prefix, index + 1);
            match WorkerThread::spawn(name, id, done_tx.clone(), move || {
                worker.run(&queue, &token)
            }) {
                Ok(thread) => producers.push(thread),
                Err(e) => return Err(Self::abort(&run_token, producers, Vec::new(), e)),
            }
        }

        let mut consumers = Vec::with_capacity(config.num_consumers);
        for (index, target) in partition(config.total_items, config.num_consumers)
            .into_iter()
            .enumerate()
        {
            let id = WorkerId::consumer(index);
            let mut worker = ConsumerWorker::new(id, target);
            if let Some(delay) = config.consumer_delay {
                worker = worker.with_delay(delay);
            }
            if let Some(hook) = &self.hook {
                worker = worker.with_hook(Arc::clone(hook));
            }

            let queue = queue.clone();
            let sink = sink.clone();
            let token = run_token.child();
            let name = format!("{}-consumer-{}", config.thread_name_prefix, index + 1);
            match WorkerThread::spawn(name, id, done_tx.clone(), move || {
                worker.run(&queue, &sink, &token)
            }) {
                Ok(thread) => consumers.push(thread),
                Err(e) => return Err(Self::abort(&run_token, producers, consumers, e)),
            }
        }
        drop(done_tx);

        let mut remaining = producers.len() + consumers.len();
        let mut timed_out = false;
        while remaining > 0 {
            let signal = match deadline {
                Some(deadline) => done_rx.recv_deadline(deadline),
                None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match signal {
                Ok((id, panicked)) => {
                    remaining -= 1;
                    if panicked && !run_token.is_cancelled() {
                        log::error!(
                            "run {}: worker {} panicked, cancelling the rest",
                            run_id,
                            id
                        );
                        run_token.cancel_with_reason(CancellationReason::Custom(format!(
                            "worker {} panicked",
                            id
                        )));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    timed_out = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if timed_out {
            log::warn!(
                "run {}: {} workers still running after {:?}, cancelling",
                run_id,
                remaining,
                config.timeout
            );
            run_token.cancel_with_reason(CancellationReason::Timeout(config.timeout));
        }

        let producer_reports = Self::join_all(producers);
        let consumer_reports = Self::join_all(consumers);
        let (producers, consumers) = match (producer_reports, consumer_reports) {
            (Ok(producers), Ok(consumers)) => (producers, consumers),
            (Err(e), _) | (_, Err(e)) => {
                log::error!(
                    "run {}: {}; sink holds {} of {} items, timed_out={}",
                    run_id,
                    e,
                    sink.len(),
                    config.total_items,
                    timed_out
                );
                return Err(e);
            }
        };

        let total_produced = producers.iter().map(|r| r.processed).sum();
        let total_consumed = consumers.iter().map(|r| r.processed).sum();
        let sink_size = sink.len();
        let queue_empty_at_end = queue.is_empty();
        let elapsed = started.elapsed();
        let cancelled = !timed_out && self.token.is_cancelled();

        let report = RunReport {
            run_id,
            expected_items: config.total_items,
            total_produced,
            total_consumed,
            sink_size,
            queue_empty_at_end,
            timed_out,
            cancelled,
            success: RunReport::counts_agree(
                config.total_items,
                total_produced,
                total_consumed,
                sink_size,
                queue_empty_at_end,
            ),
            peak_queue_len: queue.stats().peak_len,
            elapsed_ms: elapsed.as_millis() as u64,
            producers,
            consumers,
        };

        if report.success {
            log::info!("run {}: moved {} items in {:?}", run_id, sink_size, elapsed);
        } else {
            log::warn!(
                "run {}: produced {}, consumed {}, sink {}, expected {}",
                run_id,
                report.total_produced,
                report.total_consumed,
                report.sink_size,
                report.expected_items
            );
        }
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_run_complete(report.success, elapsed);

        Ok(RunOutput {
            report,
            sink: sink.take(),
        })
    }

    /// Join every thread, then surface the first panic if any
    fn join_all(threads: Vec<WorkerThread>) -> Result<Vec<WorkerReport>> {
        let results: Vec<_> = threads.into_iter().map(WorkerThread::join).collect();
        results.into_iter().collect()
    }

    fn abort(
        run_token: &CancellationToken,
        producers: Vec<WorkerThread>,
        consumers: Vec<WorkerThread>,
        error: BufferError,
    ) -> BufferError {
        log::error!("aborting run: {}", error);
        run_token.cancel_with_reason(CancellationReason::Custom(error.to_string()));
        for thread in producers.into_iter().chain(consumers) {
            if let Err(e) = thread.join() {
                log::error!("while aborting: {}", e);
            }
        }
        error
    }
}
