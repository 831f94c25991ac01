//! Producer and consumer workers
//!
//! A worker is a plain value that is moved onto its own thread and consumed by
//! `run`. Its progress counter is a local of that run, so nobody else can
//! touch it; the final count comes back in the returned [`WorkerReport`].

mod consumer;
mod producer;

pub use consumer::ConsumerWorker;
pub use producer::ProducerWorker;

use crate::core::{EventHook, EventKind, WorkerEvent, WorkerId};
use serde::{Deserialize, Serialize};

/// How a worker run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    /// Every assigned item was processed
    Completed,
    /// Cancellation was observed before the assignment was exhausted
    Cancelled,
}

/// Final progress of one worker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Worker identity
    pub worker: WorkerId,
    /// Items the worker was asked to process
    pub assigned: usize,
    /// Items actually inserted (producers) or removed (consumers)
    pub processed: usize,
    /// How the run ended
    pub status: WorkerStatus,
}

impl WorkerReport {
    fn new(worker: WorkerId, assigned: usize, processed: usize) -> Self {
        let status = if processed == assigned {
            WorkerStatus::Completed
        } else {
            WorkerStatus::Cancelled
        };
        Self {
            worker,
            assigned,
            processed,
            status,
        }
    }

    /// Whether the worker processed its whole assignment
    pub fn is_complete(&self) -> bool {
        self.status == WorkerStatus::Completed
    }
}

fn emit<T>(hook: Option<&EventHook<T>>, worker: WorkerId, kind: EventKind<'_, T>) {
    if let Some(hook) = hook {
        hook(&WorkerEvent::now(worker, kind));
    }
}

fn finish<T>(hook: Option<&EventHook<T>>, report: &WorkerReport) {
    let count = report.processed;
    match report.status {
        WorkerStatus::Completed => {
            log::debug!("{} finished, {} items", report.worker, count);
            emit(hook, report.worker, EventKind::Finished { count });
        }
        WorkerStatus::Cancelled => {
            log::debug!(
                "{} cancelled after {}/{} items",
                report.worker,
                count,
                report.assigned
            );
            emit(hook, report.worker, EventKind::Cancelled { count });
        }
    }
}
