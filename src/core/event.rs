//! Worker identities and the progress event hook
//!
//! The core never prints. Front ends register an [`EventHook`] and render the
//! events however they like.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which side of the buffer a worker sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerRole {
    /// Inserts items into the queue
    Producer,
    /// Removes items from the queue into the sink
    Consumer,
}

impl WorkerRole {
    fn prefix(self) -> char {
        match self {
            WorkerRole::Producer => 'P',
            WorkerRole::Consumer => 'C',
        }
    }
}

/// Identity label of a worker, displayed as `P1`, `P2`, `C1`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId {
    /// Role of the worker
    pub role: WorkerRole,
    /// Zero-based index within its role
    pub index: usize,
}

impl WorkerId {
    /// Identity of the `index`-th producer (zero-based)
    pub fn producer(index: usize) -> Self {
        Self {
            role: WorkerRole::Producer,
            index,
        }
    }

    /// Identity of the `index`-th consumer (zero-based)
    pub fn consumer(index: usize) -> Self {
        Self {
            role: WorkerRole::Consumer,
            index,
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.index + 1)
    }
}

/// What happened
///
/// Hooks run on the worker thread after the queue lock is released, so events
/// from different workers are not ordered against each other: a consumer may
/// report `Consumed(x)` before the producer's `Produced(x)` arrives. Events
/// from a single worker always arrive in that worker's order.
#[derive(Debug)]
pub enum EventKind<'a, T> {
    /// An item was committed to the queue; emitted after the insert returns,
    /// outside the queue lock
    Produced(&'a T),
    /// An item was removed from the queue (emitted just before it is appended to the sink)
    Consumed(&'a T),
    /// The worker processed everything it was assigned
    Finished {
        /// Items processed
        count: usize,
    },
    /// The worker observed cancellation and stopped early
    Cancelled {
        /// Items processed before stopping
        count: usize,
    },
}

/// A progress event emitted by a worker thread
#[derive(Debug)]
pub struct WorkerEvent<'a, T> {
    /// Worker that emitted the event
    pub worker: WorkerId,
    /// Wall-clock time the event was observed
    pub timestamp: DateTime<Local>,
    /// Event payload
    pub kind: EventKind<'a, T>,
}

impl<'a, T> WorkerEvent<'a, T> {
    pub(crate) fn now(worker: WorkerId, kind: EventKind<'a, T>) -> Self {
        Self {
            worker,
            timestamp: Local::now(),
            kind,
        }
    }
}

/// Callback invoked synchronously on the worker thread for every event
///
/// Hooks run outside the queue and sink locks; keep them short, since a slow
/// hook delays the worker that calls it.
pub type EventHook<T> = Arc<dyn Fn(&WorkerEvent<'_, T>) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_id_display_is_one_based() {
        assert_eq!(WorkerId::producer(0).to_string(), "P1");
        assert_eq!(WorkerId::consumer(2).to_string(), "C3");
    }

    #[test]
    fn test_worker_id_roundtrips_through_json() {
        let id = WorkerId::consumer(1);
        let json = serde_json::to_string(&id).unwrap();
        let back: WorkerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_event_carries_timestamp() {
        let before = Local::now();
        let item = 7u64;
        let event = WorkerEvent::now(WorkerId::producer(0), EventKind::Produced(&item));
        assert!(event.timestamp >= before);
        assert!(matches!(event.kind, EventKind::Produced(&7)));
    }
}
