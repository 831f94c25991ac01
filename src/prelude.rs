//! Convenient re-exports for common types and traits

pub use crate::coordinator::{partition, Coordinator, RunConfig, RunOutput, RunReport};
pub use crate::core::{
    BufferError, CancellationReason, CancellationToken, EventHook, EventKind, Result,
    WorkerEvent, WorkerId, WorkerRole,
};
pub use crate::queue::{BoundedQueue, QueueError, QueueResult, QueueStats, Sink};
pub use crate::worker::{ConsumerWorker, ProducerWorker, WorkerReport, WorkerStatus};
