//! Core types shared by the queue, the workers and the coordinator

pub mod cancellation;
pub mod error;
pub mod event;

pub use cancellation::{CancellationCallbackGuard, CancellationReason, CancellationToken};
pub use error::{BufferError, Result};
pub use event::{EventHook, EventKind, WorkerEvent, WorkerId, WorkerRole};
