//! # Rust Bounded Buffer
//!
//! A bounded blocking buffer shared by any number of producer and consumer
//! threads, with cooperative cancellation and a coordinator that runs and
//! validates complete producer/consumer sessions.
//!
//! ## Features
//!
//! - **Bounded Queue**: Fixed-capacity FIFO, one lock, broadcast wakeups, predicate re-checks
//! - **Cancellation**: Blocked inserts and removes abort cleanly when their token fires
//! - **Workers**: Producers insert an assigned sequence, consumers drain a fixed quota into a shared sink
//! - **Coordinator**: Deterministic partitioning, bounded wait, timeout reporting, post-run validation
//! - **Event Hook**: Per-item progress callbacks with worker identity and timestamp; the core never prints
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_bounded_buffer::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let output = Coordinator::new(RunConfig::new(5, 2, 2, 10))?.run()?;
//!
//! assert!(output.report.success);
//! assert_eq!(output.report.total_consumed, 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the Queue Directly
//!
//! ```rust
//! use rust_bounded_buffer::prelude::*;
//! use std::thread;
//!
//! # fn main() -> Result<()> {
//! let queue = BoundedQueue::new(1)?;
//! let token = CancellationToken::new();
//!
//! queue.insert(1u32);
//!
//! // Blocks: the queue is full
//! let q = queue.clone();
//! let t = token.clone();
//! let blocked = thread::spawn(move || q.insert_cancellable(2, &t));
//!
//! token.cancel();
//! assert!(blocked.join().unwrap().is_err());
//! assert_eq!(queue.size(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress Events
//!
//! ```rust
//! use rust_bounded_buffer::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let hook: EventHook<u64> = Arc::new(|event: &WorkerEvent<'_, u64>| {
//!     if let EventKind::Consumed(item) = event.kind {
//!         println!("[{}] {} consumed {}", event.timestamp.format("%H:%M:%S%.3f"), event.worker, item);
//!     }
//! });
//!
//! Coordinator::new(RunConfig::sample())?.with_hook(hook).run()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod core;
pub mod prelude;
pub mod queue;
#[cfg(feature = "tracing")]
pub mod tracing;
pub mod worker;

pub use coordinator::{Coordinator, RunConfig, RunOutput, RunReport};
pub use core::{
    BufferError, CancellationReason, CancellationToken, EventHook, EventKind, Result,
    WorkerEvent, WorkerId, WorkerRole,
};
pub use queue::{BoundedQueue, QueueError, Sink};
pub use worker::{ConsumerWorker, ProducerWorker, WorkerReport, WorkerStatus};
