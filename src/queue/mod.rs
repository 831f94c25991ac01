//! The bounded blocking queue and the shared result sink.
//!
//! - [`BoundedQueue`]: fixed-capacity FIFO shared by every producer and
//!   consumer, one lock, broadcast wakeups
//! - [`Sink`]: append-only result collection behind its own independent lock
//!
//! Blocking calls come in three flavours, mirroring the usual channel API:
//! plain (`insert`/`remove`, wait forever), cancellable (wait until a
//! [`CancellationToken`](crate::CancellationToken) fires) and timed. Failed
//! inserts always hand the item back inside the error.

mod bounded;
mod sink;

pub use bounded::BoundedQueue;
pub use sink::Sink;

use serde::{Deserialize, Serialize};

/// Result type for queue operations
pub type QueueResult<T, I> = std::result::Result<T, QueueError<I>>;

/// Reasons a queue operation did not complete
///
/// `I` is the item type for operations that hand the item back; removal
/// errors use `QueueError<T>` too but never carry an item.
#[derive(Debug, PartialEq, Eq)]
pub enum QueueError<I> {
    /// Non-blocking insert found the queue full
    Full(I),
    /// Non-blocking remove found the queue empty
    Empty,
    /// Cancellation observed while blocked; queue state was not modified
    Cancelled(Option<I>),
    /// A timed operation expired; queue state was not modified
    Timeout(Option<I>),
}

impl<I> QueueError<I> {
    /// Recover the item a failed insert was carrying
    pub fn into_item(self) -> Option<I> {
        match self {
            QueueError::Full(item) => Some(item),
            QueueError::Cancelled(item) | QueueError::Timeout(item) => item,
            QueueError::Empty => None,
        }
    }

    /// Whether this error is a cooperative stop rather than a capacity condition
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueueError::Cancelled(_))
    }
}

impl<I> std::fmt::Display for QueueError<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Full(_) => write!(f, "queue is full"),
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::Cancelled(_) => write!(f, "operation cancelled"),
            QueueError::Timeout(_) => write!(f, "operation timed out"),
        }
    }
}

impl<I: std::fmt::Debug> std::error::Error for QueueError<I> {}

/// Point-in-time counters of a [`BoundedQueue`], read under its lock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Items committed since construction
    pub total_inserted: u64,
    /// Items removed since construction
    pub total_removed: u64,
    /// Largest length ever observed; never exceeds the capacity
    pub peak_len: usize,
}

impl QueueStats {
    /// Items currently held according to the counters
    pub fn in_flight(&self) -> u64 {
        self.total_inserted - self.total_removed
    }
}
