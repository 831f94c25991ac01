//! Append-only result collection shared by consumers.

use parking_lot::Mutex;
use std::sync::Arc;

/// Append-only destination for consumed items
///
/// Guarded by its own lock, independent of the queue's, so recording a result
/// never contends with queue traffic. Appends from different consumers may
/// interleave in any order.
pub struct Sink<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> std::fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("len", &self.len()).finish()
    }
}

impl<T> Default for Sink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sink<T> {
    /// Create an empty sink
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append one item
    pub fn push(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Number of items recorded so far
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Move every recorded item out, leaving the sink empty
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock())
    }
}

impl<T: Clone> Sink<T> {
    /// Copy of the items recorded so far, in append order
    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().clone()
    }
}
