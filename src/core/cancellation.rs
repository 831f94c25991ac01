//! Cooperative cancellation for blocked workers
//!
//! A [`CancellationToken`] is shared between the coordinator and the workers it
//! spawns. Cancelling a token never interrupts a thread preemptively: blocking
//! queue calls register a wake callback with [`on_cancel()`](CancellationToken::on_cancel)
//! and re-check the token each time they wake.
//!
//! # Example
//!
//! ```rust
//! use rust_bounded_buffer::CancellationToken;
//!
//! let run = CancellationToken::new();
//! let producer = run.child();
//! let consumer = run.child();
//!
//! run.cancel();
//!
//! assert!(producer.is_cancelled());
//! assert!(consumer.is_cancelled());
//! ```

use crossbeam_channel::bounded;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

static NEXT_CALLBACK_ID: AtomicUsize = AtomicUsize::new(1);

fn next_callback_id() -> usize {
    NEXT_CALLBACK_ID.fetch_add(1, Ordering::Relaxed)
}

/// Reason a token was cancelled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancellationReason {
    /// Explicitly cancelled via `cancel()`
    Manual,
    /// Cancelled because a bounded wait expired
    Timeout(Duration),
    /// Cancelled because the parent token was cancelled
    ParentCancelled,
    /// Custom cancellation reason
    Custom(String),
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationReason::Manual => write!(f, "manually cancelled"),
            CancellationReason::Timeout(d) => write!(f, "timeout after {:?}", d),
            CancellationReason::ParentCancelled => write!(f, "parent was cancelled"),
            CancellationReason::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

struct StoredCallback {
    id: usize,
    callback: Box<dyn FnOnce() + Send + Sync>,
}

struct TokenInner {
    cancelled: AtomicBool,
    children: RwLock<Vec<Weak<TokenInner>>>,
    /// Registration and draining both happen under this lock, so a callback
    /// registered concurrently with `cancel()` is either drained or run inline.
    callbacks: Mutex<Vec<StoredCallback>>,
    reason: RwLock<Option<CancellationReason>>,
}

impl TokenInner {
    fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            children: RwLock::new(Vec::new()),
            callbacks: Mutex::new(Vec::new()),
            reason: RwLock::new(None),
        }
    }
}

/// A thread-safe, hierarchical cancellation token
///
/// Clones share state. Children created with [`child()`](Self::child) are
/// cancelled together with their parent but can also be cancelled on their own.
///
/// ```rust
/// use rust_bounded_buffer::{CancellationReason, CancellationToken};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// token.cancel_with_reason(CancellationReason::Timeout(Duration::from_secs(30)));
///
/// assert!(token.is_cancelled());
/// assert_eq!(
///     token.reason(),
///     Some(CancellationReason::Timeout(Duration::from_secs(30)))
/// );
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

impl CancellationToken {
    /// Create a new, uncancelled token
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner::new()),
        }
    }

    /// Create a child token linked to this one
    ///
    /// If this token is already cancelled the child starts cancelled.
    pub fn child(&self) -> Self {
        let child = CancellationToken {
            inner: Arc::new(TokenInner::new()),
        };

        {
            let mut children = self.inner.children.write();
            children.retain(|weak| weak.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }

        if self.is_cancelled() {
            child.cancel_with_reason(CancellationReason::ParentCancelled);
        }

        child
    }

    /// Cancel with [`CancellationReason::Manual`]
    pub fn cancel(&self) {
        self.cancel_with_reason(CancellationReason::Manual);
    }

    /// Cancel this token and every child
    ///
    /// Idempotent: only the first call records its reason and runs callbacks.
    pub fn cancel_with_reason(&self, reason: CancellationReason) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        *self.inner.reason.write() = Some(reason);

        let callbacks: Vec<_> = self.inner.callbacks.lock().drain(..).collect();
        for stored in callbacks {
            (stored.callback)();
        }

        let children: Vec<_> = self
            .inner
            .children
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for child_inner in children {
            CancellationToken { inner: child_inner }
                .cancel_with_reason(CancellationReason::ParentCancelled);
        }
    }

    /// Lock-free cancellation check
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// The reason recorded by the first cancellation, if any
    pub fn reason(&self) -> Option<CancellationReason> {
        self.inner.reason.read().clone()
    }

    /// Register a callback to run once when the token is cancelled
    ///
    /// Runs the callback immediately, on the calling thread, if the token is
    /// already cancelled. The callback is unregistered when the returned guard
    /// is dropped.
    ///
    /// The callback must not block on locks the registering thread holds while
    /// calling `on_cancel`, since it may run inline.
    pub fn on_cancel<F>(&self, callback: F) -> CancellationCallbackGuard
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        let id = next_callback_id();

        let run_now = {
            let mut callbacks = self.inner.callbacks.lock();
            if self.is_cancelled() {
                Some(callback)
            } else {
                callbacks.push(StoredCallback {
                    id,
                    callback: Box::new(callback),
                });
                None
            }
        };

        if let Some(callback) = run_now {
            callback();
        }

        CancellationCallbackGuard {
            token: Some(self.clone()),
            callback_id: id,
        }
    }

    /// Sleep for `duration` unless cancelled first
    ///
    /// Returns `true` if the full duration elapsed, `false` if the token was
    /// (or became) cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        if duration.is_zero() {
            return true;
        }

        let (wake_tx, wake_rx) = bounded::<()>(1);
        let _guard = self.on_cancel(move || {
            let _ = wake_tx.try_send(());
        });

        // Either outcome is resolved by re-reading the flag.
        let _ = wake_rx.recv_timeout(duration);
        !self.is_cancelled()
    }

    fn remove_callback(&self, callback_id: usize) {
        self.inner.callbacks.lock().retain(|c| c.id != callback_id);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Unregisters an [`on_cancel()`](CancellationToken::on_cancel) callback on drop
pub struct CancellationCallbackGuard {
    token: Option<CancellationToken>,
    callback_id: usize,
}

impl CancellationCallbackGuard {
    /// Keep the callback registered after the guard is dropped
    pub fn detach(mut self) {
        self.token = None;
    }
}

impl Drop for CancellationCallbackGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            if !token.is_cancelled() {
                token.remove_callback(self.callback_id);
            }
        }
    }
}
