//! Tracing integration for observability.
//!
//! With the `tracing` feature enabled, every worker runs inside a
//! `producer`/`consumer` span and the functions below emit structured events
//! that a metrics layer can aggregate.
//!
//! # Example
//!
//! ```rust,ignore
//! use rust_bounded_buffer::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("rust_bounded_buffer=trace".parse().unwrap()))
//!     .init();
//!
//! Coordinator::new(RunConfig::sample())?.run()?;
//! ```

/// Metrics recording functions for observability.
pub mod metrics {
    use crate::core::WorkerId;
    use std::time::Duration;

    /// Records a committed insert.
    #[inline]
    pub fn record_produced(worker: WorkerId) {
        tracing::trace!(
            counter.items_produced = 1,
            worker = %worker,
            "item produced"
        );
    }

    /// Records a removal.
    #[inline]
    pub fn record_consumed(worker: WorkerId) {
        tracing::trace!(
            counter.items_consumed = 1,
            worker = %worker,
            "item consumed"
        );
    }

    /// Records run startup.
    #[inline]
    pub fn record_run_start(capacity: usize, producers: usize, consumers: usize) {
        tracing::info!(capacity, producers, consumers, "run started");
    }

    /// Records run completion.
    #[inline]
    pub fn record_run_complete(success: bool, elapsed: Duration) {
        tracing::info!(
            success,
            histogram.run_duration_ms = elapsed.as_millis() as u64,
            "run complete"
        );
    }
}
