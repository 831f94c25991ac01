//! Post-run validation report

use crate::core::{BufferError, Result};
use crate::worker::WorkerReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Outcome of one coordinated run
///
/// `success` holds iff `expected_items`, `total_produced`, `total_consumed`
/// and `sink_size` are all equal and the queue ended empty. `timed_out` and
/// `cancelled` are reported separately so a partial run is never silent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier of this run
    pub run_id: Uuid,
    /// Items the run was configured to move
    pub expected_items: usize,
    /// Sum of every producer's committed inserts
    pub total_produced: usize,
    /// Sum of every consumer's removals
    pub total_consumed: usize,
    /// Items recorded in the sink
    pub sink_size: usize,
    /// Whether the queue was empty once all workers stopped
    pub queue_empty_at_end: bool,
    /// The completion wait expired and outstanding workers were cancelled
    pub timed_out: bool,
    /// The run was cancelled from outside before it finished
    pub cancelled: bool,
    /// Counts agree and the queue is empty
    pub success: bool,
    /// High-water mark of the queue length
    pub peak_queue_len: usize,
    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
    /// Per-producer results, in index order
    pub producers: Vec<WorkerReport>,
    /// Per-consumer results, in index order
    pub consumers: Vec<WorkerReport>,
}

impl RunReport {
    pub(crate) fn counts_agree(
        expected_items: usize,
        total_produced: usize,
        total_consumed: usize,
        sink_size: usize,
        queue_empty_at_end: bool,
    ) -> bool {
        expected_items == total_produced
            && expected_items == total_consumed
            && expected_items == sink_size
            && queue_empty_at_end
    }

    /// Whether any worker stopped before finishing its assignment
    pub fn is_partial(&self) -> bool {
        self.producers
            .iter()
            .chain(self.consumers.iter())
            .any(|worker| !worker.is_complete())
    }

    /// Serialize the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BufferError::other(e.to_string()))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}", self.run_id)?;

        writeln!(f, "Production:")?;
        for worker in &self.producers {
            writeln!(f, "  {}: {}/{} items", worker.worker, worker.processed, worker.assigned)?;
        }
        writeln!(f, "  total produced: {}", self.total_produced)?;

        writeln!(f, "Consumption:")?;
        for worker in &self.consumers {
            writeln!(f, "  {}: {}/{} items", worker.worker, worker.processed, worker.assigned)?;
        }
        writeln!(f, "  total consumed: {}", self.total_consumed)?;

        writeln!(f, "Verification:")?;
        writeln!(f, "  expected items: {}", self.expected_items)?;
        writeln!(f, "  sink size: {}", self.sink_size)?;
        writeln!(f, "  queue empty: {}", self.queue_empty_at_end)?;
        writeln!(f, "  peak queue length: {}", self.peak_queue_len)?;
        if self.timed_out {
            writeln!(f, "  timed out after {}ms", self.elapsed_ms)?;
        }
        if self.cancelled {
            writeln!(f, "  cancelled")?;
        }
        write!(
            f,
            "Result: {}",
            if self.success { "success" } else { "FAILED" }
        )
    }
}
