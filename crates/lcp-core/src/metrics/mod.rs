//! Metrics hook for the scheduler.
//!
//! The core only knows this trait; backends (Prometheus, ...) live in their
//! own crates and are injected through [`crate::Scheduler::with_metrics`].

use std::{sync::Arc, time::Duration};

use lcp_model::{CellCount, TaskOutcome};

pub trait MetricsBackend: Send + Sync {
    /// A task was accepted by the queue. `kind` is `"startup"` or `"connected"`.
    fn record_task_submitted(&self, kind: &'static str);

    /// A delivered task was consumed.
    fn record_task_completed(&self, outcome: TaskOutcome, duration: Duration);

    fn record_changed_cells(&self, cells: CellCount);

    /// Updates currently parked behind running tiles.
    fn record_waiting(&self, depth: usize);

    fn record_stall(&self);
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

/// Backend that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsBackend for NoopMetrics {
    fn record_task_submitted(&self, _kind: &'static str) {}
    fn record_task_completed(&self, _outcome: TaskOutcome, _duration: Duration) {}
    fn record_changed_cells(&self, _cells: CellCount) {}
    fn record_waiting(&self, _depth: usize) {}
    fn record_stall(&self) {}
}

pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoopMetrics)
}
