//! Run summary accumulated by the scheduler and persisted at the end.

mod writer;
pub use writer::{ReportError, ReportWriter};

use std::time::Duration;

use lcp_model::{CellCount, RunOutcome, TaskId, TaskOutcome, TileKey, TileSummary};
use serde::Serialize;

/// One consumed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub tile: TileKey,
    pub outcome: TaskOutcome,
    pub changed_cells: CellCount,
}

/// Contents of a task's error artifact, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskErrorRecord {
    pub task_id: TaskId,
    pub tile: Option<TileKey>,
    pub message: String,
}

/// Extent corner and changed cell count reported by one decoded summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMetric {
    pub min_x: f64,
    pub min_y: f64,
    pub changed_cells: CellCount,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// `None` until the run has finished.
    pub outcome: Option<RunOutcome>,
    pub elapsed_secs: f64,
    /// Tasks handed to the queue.
    pub submitted: u64,
    /// Consumed tasks in consumption order.
    pub tasks: Vec<TaskRecord>,
    pub errors: Vec<TaskErrorRecord>,
    pub tile_metrics: Vec<TileMetric>,
    pub total_changed_cells: CellCount,
    /// Tasks still in flight when the run ended; their results are never read.
    pub abandoned: Vec<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_submitted(&mut self) {
        self.submitted += 1;
    }

    pub(crate) fn record_decoded(&mut self, task_id: TaskId, tile: TileKey, summary: &TileSummary) {
        self.total_changed_cells += summary.changed_cells;
        self.tile_metrics.push(TileMetric {
            min_x: summary.min_x,
            min_y: summary.min_y,
            changed_cells: summary.changed_cells,
        });
        self.tasks.push(TaskRecord {
            task_id,
            tile,
            outcome: TaskOutcome::Decoded,
            changed_cells: summary.changed_cells,
        });
    }

    pub(crate) fn record_corrupt(&mut self, task_id: TaskId, tile: TileKey) {
        self.tasks.push(TaskRecord {
            task_id,
            tile,
            outcome: TaskOutcome::CorruptSummary,
            changed_cells: 0,
        });
    }

    pub(crate) fn record_error(&mut self, task_id: TaskId, tile: Option<TileKey>, message: String) {
        self.errors.push(TaskErrorRecord {
            task_id,
            tile,
            message,
        });
    }

    pub(crate) fn finish(&mut self, outcome: RunOutcome, elapsed: Duration, abandoned: Vec<TaskId>) {
        self.outcome = Some(outcome);
        self.elapsed_secs = elapsed.as_secs_f64();
        self.abandoned = abandoned;
    }

    pub fn stalled(&self) -> bool {
        self.outcome.is_some_and(|o| o.is_stalled())
    }

    /// Tasks whose summary decoded.
    pub fn decoded_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.outcome == TaskOutcome::Decoded)
            .count()
    }

    pub fn decode_failures(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks
            .iter()
            .filter(|t| t.outcome == TaskOutcome::CorruptSummary)
    }

    pub fn tile_metrics(&self) -> &[TileMetric] {
        &self.tile_metrics
    }
}
