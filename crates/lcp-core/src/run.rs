use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    CoreError,
    builder::{SolverConfig, TaskBuilder},
    index::TileIndex,
    metrics::{MetricsHandle, noop_metrics},
    queue::WorkQueue,
    report::{ReportWriter, RunSummary},
    scheduler::{Scheduler, SchedulerConfig},
};

/// One end-to-end run: discover tiles, schedule them, write the report.
pub struct MultiTileRun {
    solver: SolverConfig,
    scheduler: SchedulerConfig,
    report_path: Option<PathBuf>,
    json_report_path: Option<PathBuf>,
    metrics: MetricsHandle,
}

impl MultiTileRun {
    pub fn new(solver: SolverConfig) -> Self {
        Self {
            solver,
            scheduler: SchedulerConfig::default(),
            report_path: None,
            json_report_path: None,
            metrics: noop_metrics(),
        }
    }

    pub fn with_scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn with_json_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_report_path = Some(path.into());
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Run every tile under `solver.input_dir` on `queue`.
    ///
    /// Reports are written whenever scheduling started, even if the run
    /// aborted. An abort wins over a failed report write; the write error is
    /// only logged in that case.
    pub async fn execute<Q: WorkQueue>(&self, queue: Q) -> Result<RunSummary, CoreError> {
        let index = TileIndex::discover(&self.solver.input_dir)?;
        if !index.rejected().is_empty() {
            warn!(count = index.rejected().len(), "some grid files were skipped");
        }
        info!(tiles = index.len(), queue = queue.name(), "tiles discovered");

        let builder = TaskBuilder::new(index, self.solver.clone())?;
        let mut scheduler = Scheduler::new(self.scheduler.clone(), builder, queue)
            .with_metrics(self.metrics.clone());
        let result = scheduler.run().await;
        let summary = scheduler.into_summary();
        let written = self.write_reports(&summary);

        match (result, written) {
            (Err(e), Err(report)) => {
                warn!(error = %report, "report not written after abort");
                Err(e.into())
            }
            (Err(e), Ok(())) => Err(e.into()),
            (Ok(_), Err(report)) => Err(report),
            (Ok(_), Ok(())) => Ok(summary),
        }
    }

    /// Attempt every configured report; the first failure is returned.
    fn write_reports(&self, summary: &RunSummary) -> Result<(), CoreError> {
        let text = self
            .report_path
            .as_ref()
            .map_or(Ok(()), |path| ReportWriter::write(path, summary));
        let json = self
            .json_report_path
            .as_ref()
            .map_or(Ok(()), |path| ReportWriter::write_json(path, summary));
        text?;
        json?;
        Ok(())
    }
}
