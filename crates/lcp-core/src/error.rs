use thiserror::Error;

use crate::{
    builder::BuildError, index::IndexError, report::ReportError, scheduler::SchedulerError,
};

/// Errors surfaced by [`crate::MultiTileRun`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("tile discovery failed: {0}")]
    Index(#[from] IndexError),
    #[error("invalid solver configuration: {0}")]
    Build(#[from] BuildError),
    #[error("run aborted: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("report write failed: {0}")]
    Report(#[from] ReportError),
}
