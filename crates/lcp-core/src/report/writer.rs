use std::{fmt::Write as _, path::Path};

use lcp_model::TaskOutcome;
use thiserror::Error;
use tracing::debug;

use super::RunSummary;

/// First line of a report whose run stalled.
pub const STALLED_MARKER: &str = "-1";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persists a [`RunSummary`].
///
/// Line format:
/// ```text
/// -1                      (only when the run stalled)
/// <elapsed seconds>
/// <taskId>, <tile>        (one per consumed task, in order)
/// <taskId>, <tile>, corrupt-summary
/// error, <taskId>, <escaped error artifact text>
/// ```
pub struct ReportWriter;

impl ReportWriter {
    pub fn render(summary: &RunSummary) -> String {
        let mut out = String::new();
        if summary.stalled() {
            out.push_str(STALLED_MARKER);
            out.push('\n');
        }
        let _ = writeln!(out, "{}", summary.elapsed_secs);
        for t in &summary.tasks {
            match t.outcome {
                TaskOutcome::Decoded => {
                    let _ = writeln!(out, "{}, {}", t.task_id, t.tile);
                }
                TaskOutcome::CorruptSummary => {
                    let _ = writeln!(out, "{}, {}, {}", t.task_id, t.tile, t.outcome.as_str());
                }
            }
        }
        for e in &summary.errors {
            let _ = writeln!(out, "error, {}, {}", e.task_id, e.message.escape_debug());
        }
        out
    }

    /// Create or overwrite `path` with the line report.
    pub fn write(path: impl AsRef<Path>, summary: &RunSummary) -> Result<(), ReportError> {
        let path = path.as_ref();
        std::fs::write(path, Self::render(summary))?;
        debug!(path = %path.display(), tasks = summary.tasks.len(), "run report written");
        Ok(())
    }

    /// Create or overwrite `path` with the full summary as JSON.
    pub fn write_json(path: impl AsRef<Path>, summary: &RunSummary) -> Result<(), ReportError> {
        let path = path.as_ref();
        let body = serde_json::to_string_pretty(summary)?;
        std::fs::write(path, body)?;
        debug!(path = %path.display(), "json run report written");
        Ok(())
    }
}
