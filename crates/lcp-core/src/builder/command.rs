use std::{fmt, path::Path, path::PathBuf};

use lcp_model::{Side, TaskId};
use serde::Serialize;

/// A fully rendered solver invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolverCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for SolverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Files a task writes into the output directory, all named by task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskArtifacts {
    /// `<id>-summary.txt`
    pub summary: PathBuf,
    /// `<id>.error`, present only when the solver failed.
    pub error: PathBuf,
    /// `<id>-toLeft.npy` .. `<id>-toBottom.npy`, indexed by [`Side::index`].
    pub vectors: [PathBuf; 4],
}

impl TaskArtifacts {
    pub fn for_task(output_dir: &Path, id: TaskId) -> Self {
        Self {
            summary: output_dir.join(format!("{id}-summary.txt")),
            error: output_dir.join(format!("{id}.error")),
            vectors: Side::ALL
                .map(|side| output_dir.join(format!("{id}-{}.npy", side.outbound_label()))),
        }
    }

    /// Outbound vector written for `side`.
    pub fn vector(&self, side: Side) -> &Path {
        &self.vectors[side.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_follow_task_id() {
        let a = TaskArtifacts::for_task(Path::new("/out"), TaskId::new(12));
        assert_eq!(a.summary, PathBuf::from("/out/12-summary.txt"));
        assert_eq!(a.error, PathBuf::from("/out/12.error"));
        assert_eq!(a.vector(Side::Left), Path::new("/out/12-toLeft.npy"));
        assert_eq!(a.vector(Side::Bottom), Path::new("/out/12-toBottom.npy"));
    }

    #[test]
    fn command_display_joins_args() {
        let c = SolverCommand {
            program: "python".into(),
            args: vec!["solver.py".into(), "-t".into(), "3".into()],
        };
        assert_eq!(c.to_string(), "python solver.py -t 3");
    }
}
