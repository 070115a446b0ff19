//! Turns tile keys into solver invocations.

mod command;
pub use command::{SolverCommand, TaskArtifacts};

mod config;
pub use config::SolverConfig;

use lcp_model::{BoundaryUpdate, Coord, Side, TaskId, TaskKind, TileKey, TileRecord};
use thiserror::Error;
use tracing::trace;

use crate::index::TileIndex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The key lies outside the indexed surface. Expected at surface edges.
    #[error("no such tile: {0}")]
    NoSuchTile(TileKey),
    #[error("more than one inbound update for side {0:?}")]
    DuplicateSide(Side),
    #[error("invalid tile size: {0}")]
    InvalidTileSize(String),
}

/// One unit of remote work, ready to be submitted.
#[derive(Debug, Clone)]
pub struct TileTask {
    pub id: TaskId,
    pub key: TileKey,
    pub kind: TaskKind,
    pub command: SolverCommand,
    pub artifacts: TaskArtifacts,
}

/// Builds startup and connected tasks against a fixed [`TileIndex`].
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    index: TileIndex,
    config: SolverConfig,
    tile_size: Coord,
}

impl TaskBuilder {
    pub fn new(index: TileIndex, config: SolverConfig) -> Result<Self, BuildError> {
        let tile_size = config
            .tile_offset()
            .ok()
            .filter(|ts| ts.micros() > 0)
            .ok_or_else(|| BuildError::InvalidTileSize(config.tile_size.to_string()))?;
        Ok(Self {
            index,
            config,
            tile_size,
        })
    }

    #[inline]
    pub fn index(&self) -> &TileIndex {
        &self.index
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[inline]
    pub fn tile_size(&self) -> Coord {
        self.tile_size
    }

    /// First pass over `key` with no inbound boundaries.
    pub fn startup(&self, key: TileKey, id: TaskId) -> Result<TileTask, BuildError> {
        let record = self.resolve(key)?;
        Ok(self.assemble(record, id, TaskKind::Startup))
    }

    /// Recompute `key` seeded with `updates`, at most one per side.
    ///
    /// Sides without an update are left out of the command.
    pub fn connected(
        &self,
        key: TileKey,
        id: TaskId,
        updates: Vec<BoundaryUpdate>,
    ) -> Result<TileTask, BuildError> {
        let record = self.resolve(key)?;
        let mut seen = [false; 4];
        for u in &updates {
            if std::mem::replace(&mut seen[u.side.index()], true) {
                return Err(BuildError::DuplicateSide(u.side));
            }
        }
        Ok(self.assemble(record, id, TaskKind::Connected { updates }))
    }

    fn resolve(&self, key: TileKey) -> Result<&TileRecord, BuildError> {
        self.index.resolve(&key).ok_or(BuildError::NoSuchTile(key))
    }

    fn assemble(&self, record: &TileRecord, id: TaskId, kind: TaskKind) -> TileTask {
        let cfg = &self.config;
        let artifacts = TaskArtifacts::for_task(&cfg.output_dir, id);

        let mut args = cfg.program_args.clone();
        args.push(path_arg(&cfg.input_dir.join(&record.file_name)));
        args.push(path_arg(&cfg.cost_dir.join(&record.file_name)));
        args.extend(cfg.solver_flags.iter().cloned());
        args.push("-o".into());
        args.push(path_arg(&cfg.output_dir));
        args.push("-t".into());
        args.push(id.to_string());
        args.push(format!("--step={}", cfg.step_size));
        args.push(format!("--ts={}", cfg.tile_size));
        for side in Side::ALL {
            if let Some(update) = kind.update_for(side) {
                args.push(side.inbound_flag().into());
                args.push(path_arg(&update.vector));
            }
        }
        args.push("-e".into());
        args.push(path_arg(&artifacts.error));

        let command = SolverCommand {
            program: cfg.program.clone(),
            args,
        };
        trace!(task_id = %id, tile = %record.key, %command, "task built");

        TileTask {
            id,
            key: record.key,
            kind,
            command,
            artifacts,
        }
    }
}

fn path_arg(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: i64, y: i64) -> TileKey {
        TileKey::new(Coord::from_units(x), Coord::from_units(y))
    }

    fn builder() -> TaskBuilder {
        let index = TileIndex::from_records([
            TileRecord::new(key(0, 0), "grid0-0-10-10.asc"),
            TileRecord::new(key(10, 0), "grid10-0-20-10.asc"),
        ]);
        let cfg = SolverConfig::new("python")
            .with_program_args(["/opt/solver.py"])
            .with_dirs("/in", "/cost", "/out")
            .with_tile_size(10.0)
            .with_step_size(2.5);
        TaskBuilder::new(index, cfg).unwrap()
    }

    #[test]
    fn startup_references_input_and_cost_grids() {
        let task = builder().startup(key(0, 0), TaskId::new(1)).unwrap();
        assert_eq!(task.kind, TaskKind::Startup);
        assert_eq!(
            task.command.to_string(),
            "python /opt/solver.py /in/grid0-0-10-10.asc /cost/grid0-0-10-10.asc \
             -g 1 -w 50 -o /out -t 1 --step=2.5 --ts=10 -e /out/1.error"
        );
        assert_eq!(task.artifacts.summary, std::path::PathBuf::from("/out/1-summary.txt"));
    }

    #[test]
    fn connected_adds_only_present_sides() {
        let updates = vec![BoundaryUpdate::new(Side::Left, "/out/4-toRight.npy", TaskId::new(4))];
        let task = builder().connected(key(10, 0), TaskId::new(7), updates).unwrap();
        let args = &task.command.args;
        let pos = args.iter().position(|a| a == "-sl").expect("-sl present");
        assert_eq!(args[pos + 1], "/out/4-toRight.npy");
        for flag in ["-sr", "-st", "-sb"] {
            assert!(!args.iter().any(|a| a == flag), "{flag} must be omitted");
        }
        assert_eq!(task.kind.updates().len(), 1);
    }

    #[test]
    fn connected_orders_sides_like_the_solver() {
        let updates = vec![
            BoundaryUpdate::new(Side::Bottom, "/out/2-toTop.npy", TaskId::new(2)),
            BoundaryUpdate::new(Side::Left, "/out/3-toRight.npy", TaskId::new(3)),
        ];
        let task = builder().connected(key(0, 0), TaskId::new(5), updates).unwrap();
        let flags: Vec<_> = task
            .command
            .args
            .iter()
            .filter(|a| a.starts_with("-s"))
            .cloned()
            .collect();
        assert_eq!(flags, vec!["-sl", "-sb"]);
    }

    #[test]
    fn duplicate_side_is_rejected() {
        let updates = vec![
            BoundaryUpdate::new(Side::Top, "/out/1-toBottom.npy", TaskId::new(1)),
            BoundaryUpdate::new(Side::Top, "/out/2-toBottom.npy", TaskId::new(2)),
        ];
        let err = builder().connected(key(0, 0), TaskId::new(3), updates).unwrap_err();
        assert_eq!(err, BuildError::DuplicateSide(Side::Top));
    }

    #[test]
    fn unknown_tile_is_no_such_tile() {
        let b = builder();
        assert_eq!(
            b.startup(key(-10, 0), TaskId::new(1)).unwrap_err(),
            BuildError::NoSuchTile(key(-10, 0))
        );
        assert!(matches!(
            b.connected(key(0, 10), TaskId::new(2), Vec::new()),
            Err(BuildError::NoSuchTile(_))
        ));
    }

    #[test]
    fn non_positive_tile_size_is_rejected() {
        let cfg = SolverConfig::new("python").with_tile_size(0.0);
        assert!(matches!(
            TaskBuilder::new(TileIndex::default(), cfg),
            Err(BuildError::InvalidTileSize(_))
        ));
    }
}
