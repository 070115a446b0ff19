use std::path::PathBuf;

use lcp_model::{Coord, ModelError};

/// How to invoke the single-tile solver and where its files live.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Executable to run (e.g. a python interpreter).
    pub program: String,
    /// Arguments placed before the grid paths (e.g. the solver module path).
    pub program_args: Vec<String>,
    /// Directory holding the input grids.
    pub input_dir: PathBuf,
    /// Directory holding the cost grids; file names match the input grids.
    pub cost_dir: PathBuf,
    /// Directory the solver writes summaries, vectors and error files into.
    pub output_dir: PathBuf,
    /// Edge length of one tile in map units.
    pub tile_size: f64,
    pub step_size: f64,
    /// Flags passed through to the solver unchanged.
    pub solver_flags: Vec<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            program_args: Vec::new(),
            input_dir: PathBuf::new(),
            cost_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            tile_size: 1.0,
            step_size: 1.0,
            solver_flags: ["-g", "1", "-w", "50"].map(String::from).to_vec(),
        }
    }
}

impl SolverConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_program_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dirs(
        mut self,
        input_dir: impl Into<PathBuf>,
        cost_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        self.input_dir = input_dir.into();
        self.cost_dir = cost_dir.into();
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_solver_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.solver_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Tile size as a key offset.
    pub fn tile_offset(&self) -> Result<Coord, ModelError> {
        Coord::from_f64(self.tile_size)
    }
}
