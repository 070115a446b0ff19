mod coord;
pub use coord::{COORD_SCALE, Coord};

mod tile_key;
pub use tile_key::TileKey;

mod side;
pub use side::Side;

mod task_id;
pub use task_id::TaskId;

mod tile_record;
pub use tile_record::TileRecord;

mod boundary;
pub use boundary::BoundaryUpdate;

mod summary;
pub use summary::TileSummary;

mod outcome;
pub use outcome::{RunOutcome, TaskOutcome};

/// Count of cells whose accumulated cost changed during one tile pass.
pub type CellCount = u64;
