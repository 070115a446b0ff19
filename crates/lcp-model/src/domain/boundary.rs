use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Side, TaskId};

/// A pending relaxation signal for one side of a tile.
///
/// `side` is the side of the *receiving* tile the vector enters through; a
/// tile that changed along its right edge produces an update entering its
/// right neighbour from the left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryUpdate {
    pub side: Side,
    /// Boundary vector artifact written by the producing task.
    pub vector: PathBuf,
    /// Task that produced the vector.
    pub source: TaskId,
}

impl BoundaryUpdate {
    pub fn new(side: Side, vector: impl Into<PathBuf>, source: TaskId) -> Self {
        Self {
            side,
            vector: vector.into(),
            source,
        }
    }
}
