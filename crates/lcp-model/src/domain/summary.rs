use serde::{Deserialize, Serialize};

use crate::{CellCount, ModelError, Side, TileKey};

/// What a finished tile computation reports about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSummary {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Changed flags indexed by [`Side::index`].
    pub changed: [bool; 4],
    pub changed_cells: CellCount,
}

impl TileSummary {
    /// Whether the edge on `side` changed and must be relayed.
    pub fn changed(&self, side: Side) -> bool {
        self.changed[side.index()]
    }

    /// Changed sides in solver order.
    pub fn changed_sides(&self) -> impl Iterator<Item = Side> + '_ {
        Side::ALL.into_iter().filter(|s| self.changed(*s))
    }

    /// Key derived from the reported extent.
    pub fn key(&self) -> Result<TileKey, ModelError> {
        TileKey::from_f64(self.min_x, self.min_y)
    }
}
