use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Coord, ModelError, Side};

/// Stable identity of a tile: the minimum corner of its extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub x: Coord,
    pub y: Coord,
}

impl TileKey {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Key for an extent reported as floating point values.
    pub fn from_f64(min_x: f64, min_y: f64) -> Result<Self, ModelError> {
        Ok(Self {
            x: Coord::from_f64(min_x)?,
            y: Coord::from_f64(min_y)?,
        })
    }

    /// Key of the adjacent tile on `side`, assuming square tiles of `tile_size`.
    ///
    /// Y grows upwards: the top neighbour has the larger `y`.
    pub const fn neighbor(self, side: Side, tile_size: Coord) -> TileKey {
        match side {
            Side::Left => TileKey::new(self.x.offset_back(tile_size), self.y),
            Side::Right => TileKey::new(self.x.offset(tile_size), self.y),
            Side::Top => TileKey::new(self.x, self.y.offset(tile_size)),
            Side::Bottom => TileKey::new(self.x, self.y.offset_back(tile_size)),
        }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
