use serde::{Deserialize, Serialize};

use crate::TileKey;

/// A discovered tile: its spatial key plus the grid file it was read from.
///
/// The same file name is used for the input grid and the cost grid; the
/// directories differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRecord {
    pub key: TileKey,
    pub file_name: String,
}

impl TileRecord {
    pub fn new(key: TileKey, file_name: impl Into<String>) -> Self {
        Self {
            key,
            file_name: file_name.into(),
        }
    }
}
