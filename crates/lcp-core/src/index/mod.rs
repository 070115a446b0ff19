//! Tile index: which tiles exist and where their grids live.

mod name;
pub use name::{TileName, is_grid_file, parse_tile_name};

use std::{collections::BTreeMap, path::Path};

use lcp_model::{Coord, Side, TileKey, TileRecord};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("malformed tile name: {0}")]
    MalformedTileName(String),
    #[error("failed to read input directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only map from [`TileKey`] to the discovered [`TileRecord`].
///
/// Built once before scheduling starts. Keys outside the index are tiles
/// beyond the surface; they are never scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileIndex {
    tiles: BTreeMap<TileKey, TileRecord>,
    rejected: Vec<String>,
}

impl TileIndex {
    /// Scan `input_dir` for `*.asc` grids and index them by their min corner.
    ///
    /// Names that do not parse are skipped and kept in [`TileIndex::rejected`].
    /// When two files collapse onto one key the lexicographically first wins.
    #[instrument(level = "debug", skip_all, fields(dir = %input_dir.as_ref().display()))]
    pub fn discover(input_dir: impl AsRef<Path>) -> Result<Self, IndexError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(input_dir.as_ref())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && is_grid_file(name)
            {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut index = TileIndex::default();
        for name in names {
            match parse_tile_name(&name) {
                Ok(parsed) => index.insert(TileRecord::new(parsed.key(), name)),
                Err(e) => {
                    warn!(error = %e, "skipping grid file");
                    index.rejected.push(name);
                }
            }
        }
        debug!(tiles = index.len(), rejected = index.rejected.len(), "tile index built");
        Ok(index)
    }

    /// Build an index from already known records.
    pub fn from_records(records: impl IntoIterator<Item = TileRecord>) -> Self {
        let mut index = TileIndex::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, record: TileRecord) {
        if let Some(existing) = self.tiles.get(&record.key) {
            warn!(
                tile = %record.key,
                kept = %existing.file_name,
                dropped = %record.file_name,
                "duplicate tile key"
            );
            return;
        }
        self.tiles.insert(record.key, record);
    }

    /// Look up a tile; `None` means the key lies outside the surface.
    pub fn resolve(&self, key: &TileKey) -> Option<&TileRecord> {
        self.tiles.get(key)
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    /// Key of the tile adjacent to `key` on `side`. May be outside the index.
    #[inline]
    pub fn neighbor(&self, key: TileKey, side: Side, tile_size: Coord) -> TileKey {
        key.neighbor(side, tile_size)
    }

    /// Tiles in key order.
    pub fn records(&self) -> impl Iterator<Item = &TileRecord> {
        self.tiles.values()
    }

    /// File names that were skipped during discovery.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"ncols 1\n").unwrap();
    }

    fn key(x: i64, y: i64) -> TileKey {
        TileKey::new(Coord::from_units(x), Coord::from_units(y))
    }

    #[test]
    fn discover_indexes_asc_files_by_min_corner() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "grid0-0-10-10.asc");
        touch(dir.path(), "grid-10-0-0-10.asc");
        touch(dir.path(), "grid0--10-10-0.asc");
        touch(dir.path(), "notes.txt");

        let index = TileIndex::discover(dir.path()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(
            index.resolve(&key(-10, 0)).unwrap().file_name,
            "grid-10-0-0-10.asc"
        );
        assert!(index.contains(&key(0, -10)));
        assert!(index.rejected().is_empty());
    }

    #[test]
    fn malformed_names_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "grid0-0-10-10.asc");
        touch(dir.path(), "gridbroken.asc");

        let index = TileIndex::discover(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.rejected(), ["gridbroken.asc".to_string()]);
    }

    #[test]
    fn duplicate_keys_collapse_to_one_record() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "grid0-0-10-10.asc");
        touch(dir.path(), "grid0.0-0-10-10.asc");

        let index = TileIndex::discover(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve(&key(0, 0)).unwrap().file_name, "grid0-0-10-10.asc");
    }

    #[test]
    fn discovery_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["grid0-0-10-10.asc", "grid10-0-20-10.asc", "grid0-10-10-20.asc"] {
            touch(dir.path(), name);
        }
        let a = TileIndex::discover(dir.path()).unwrap();
        let b = TileIndex::discover(dir.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(TileIndex::discover(&missing), Err(IndexError::Io(_))));
    }

    #[test]
    fn neighbors_outside_surface_do_not_resolve() {
        let index = TileIndex::from_records([TileRecord::new(key(0, 0), "grid0-0-10-10.asc")]);
        let ts = Coord::from_units(10);
        let left = index.neighbor(key(0, 0), Side::Left, ts);
        assert_eq!(left, key(-10, 0));
        assert!(index.resolve(&left).is_none());
    }
}
