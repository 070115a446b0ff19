//! Tile grid file names.
//!
//! Grids are named `grid<minx>-<miny>-<maxx>-<maxy>.asc`. The separator and
//! the minus sign share a character, so a negative first token shows up as
//! `grid-10-…` and a negative later token as a doubled `--`.

use lcp_model::{Coord, TileKey};

use super::IndexError;

const PREFIX: &str = "grid";
const EXTENSION: &str = ".asc";
const ESCAPE: char = '!';

/// Extent encoded in a grid file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileName {
    pub min_x: Coord,
    pub min_y: Coord,
    pub max_x: Coord,
    pub max_y: Coord,
}

impl TileName {
    pub fn key(&self) -> TileKey {
        TileKey::new(self.min_x, self.min_y)
    }
}

/// Returns `true` for names the index should look at (`*.asc`).
pub fn is_grid_file(name: &str) -> bool {
    name.ends_with(EXTENSION)
}

/// Parse the extent out of a grid file name (no directory part).
pub fn parse_tile_name(name: &str) -> Result<TileName, IndexError> {
    let malformed = || IndexError::MalformedTileName(name.to_string());

    let stem = name.strip_suffix(EXTENSION).ok_or_else(malformed)?;
    let body = stem.strip_prefix(PREFIX).ok_or_else(malformed)?;

    // A leading '-' is the sign of minx, a "--" is separator plus sign.
    let escaped = match body.strip_prefix('-') {
        Some(rest) => format!("{ESCAPE}{rest}"),
        None => body.to_string(),
    }
    .replace("--", &format!("-{ESCAPE}"));

    let tokens: Vec<Coord> = escaped
        .split('-')
        .map(|tok| {
            tok.replace(ESCAPE, "-")
                .parse::<Coord>()
                .map_err(|_| malformed())
        })
        .collect::<Result<_, _>>()?;

    match tokens.as_slice() {
        [min_x, min_y, max_x, max_y] => Ok(TileName {
            min_x: *min_x,
            min_y: *min_y,
            max_x: *max_x,
            max_y: *max_y,
        }),
        _ => Err(malformed()),
    }
}
