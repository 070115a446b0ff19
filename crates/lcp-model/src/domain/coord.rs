use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Number of stored units per map unit.
pub const COORD_SCALE: i64 = 1_000_000;

/// A map coordinate stored as a fixed-point integer (micro-units).
///
/// Tile extents come from file names (`-10`) and from solver summaries
/// (`-10.0`); both must land on the same key, so coordinates are never kept
/// as floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coord(i64);

impl Coord {
    pub const ZERO: Coord = Coord(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Whole map units.
    pub const fn from_units(units: i64) -> Self {
        Self(units * COORD_SCALE)
    }

    /// Rounds to the nearest micro-unit. Non-finite values are rejected.
    pub fn from_f64(value: f64) -> Result<Self, ModelError> {
        if !value.is_finite() {
            return Err(ModelError::InvalidCoord(value.to_string()));
        }
        let scaled = (value * COORD_SCALE as f64).round();
        if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
            return Err(ModelError::InvalidCoord(value.to_string()));
        }
        Ok(Self(scaled as i64))
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / COORD_SCALE as f64
    }

    pub const fn offset(self, delta: Coord) -> Coord {
        Coord(self.0.saturating_add(delta.0))
    }

    pub const fn offset_back(self, delta: Coord) -> Coord {
        Coord(self.0.saturating_sub(delta.0))
    }
}

impl FromStr for Coord {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ModelError::InvalidCoord(s.to_string()))?;
        Coord::from_f64(value)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = COORD_SCALE as u64;
        let whole = abs / scale;
        let frac = abs % scale;
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!("{frac:06}");
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}
