//! Summary artifact written by the single-tile solver.
//!
//! Nine newline separated fields, in order:
//! `minx, miny, maxx, maxy, left, top, right, bottom, changedCells`.
//! Flags are `true` (any case) or anything else for false.

use std::path::Path;

use lcp_model::{CellCount, Side, TileSummary};
use thiserror::Error;

/// Number of fields a summary must carry.
pub const SUMMARY_FIELDS: usize = 9;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("corrupt summary: {0}")]
    CorruptSummary(String),
}

/// Decode summary text.
pub fn decode_summary(text: &str) -> Result<TileSummary, CodecError> {
    let fields: Vec<&str> = text.lines().map(str::trim).collect();
    if fields.len() < SUMMARY_FIELDS {
        return Err(CodecError::CorruptSummary(format!(
            "expected {SUMMARY_FIELDS} fields, found {}",
            fields.len()
        )));
    }

    let extent = |i: usize| -> Result<f64, CodecError> {
        fields[i]
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                CodecError::CorruptSummary(format!("field {i}: bad coordinate {:?}", fields[i]))
            })
    };
    let flag = |i: usize| fields[i].eq_ignore_ascii_case("true");

    let mut changed = [false; 4];
    for side in Side::ALL {
        changed[side.index()] = flag(4 + side.index());
    }

    let changed_cells: CellCount = fields[8].parse().map_err(|_| {
        CodecError::CorruptSummary(format!("field 8: bad cell count {:?}", fields[8]))
    })?;

    Ok(TileSummary {
        min_x: extent(0)?,
        min_y: extent(1)?,
        max_x: extent(2)?,
        max_y: extent(3)?,
        changed,
        changed_cells,
    })
}

/// Encode a summary in the solver's format.
pub fn encode_summary(summary: &TileSummary) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n{}\n",
        summary.min_x, summary.min_y, summary.max_x, summary.max_y
    );
    for side in Side::ALL {
        out.push_str(if summary.changed(side) { "True\n" } else { "False\n" });
    }
    out.push_str(&format!("{}\n", summary.changed_cells));
    out
}

/// Read and decode a summary artifact. A missing file is a corrupt summary.
pub async fn read_summary(path: &Path) -> Result<TileSummary, CodecError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        CodecError::CorruptSummary(format!("{}: {e}", path.display()))
    })?;
    decode_summary(&text)
}
