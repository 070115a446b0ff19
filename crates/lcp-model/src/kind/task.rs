use serde::{Deserialize, Serialize};

use crate::{BoundaryUpdate, Side};

/// What a single tile computation starts from.
///
/// Each variant maps to one invocation shape of the single-tile solver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    /// First pass over a tile, no inbound boundary information.
    Startup,
    /// Recomputation seeded with boundary vectors from neighbouring tiles.
    Connected {
        /// Inbound updates, at most one per side.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        updates: Vec<BoundaryUpdate>,
    },
}

impl TaskKind {
    /// Returns a short symbolic identifier for the kind.
    ///
    /// Intended for logging and metric labels:
    /// - `"startup"`
    /// - `"connected"`
    pub fn kind(&self) -> &'static str {
        match self {
            TaskKind::Startup => "startup",
            TaskKind::Connected { .. } => "connected",
        }
    }

    /// Inbound updates carried by the task (empty for startup tasks).
    pub fn updates(&self) -> &[BoundaryUpdate] {
        match self {
            TaskKind::Startup => &[],
            TaskKind::Connected { updates } => updates,
        }
    }

    /// The inbound update on `side`, if any.
    pub fn update_for(&self, side: Side) -> Option<&BoundaryUpdate> {
        self.updates().iter().find(|u| u.side == side)
    }
}

impl Default for TaskKind {
    fn default() -> Self {
        TaskKind::Startup
    }
}
