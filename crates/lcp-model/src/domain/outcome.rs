use serde::{Deserialize, Serialize};

/// How a single delivered task was consumed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskOutcome {
    /// Summary decoded; changed sides were fanned out.
    Decoded,
    /// Summary missing or unreadable; the tile was retired without fan-out.
    CorruptSummary,
}

impl TaskOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Decoded => "decoded",
            TaskOutcome::CorruptSummary => "corrupt-summary",
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunOutcome {
    /// The queue drained with nothing left running.
    Settled,
    /// The queue stopped delivering for longer than the stall limit.
    Stalled,
    /// Shut down from outside before the queue drained.
    Cancelled,
    /// An internal invariant broke; the run was stopped.
    Aborted,
}

impl RunOutcome {
    /// Returns `true` if the surface is known to have converged.
    pub fn is_settled(&self) -> bool {
        matches!(self, RunOutcome::Settled)
    }

    pub fn is_stalled(&self) -> bool {
        matches!(self, RunOutcome::Stalled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_settled_is_settled() {
        assert!(RunOutcome::Settled.is_settled());
        assert!(!RunOutcome::Stalled.is_settled());
        assert!(!RunOutcome::Cancelled.is_settled());
        assert!(!RunOutcome::Aborted.is_settled());
        assert!(RunOutcome::Stalled.is_stalled());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(TaskOutcome::Decoded.as_str(), "decoded");
        assert_eq!(TaskOutcome::CorruptSummary.as_str(), "corrupt-summary");
        let json = serde_json::to_string(&RunOutcome::Stalled).unwrap();
        assert_eq!(json, r#""stalled""#);
    }
}
