use crate::{MovieRecord, RunId};

/// What caused a dashboard load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    Click,
}

/// Diagnostic carried with a failed run; never shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard mounted or the user clicked "load".
    LoadTriggered(Trigger),
    /// Engine progress for a run.
    RunProgress {
        run_id: RunId,
        lists_discovered: Option<usize>,
        lists_fetched: usize,
    },
    /// Engine finished a run.
    RunCompleted {
        run_id: RunId,
        outcome: Result<Vec<MovieRecord>, RunFailure>,
    },
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
