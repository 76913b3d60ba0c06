use crate::{RunId, Trigger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Execute the scrape-and-aggregate pipeline for this run.
    StartRun { run_id: RunId, trigger: Trigger },
}
