//! Result of one run.

use crate::ledger::Snapshot;

use std::path::PathBuf;
use std::time::Duration;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every selected file is complete.
    Success,
    /// The run went through but some files are recorded as failed.
    PartialFailure,
    /// Stopped on request. Files never dispatched stay pending.
    Cancelled,
}

/// Summary handed back by [`RepoDownloader::run`](super::RepoDownloader::run).
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Ledger state at the end of the run.
    pub snapshot: Snapshot,
    /// Wall time of this run only.
    pub duration: Duration,
    pub directory: PathBuf,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }
}
