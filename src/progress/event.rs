//! Structured progress events.

use crate::downloader::RunReport;
use crate::ledger::{Reconciliation, Snapshot};

/// Emitted by [`RepoDownloader::run`](crate::downloader::RepoDownloader::run)
/// to the `on_event` callback, in this order: `Listed`, `Reconciled`, then
/// per-file events, then `Finished`.
#[derive(Debug, Clone)]
pub enum Event {
    /// The remote listing arrived. `selected` survived the include/exclude globs.
    Listed { listed: usize, selected: usize },
    /// The ledger was brought in line with the selected files.
    Reconciled {
        reconciliation: Reconciliation,
        snapshot: Snapshot,
    },
    /// A file was dispatched to a worker.
    FileStarted { path: String },
    /// `skipped` when the local copy was already complete.
    FileCompleted {
        path: String,
        size: u64,
        skipped: bool,
    },
    FileFailed { path: String, error: String },
    /// After every processed file.
    Progress { snapshot: Snapshot },
    /// After every Nth processed file.
    Stats { snapshot: Snapshot },
    Finished { report: RunReport },
}
