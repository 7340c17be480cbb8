//! Durable per-task download progress.
//!
//! One [`Ledger`] tracks one repository through one progress file. It is
//! reconciled against a fresh listing at the start of every run, yields the
//! remaining work, and is updated after every file. Each mutation rewrites
//! the whole JSON document, so the file on disk always holds the last state
//! that was successfully written.
//!
//! ```rust,no_run
//! use hubfetch::ledger::Ledger;
//!
//! # async fn example() {
//! let files = vec!["config.json".to_string(), "model.safetensors".to_string()];
//! let mut ledger = Ledger::open("download_progress.json");
//! ledger.reconcile("org/model@main", &files).await;
//! for path in ledger.remaining(&files) {
//!     // ... download ...
//!     ledger.mark_completed(&path, 1024).await;
//! }
//! println!("{:.1}%", ledger.snapshot().percent());
//! # }
//! ```

pub mod ledger;
pub mod record;
pub mod snapshot;

pub use ledger::{Ledger, LoadState, Reconciliation, ResetReason};
pub use record::{FileDetail, FileStatus, TaskRecord};
pub use snapshot::Snapshot;
