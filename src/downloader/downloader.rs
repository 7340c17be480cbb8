//! The concurrent coordinator.
//!
//! ```rust,no_run
//! use hubfetch::downloader::{RepoDownloaderBuilder, RunOutcome};
//! use hubfetch::hub::RepoRef;
//! use std::path::PathBuf;
//!
//! # async fn example() -> hubfetch::Result<()> {
//! let downloader = RepoDownloaderBuilder::new(RepoRef::parse("org/model")?)
//!     .directory(PathBuf::from("./downloads/org_model"))
//!     .concurrent_downloads(4)
//!     .build()?;
//!
//! let report = downloader.run().await?;
//! if report.outcome == RunOutcome::PartialFailure {
//!     println!("{} files failed, run again to retry them", report.snapshot.failed);
//! }
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use super::report::{RunOutcome, RunReport};
use crate::cancel::CancelHandle;
use crate::error::Result;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::filter::PatternFilter;
use crate::hub::RepoRef;
use crate::ledger::Ledger;
use crate::progress::{Event, ProgressDisplay};

use futures::future;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, error, info};

/// Downloads the selected files of one repository, resuming from the
/// progress ledger.
///
/// Up to `concurrent_downloads` transfers run at once. Only the coordinating
/// task touches the ledger, so its updates are applied one at a time in
/// completion order.
#[derive(Clone)]
pub struct RepoDownloader {
    config: DownloaderConfig,
    fetcher: Fetcher,
    filter: PatternFilter,
    cancel: CancelHandle,
}

impl fmt::Debug for RepoDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoDownloader")
            .field("repo", self.repo())
            .field("config", &self.config)
            .finish()
    }
}

impl RepoDownloader {
    pub(crate) fn new(
        config: DownloaderConfig,
        fetcher: Fetcher,
        filter: PatternFilter,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            config,
            fetcher,
            filter,
            cancel,
        }
    }

    pub fn repo(&self) -> &RepoRef {
        self.fetcher.hub().repo()
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }

    pub fn concurrent_downloads(&self) -> usize {
        self.config.concurrent_downloads
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    pub fn progress_file(&self) -> &PathBuf {
        &self.config.progress_file
    }

    pub fn stats_interval(&self) -> usize {
        self.config.stats_interval
    }

    /// Handle that stops the run: no new file is dispatched and no new attempt
    /// is started once it is cancelled.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn emit(&self, event: Event) {
        if let Some(ref callback) = self.config.on_event {
            callback(&event);
        }
    }

    /// Lists, filters, reconciles the ledger, then downloads what remains.
    ///
    /// Only a listing failure is returned as an error. Per-file failures are
    /// recorded in the ledger and reflected in the report's outcome.
    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        // Kind and revision are part of the task identity.
        let task = self.repo().to_string();

        info!("Listing files of {}", self.repo());
        let listed = match self.fetcher.hub().list_files().await {
            Ok(listed) => listed,
            Err(e) => {
                error!("Could not list {}: {}", self.repo(), e);
                return Err(e);
            }
        };
        let selected = self.filter.apply(&listed);
        info!(
            "{} files listed, {} selected by the include/exclude patterns",
            listed.len(),
            selected.len()
        );
        self.emit(Event::Listed {
            listed: listed.len(),
            selected: selected.len(),
        });

        let mut ledger = Ledger::open(&self.config.progress_file);
        let reconciliation = ledger.reconcile(&task, &selected).await;
        self.emit(Event::Reconciled {
            reconciliation,
            snapshot: ledger.snapshot(),
        });

        let remaining = ledger.remaining(&selected);
        if remaining.is_empty() {
            info!("Nothing left to download for {}", task);
            return Ok(self.finish(&ledger, started, false));
        }
        info!(
            "{} of {} files left to download into {:?}",
            remaining.len(),
            selected.len(),
            self.config.directory
        );

        fs::create_dir_all(&self.config.directory).await?;

        let progress = ProgressDisplay::new(self.config.style_options.clone(), remaining.len());
        let display = &progress;
        let destination = self.config.directory.as_path();
        let cancel = &self.cancel;

        let mut results = stream::iter(remaining)
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|path| {
                debug!("Dispatching {}", path);
                self.emit(Event::FileStarted { path: path.clone() });
                let bar = display.create_child_progress(&path);
                let fetcher = self.fetcher.clone();
                let destination = destination.to_path_buf();
                let (task_path, task_bar) = (path.clone(), bar.clone());
                // Own task: keeps streaming while the ledger is written.
                let transfer = tokio::spawn(async move {
                    fetcher.fetch(&task_path, &destination, &task_bar).await
                });
                async move {
                    let outcome = transfer.await.unwrap_or_else(|e| FetchOutcome::Failed {
                        error: format!("transfer task ended abnormally: {}", e),
                        attempts: 0,
                    });
                    (path, bar, outcome)
                }
            })
            .buffer_unordered(self.config.concurrent_downloads);

        let mut processed = 0usize;
        let mut cancelled = false;
        while let Some((path, bar, outcome)) = results.next().await {
            display.finish_child(bar);
            match outcome {
                FetchOutcome::Cancelled => {
                    cancelled = true;
                    continue;
                }
                FetchOutcome::Completed { size, attempts } => {
                    ledger.set_current(&path).await;
                    ledger.mark_completed(&path, size).await;
                    if attempts > 1 {
                        info!("{} completed after {} attempts", path, attempts);
                    }
                    self.emit(Event::FileCompleted {
                        path: path.clone(),
                        size,
                        skipped: attempts == 0,
                    });
                }
                FetchOutcome::Failed { error, attempts } => {
                    error!("{} failed after {} attempts: {}", path, attempts, error);
                    display.println(&format!("✗ {}: {}", path, error));
                    ledger.set_current(&path).await;
                    ledger.mark_failed(&path, &error).await;
                    self.emit(Event::FileFailed {
                        path: path.clone(),
                        error,
                    });
                }
            }

            processed += 1;
            display.advance(&path);
            let snapshot = ledger.snapshot();
            if processed % self.config.stats_interval == 0 {
                info!("Progress: {}", snapshot.stats_line());
                self.emit(Event::Stats {
                    snapshot: snapshot.clone(),
                });
            }
            self.emit(Event::Progress { snapshot });
        }
        drop(results);

        progress.finish();

        let cancelled = cancelled || self.cancel.is_cancelled();
        Ok(self.finish(&ledger, started, cancelled))
    }

    fn finish(&self, ledger: &Ledger, started: Instant, cancelled: bool) -> RunReport {
        let snapshot = ledger.snapshot();
        let outcome = if cancelled {
            RunOutcome::Cancelled
        } else if snapshot.failed == 0 {
            RunOutcome::Success
        } else {
            RunOutcome::PartialFailure
        };
        match outcome {
            RunOutcome::Success => info!(
                "Finished {}: {}/{} files",
                self.repo(),
                snapshot.completed,
                snapshot.total
            ),
            RunOutcome::PartialFailure => info!(
                "Finished {} with {} failed files, {}/{} completed",
                self.repo(),
                snapshot.failed,
                snapshot.completed,
                snapshot.total
            ),
            RunOutcome::Cancelled => info!(
                "Cancelled {}: {}/{} files completed",
                self.repo(),
                snapshot.completed,
                snapshot.total
            ),
        }

        let report = RunReport {
            outcome,
            snapshot,
            duration: started.elapsed(),
            directory: self.config.directory.clone(),
        };
        self.emit(Event::Finished {
            report: report.clone(),
        });
        report
    }
}
