//! The progress ledger and its reconciliation rules.

use super::record::{FileDetail, FileStatus, TaskRecord};
use super::snapshot::Snapshot;
use crate::error::Result;

use chrono::Local;
use indexmap::IndexSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What was found on disk when the ledger was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No progress file existed.
    Missing,
    /// A progress file existed but could not be read as a current document.
    Incompatible,
    /// A usable progress document was loaded (or has since been created).
    Loaded,
}

/// Why a reconciliation started the task over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    NewTask,
    RepositoryChanged,
    IncompatibleLedger,
}

/// Outcome of [`Ledger::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Prior progress was discarded.
    Reset { reason: ResetReason },
    /// New paths appeared. `dropped` counts completed/failed entries purged
    /// because their path disappeared at the same time.
    Extended {
        added: usize,
        removed: usize,
        dropped: usize,
    },
    /// Paths disappeared and none appeared.
    Shrunk { removed: usize, dropped: usize },
    /// Same file set as last time. Nothing was written.
    Unchanged,
}

/// Durable record of which files of a task are done, failed or pending.
///
/// Mutators apply the change in memory first and then rewrite the progress
/// file. Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    record: TaskRecord,
    state: LoadState,
}

impl Ledger {
    /// Opens the progress file at `path`, tolerating a missing or unreadable one.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (record, state) = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<TaskRecord>(&text) {
                Ok(record) => {
                    info!(
                        "Loaded progress file {:?}: {} of {} files completed",
                        path,
                        record.completed_files.len(),
                        record.total_files
                    );
                    (record, LoadState::Loaded)
                }
                Err(e) => {
                    warn!("Progress file {:?} is not usable ({}), it will be reset", path, e);
                    (TaskRecord::new("", IndexSet::new()), LoadState::Incompatible)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No progress file at {:?}", path);
                (TaskRecord::new("", IndexSet::new()), LoadState::Missing)
            }
            Err(e) => {
                warn!("Cannot read progress file {:?} ({}), it will be reset", path, e);
                (TaskRecord::new("", IndexSet::new()), LoadState::Incompatible)
            }
        };
        Self { path, record, state }
    }

    /// Where the ledger is persisted.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// The in-memory document.
    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    pub fn repository_id(&self) -> &str {
        &self.record.repo_id
    }

    pub fn is_completed(&self, path: &str) -> bool {
        self.record.completed_files.contains(path)
    }

    pub fn is_failed(&self, path: &str) -> bool {
        self.record.failed_files.contains(path)
    }

    pub fn detail(&self, path: &str) -> Option<&FileDetail> {
        self.record.file_details.get(path)
    }

    /// Merges a freshly filtered listing into the stored state.
    ///
    /// `repository_id` identifies the task; callers pass the full repository
    /// reference so that switching kind or revision counts as a different
    /// repository. Resets on a new task, a different repository or an
    /// unreadable document. Otherwise keeps completed and failed entries whose path is
    /// still listed and drops the rest. Calling it again with the same file
    /// set changes nothing.
    pub async fn reconcile(&mut self, repository_id: &str, files: &[String]) -> Reconciliation {
        let current: IndexSet<String> = files.iter().cloned().collect();

        let reset = match self.state {
            LoadState::Missing => Some(ResetReason::NewTask),
            LoadState::Incompatible => Some(ResetReason::IncompatibleLedger),
            LoadState::Loaded if self.record.repo_id != repository_id => {
                Some(ResetReason::RepositoryChanged)
            }
            LoadState::Loaded => None,
        };
        if let Some(reason) = reset {
            info!(
                "Starting new task for {} with {} files ({:?})",
                repository_id,
                current.len(),
                reason
            );
            self.record = TaskRecord::new(repository_id, current);
            self.state = LoadState::Loaded;
            self.save().await;
            return Reconciliation::Reset { reason };
        }

        let added = current.difference(&self.record.all_files).count();
        let removed = self.record.all_files.difference(&current).count();
        if added == 0 && removed == 0 {
            debug!("File set unchanged since last run");
            return Reconciliation::Unchanged;
        }

        let dropped = self.retain_listed(&current);
        self.record.total_files = current.len();
        self.record.all_files = current;
        self.save().await;

        if added > 0 {
            info!(
                "Task updated: {} new files, {} removed, {} stale entries dropped",
                added, removed, dropped
            );
            Reconciliation::Extended {
                added,
                removed,
                dropped,
            }
        } else {
            info!(
                "Task updated: {} files excluded, {} stale entries dropped",
                removed, dropped
            );
            Reconciliation::Shrunk { removed, dropped }
        }
    }

    /// Purges completed/failed entries for paths not in `current` and returns
    /// how many were dropped.
    fn retain_listed(&mut self, current: &IndexSet<String>) -> usize {
        let before = self.record.completed_files.len() + self.record.failed_files.len();
        let details = &self.record.file_details;
        let mut freed = 0u64;
        self.record.completed_files.retain(|p| {
            let keep = current.contains(p);
            if !keep {
                freed += details.get(p).and_then(|d| d.size).unwrap_or(0);
            }
            keep
        });
        self.record.failed_files.retain(|p| current.contains(p));
        self.record.file_details.retain(|p, _| current.contains(p));
        self.record.downloaded_size = self.record.downloaded_size.saturating_sub(freed);
        if !current.contains(&self.record.current_file) {
            self.record.current_file.clear();
        }
        before - (self.record.completed_files.len() + self.record.failed_files.len())
    }

    /// `files` minus the completed ones, in order. Failed files are included.
    pub fn remaining(&self, files: &[String]) -> Vec<String> {
        files
            .iter()
            .filter(|f| !self.record.completed_files.contains(f.as_str()))
            .cloned()
            .collect()
    }

    /// Records a finished file. Returns `false` when nothing changed, which
    /// is the case for a path that is already completed.
    pub async fn mark_completed(&mut self, path: &str, size: u64) -> bool {
        if !self.is_known(path) || self.record.completed_files.contains(path) {
            return false;
        }
        self.record.failed_files.shift_remove(path);
        self.record.completed_files.insert(path.to_string());
        self.record.downloaded_size += size;
        self.record.file_details.insert(
            path.to_string(),
            FileDetail {
                status: FileStatus::Completed,
                size: Some(size),
                time: Local::now(),
                error: None,
            },
        );
        self.save().await;
        true
    }

    /// Records a file that ran out of attempts. A completed file is never
    /// demoted; `false` is returned instead.
    pub async fn mark_failed(&mut self, path: &str, error: &str) -> bool {
        if !self.is_known(path) || self.record.completed_files.contains(path) {
            return false;
        }
        self.record.failed_files.insert(path.to_string());
        self.record.file_details.insert(
            path.to_string(),
            FileDetail {
                status: FileStatus::Failed,
                size: None,
                time: Local::now(),
                error: Some(error.to_string()),
            },
        );
        self.save().await;
        true
    }

    /// Updates the "current file" display hint.
    pub async fn set_current(&mut self, path: &str) {
        self.record.current_file = path.to_string();
        self.save().await;
    }

    /// Progress statistics as of now.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.record)
    }

    fn is_known(&self, path: &str) -> bool {
        let known = self.record.all_files.contains(path);
        if !known {
            warn!("Ignoring progress update for unlisted file {}", path);
        }
        known
    }

    async fn save(&mut self) {
        self.record.last_update = Some(Local::now());
        if let Err(e) = self.write().await {
            warn!("Failed to save progress file {:?}: {}", self.path, e);
        }
    }

    /// Writes the document next to its destination and renames it into place.
    async fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.record)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
