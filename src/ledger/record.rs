//! Serialized form of the ledger.

use chrono::{DateTime, Local};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Terminal state of a file in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Completed,
    Failed,
}

/// Per-file detail kept alongside the completed and failed sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDetail {
    pub status: FileStatus,
    /// Size in bytes, for completed files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// When the status was recorded.
    pub time: DateTime<Local>,
    /// Last error message, for failed files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The whole progress document.
///
/// `all_files` is mandatory: documents written before it existed fail to
/// deserialize and are treated as incompatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Repository the task belongs to, including its kind and revision
    /// (`datasets/org/corpus@v2`).
    pub repo_id: String,
    /// Filtered file list as of the last reconciliation.
    pub all_files: IndexSet<String>,
    pub total_files: usize,
    pub completed_files: IndexSet<String>,
    pub failed_files: IndexSet<String>,
    /// Most recently handled file. Display only.
    #[serde(default)]
    pub current_file: String,
    pub start_time: DateTime<Local>,
    #[serde(default)]
    pub last_update: Option<DateTime<Local>>,
    /// Cumulative size of completed files, in bytes.
    #[serde(default)]
    pub downloaded_size: u64,
    #[serde(default)]
    pub file_details: IndexMap<String, FileDetail>,
}

impl TaskRecord {
    /// A fresh task starting now.
    pub fn new(repo_id: &str, files: IndexSet<String>) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            total_files: files.len(),
            all_files: files,
            completed_files: IndexSet::new(),
            failed_files: IndexSet::new(),
            current_file: String::new(),
            start_time: Local::now(),
            last_update: None,
            downloaded_size: 0,
            file_details: IndexMap::new(),
        }
    }
}
