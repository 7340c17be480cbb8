//! Point-in-time progress statistics.

use super::record::TaskRecord;

use chrono::Local;
use indicatif::{HumanBytes, HumanDuration};
use std::time::Duration;

/// Progress derived from a [`TaskRecord`] at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
    pub current_file: String,
    /// Time since the task was first started, across runs.
    pub elapsed: Duration,
    pub files_per_second: f64,
    /// Estimated time remaining. Zero when no rate is known yet, so callers
    /// should check [`Snapshot::has_eta`] before showing it.
    pub eta: Duration,
    /// Cumulative bytes of completed files.
    pub downloaded_size: u64,
}

impl Snapshot {
    pub(crate) fn of(record: &TaskRecord) -> Self {
        let completed = record.completed_files.len();
        let total = record.total_files;
        let elapsed = (Local::now() - record.start_time)
            .to_std()
            .unwrap_or_default();

        let secs = elapsed.as_secs_f64();
        let files_per_second = if secs > 0.0 {
            completed as f64 / secs
        } else {
            0.0
        };
        let eta_secs = if files_per_second > 0.0 {
            total.saturating_sub(completed) as f64 / files_per_second
        } else {
            0.0
        };
        let eta = if eta_secs.is_finite() && eta_secs > 0.0 {
            Duration::from_secs_f64(eta_secs)
        } else {
            Duration::ZERO
        };

        Self {
            completed,
            total,
            failed: record.failed_files.len(),
            current_file: record.current_file.clone(),
            elapsed,
            files_per_second,
            eta,
            downloaded_size: record.downloaded_size,
        }
    }

    /// Completion in percent, 0 for an empty task.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }

    /// Files not completed yet, failed ones included.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    pub fn has_eta(&self) -> bool {
        !self.eta.is_zero()
    }

    /// One-line statistics block for periodic progress logging.
    pub fn stats_line(&self) -> String {
        let mut line = format!(
            "{}/{} files ({:.1}%), {} failed, {:.2} files/s, {} downloaded, elapsed {}",
            self.completed,
            self.total,
            self.percent(),
            self.failed,
            self.files_per_second,
            HumanBytes(self.downloaded_size),
            HumanDuration(self.elapsed)
        );
        if self.has_eta() {
            line.push_str(&format!(", ETA {}", HumanDuration(self.eta)));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use indexmap::IndexSet;

    fn record(total: usize, completed: usize, started_secs_ago: i64) -> TaskRecord {
        let files: IndexSet<String> = (0..total).map(|i| format!("f{}", i)).collect();
        let mut record = TaskRecord::new("org/model", files.clone());
        record.completed_files = files.into_iter().take(completed).collect();
        record.start_time = Local::now() - ChronoDuration::seconds(started_secs_ago);
        record
    }

    #[test]
    fn test_rates_and_eta() {
        let snap = Snapshot::of(&record(10, 5, 100));
        assert_eq!(snap.completed, 5);
        assert_eq!(snap.remaining(), 5);
        assert!((snap.percent() - 50.0).abs() < f64::EPSILON);
        assert!(snap.files_per_second > 0.04 && snap.files_per_second <= 0.05);
        // 5 files at ~0.05 files/s is roughly 100 s.
        assert!(snap.eta.as_secs() >= 99 && snap.eta.as_secs() <= 101);
        assert!(snap.has_eta());
    }

    #[test]
    fn test_no_progress_has_zero_eta() {
        let snap = Snapshot::of(&record(10, 0, 100));
        assert_eq!(snap.files_per_second, 0.0);
        assert_eq!(snap.eta, Duration::ZERO);
        assert!(!snap.has_eta());
    }

    #[test]
    fn test_stats_line_shows_size_and_eta() {
        let mut rec = record(10, 5, 100);
        rec.downloaded_size = 3 * 1024 * 1024;
        let line = Snapshot::of(&rec).stats_line();
        assert!(line.starts_with("5/10 files (50.0%), 0 failed"), "{}", line);
        assert!(line.contains("3.00 MiB downloaded"), "{}", line);
        assert!(line.contains(", ETA "), "{}", line);

        let line = Snapshot::of(&record(10, 0, 100)).stats_line();
        assert!(!line.contains("ETA"), "{}", line);
    }

    #[test]
    fn test_empty_task() {
        let snap = Snapshot::of(&record(0, 0, 0));
        assert_eq!(snap.percent(), 0.0);
        assert_eq!(snap.remaining(), 0);
    }
}
