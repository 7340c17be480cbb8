//! Result of fetching one file.

/// What happened to one file.
///
/// `Cancelled` is deliberately separate from `Failed`: a cancelled file is
/// not recorded in the ledger at all and stays eligible for the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file is complete on disk. `attempts` is 0 when the local copy
    /// already matched the remote size and nothing was transferred.
    Completed { size: u64, attempts: u32 },
    /// Every attempt failed; `error` is the last error message.
    Failed { error: String, attempts: u32 },
    /// Stopped before an attempt could start.
    Cancelled,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Completed { .. })
    }

    /// Completed without transferring anything.
    pub fn is_skipped(&self) -> bool {
        matches!(self, FetchOutcome::Completed { attempts: 0, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_predicates() {
        let skipped = FetchOutcome::Completed { size: 4, attempts: 0 };
        assert!(skipped.is_success());
        assert!(skipped.is_skipped());

        let downloaded = FetchOutcome::Completed { size: 4, attempts: 2 };
        assert!(downloaded.is_success());
        assert!(!downloaded.is_skipped());

        let failed = FetchOutcome::Failed {
            error: "timeout".into(),
            attempts: 3,
        };
        assert!(!failed.is_success());
        assert!(!FetchOutcome::Cancelled.is_success());
    }
}
