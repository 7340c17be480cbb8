//! Retry-backoff file fetcher.
//!
//! ```rust,no_run
//! use hubfetch::{CancelHandle, HttpClientConfig};
//! use hubfetch::fetch::{FetchOutcome, Fetcher};
//! use hubfetch::hub::{HubClient, RepoRef};
//! use indicatif::ProgressBar;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # async fn example() -> hubfetch::Result<()> {
//! let hub = HubClient::new(RepoRef::parse("org/model")?, HttpClientConfig::default())?;
//! let fetcher = Fetcher::new(hub, 3, Duration::from_secs(1), CancelHandle::new());
//! match fetcher.fetch("config.json", Path::new("out"), &ProgressBar::hidden()).await {
//!     FetchOutcome::Completed { size, .. } => println!("{} bytes", size),
//!     FetchOutcome::Failed { error, .. } => eprintln!("{}", error),
//!     FetchOutcome::Cancelled => {}
//! }
//! # Ok(())
//! # }
//! ```

use super::outcome::FetchOutcome;
use crate::cancel::CancelHandle;
use crate::error::{Error, Result};
use crate::hub::HubClient;
use crate::utils::content_length::{parse_content_range_total, remote_size};

use futures::StreamExt;
use indicatif::ProgressBar;
use reqwest::header::{HeaderName, CONTENT_LENGTH, CONTENT_RANGE};
use reqwest::{Response, StatusCode};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::{fs, fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info, warn};

/// Downloads single files of one repository.
#[derive(Debug, Clone)]
pub struct Fetcher {
    hub: HubClient,
    max_attempts: u32,
    backoff_unit: Duration,
    cancel: CancelHandle,
}

impl Fetcher {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

    /// `max_attempts` below 1 is raised to 1.
    pub fn new(
        hub: HubClient,
        max_attempts: u32,
        backoff_unit: Duration,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            hub,
            max_attempts: max_attempts.max(1),
            backoff_unit,
            cancel,
        }
    }

    pub fn hub(&self) -> &HubClient {
        &self.hub
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after the failed attempt number `attempt` (0-based): `unit * 2^attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }

    /// Fetches `path` into `destination_root`.
    ///
    /// An existing local file whose size matches the remote one is reported
    /// complete without any transfer. Otherwise up to `max_attempts` resumable
    /// transfers are made, backing off between them. The cancel flag is
    /// checked before every attempt.
    pub async fn fetch(
        &self,
        path: &str,
        destination_root: &Path,
        progress: &ProgressBar,
    ) -> FetchOutcome {
        let output = match local_path(destination_root, path) {
            Ok(output) => output,
            Err(e) => {
                return FetchOutcome::Failed {
                    error: e.to_string(),
                    attempts: 0,
                }
            }
        };

        if let Some(size) = self.existing_complete_size(path, &output).await {
            info!("{} already exists and is complete, skipping", path);
            return FetchOutcome::Completed { size, attempts: 0 };
        }

        let mut last_error = String::new();
        for attempt in 0..self.max_attempts {
            if self.cancel.is_cancelled() {
                debug!("Not starting {}: cancelled", path);
                return FetchOutcome::Cancelled;
            }

            debug!(
                "Downloading {} (attempt {}/{})",
                path,
                attempt + 1,
                self.max_attempts
            );
            match self.transfer(path, &output, progress).await {
                Ok(size) => {
                    return FetchOutcome::Completed {
                        size,
                        attempts: attempt + 1,
                    }
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt + 1,
                        self.max_attempts,
                        path,
                        e
                    );
                    last_error = e.to_string();
                    if attempt + 1 < self.max_attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        FetchOutcome::Failed {
            error: last_error,
            attempts: self.max_attempts,
        }
    }

    /// Size of the local copy when it exists and matches the remote size.
    ///
    /// Probe errors only mean completeness cannot be confirmed.
    async fn existing_complete_size(&self, path: &str, output: &Path) -> Option<u64> {
        let metadata = fs::metadata(output).await.ok()?;
        if !metadata.is_file() {
            return None;
        }
        match self.hub.probe_size(path).await {
            Ok(Some(remote)) if remote == metadata.len() => Some(remote),
            Ok(remote) => {
                debug!(
                    "Local {} has {} bytes, remote reports {:?}",
                    path,
                    metadata.len(),
                    remote
                );
                None
            }
            Err(e) => {
                warn!("Could not check remote size of {}: {}", path, e);
                None
            }
        }
    }

    /// One attempt: continue from the current local length and stream the
    /// rest to disk. Returns the final size of the file.
    async fn transfer(&self, path: &str, output: &Path, progress: &ProgressBar) -> Result<u64> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).await?;
        }
        let size_on_disk = match fs::metadata(output).await {
            Ok(m) if m.is_file() => m.len(),
            _ => 0,
        };

        let res = self.hub.fetch(path, size_on_disk).await?;

        if res.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            let total = header_str(&res, CONTENT_RANGE).and_then(parse_content_range_total);
            if total == Some(size_on_disk) {
                return Ok(size_on_disk);
            }
            // The local bytes cannot be continued; start from zero next time.
            fs::remove_file(output).await?;
            return Err(Error::Internal(format!(
                "local copy of {} ({} bytes) does not match the remote file",
                path, size_on_disk
            )));
        }

        let res = res.error_for_status()?;
        let resumed = size_on_disk > 0 && res.status() == StatusCode::PARTIAL_CONTENT;
        let offset = if resumed { size_on_disk } else { 0 };
        if size_on_disk > 0 && !resumed {
            debug!("Server ignored the range request for {}, restarting", path);
        }

        let expected = if resumed {
            // A 206 body only covers the tail; its total lives in Content-Range.
            header_str(&res, CONTENT_RANGE)
                .and_then(parse_content_range_total)
                .or_else(|| {
                    header_str(&res, CONTENT_LENGTH)
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .map(|len| offset + len)
                })
        } else {
            remote_size(res.headers())
        };
        progress.set_length(expected.unwrap_or(0));
        progress.set_position(offset);

        debug!("Writing {:?} from byte {}", output, offset);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(resumed)
            .truncate(!resumed)
            .open(output)
            .await?;

        let mut written = offset;
        let mut stream = res.bytes_stream();
        while let Some(item) = stream.next().await {
            let mut chunk = item?;
            let chunk_size = chunk.len() as u64;
            file.write_all_buf(&mut chunk).await?;
            written += chunk_size;
            progress.inc(chunk_size);
        }
        file.flush().await?;

        if let Some(expected) = expected {
            if written != expected {
                return Err(Error::Internal(format!(
                    "{} stopped at {} of {} bytes",
                    path, written, expected
                )));
            }
        }
        Ok(written)
    }
}

fn header_str(res: &Response, name: HeaderName) -> Option<&str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Destination of a repository path under `root`.
///
/// Rejects empty paths and any path that is absolute or contains `.` or
/// `..` components.
pub fn local_path(root: &Path, path: &str) -> Result<PathBuf> {
    let relative = Path::new(path);
    let safe = !path.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(Error::UnsafePath(relative.to_path_buf()));
    }
    Ok(root.join(relative))
}
