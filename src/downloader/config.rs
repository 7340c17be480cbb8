//! Downloader configuration and defaults.
//!
//! ```rust
//! use hubfetch::downloader::EventCallback;
//! use hubfetch::progress::Event;
//!
//! let callback: EventCallback = Box::new(|event: &Event| match event {
//!     Event::FileCompleted { path, .. } => println!("✓ {}", path),
//!     Event::FileFailed { path, error } => println!("✗ {} - {}", path, error),
//!     _ => {}
//! });
//! ```

use crate::fetch::Fetcher;
use crate::http::HttpClientConfig;
use crate::progress::{Event, StyleOptions};

use std::env::current_dir;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Observer of run [`Event`]s.
pub type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Everything a [`RepoDownloader`](super::RepoDownloader) needs besides the repository.
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Destination root; repository paths are laid out below it.
    pub directory: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Files transferred at the same time.
    pub concurrent_downloads: usize,
    /// Transfer attempts per file.
    pub max_attempts: u32,
    pub backoff_unit: Duration,
    /// Location of the progress ledger.
    pub progress_file: PathBuf,
    /// A `Stats` event is emitted every this many processed files.
    pub stats_interval: usize,
    pub style_options: StyleOptions,
    pub http: HttpClientConfig,
    pub on_event: Option<Arc<EventCallback>>,
}

impl DownloaderConfig {
    pub const DEFAULT_CONCURRENT_DOWNLOADS: usize = 3;
    pub const DEFAULT_STATS_INTERVAL: usize = 10;
    pub const DEFAULT_PROGRESS_FILE: &'static str = "download_progress.json";
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("directory", &self.directory)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("concurrent_downloads", &self.concurrent_downloads)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_unit", &self.backoff_unit)
            .field("progress_file", &self.progress_file)
            .field("stats_interval", &self.stats_interval)
            .field("style_options", &self.style_options)
            .field("http", &self.http)
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            include: Vec::new(),
            exclude: Vec::new(),
            concurrent_downloads: Self::DEFAULT_CONCURRENT_DOWNLOADS,
            max_attempts: Fetcher::DEFAULT_MAX_ATTEMPTS,
            backoff_unit: Fetcher::DEFAULT_BACKOFF_UNIT,
            progress_file: PathBuf::from(Self::DEFAULT_PROGRESS_FILE),
            stats_interval: Self::DEFAULT_STATS_INTERVAL,
            style_options: StyleOptions::default(),
            http: HttpClientConfig::default(),
            on_event: None,
        }
    }
}
