//! Builder for [`RepoDownloader`].
//!
//! ```rust
//! use hubfetch::downloader::RepoDownloaderBuilder;
//! use hubfetch::hub::RepoRef;
//! use std::path::PathBuf;
//!
//! # fn example() -> hubfetch::Result<()> {
//! let downloader = RepoDownloaderBuilder::new(RepoRef::parse("org/model")?)
//!     .directory(PathBuf::from("./downloads/org_model"))
//!     .include(vec!["*.json".into(), "*.safetensors".into()])
//!     .exclude(vec!["*.bin".into()])
//!     .concurrent_downloads(5)
//!     .max_attempts(4)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::DownloaderConfig, downloader::RepoDownloader};
use crate::cancel::CancelHandle;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::filter::PatternFilter;
use crate::hub::{HubClient, RepoRef};
use crate::progress::{Event, StyleOptions};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`RepoDownloader`] for one repository.
#[derive(Debug)]
pub struct RepoDownloaderBuilder {
    repo: RepoRef,
    config: DownloaderConfig,
    cancel: CancelHandle,
}

impl RepoDownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            config: DownloaderConfig::default(),
            cancel: CancelHandle::new(),
        }
    }

    /// Creates a builder whose progress bars are hidden.
    pub fn hidden(repo: RepoRef) -> Self {
        Self::new(repo).style_options(StyleOptions::hidden())
    }

    /// Sets the destination root.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Keeps only files matching at least one of these globs.
    pub fn include(mut self, patterns: Vec<String>) -> Self {
        self.config.include = patterns;
        self
    }

    /// Drops files matching any of these globs.
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude = patterns;
        self
    }

    /// Sets the number of files transferred at the same time (at least 1).
    pub fn concurrent_downloads(mut self, concurrent_downloads: usize) -> Self {
        self.config.concurrent_downloads = concurrent_downloads;
        self
    }

    /// Sets the number of transfer attempts per file (at least 1).
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn progress_file(mut self, progress_file: PathBuf) -> Self {
        self.config.progress_file = progress_file;
        self
    }

    /// Base delay of the exponential backoff between attempts.
    pub fn backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.config.backoff_unit = backoff_unit;
        self
    }

    /// Emits a `Stats` event every `stats_interval` processed files.
    pub fn stats_interval(mut self, stats_interval: usize) -> Self {
        self.config.stats_interval = stats_interval;
        self
    }

    pub fn style_options(mut self, style_options: StyleOptions) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Access token sent as a bearer token. Blank tokens are ignored.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.http.token = Some(token.into());
        self
    }

    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.http.proxy = Some(proxy);
        self
    }

    /// How long a transfer may stall before its attempt fails and is retried.
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.config.http.read_timeout = Some(read_timeout);
        self
    }

    /// Adds default headers. Can be called several times; the maps are merged.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config
            .http
            .headers
            .get_or_insert_with(HeaderMap::new)
            .extend(headers);
        self
    }

    /// Adds one default header.
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue};
    /// use hubfetch::downloader::RepoDownloaderBuilder;
    /// use hubfetch::hub::RepoRef;
    ///
    /// let ua = HeaderValue::from_static("my-mirror-sync/1.0");
    /// let builder = RepoDownloaderBuilder::new(RepoRef::parse("org/model").unwrap())
    ///     .header(header::USER_AGENT, ua);
    /// ```
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.config
            .http
            .headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    /// Called for every [`Event`] of a run, from the coordinating task.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.config.on_event = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Shares an existing cancel flag instead of a fresh one.
    pub fn cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Creates the [`RepoDownloader`].
    ///
    /// Fails on an invalid glob or an access token that cannot be sent as a header.
    pub fn build(mut self) -> Result<RepoDownloader> {
        self.config.concurrent_downloads = self.config.concurrent_downloads.max(1);
        self.config.max_attempts = self.config.max_attempts.max(1);
        self.config.stats_interval = self.config.stats_interval.max(1);

        let filter = PatternFilter::new(&self.config.include, &self.config.exclude)?;
        let hub = HubClient::new(self.repo, self.config.http.clone())?;
        let fetcher = Fetcher::new(
            hub,
            self.config.max_attempts,
            self.config.backoff_unit,
            self.cancel.clone(),
        );
        Ok(RepoDownloader::new(self.config, fetcher, filter, self.cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoRef {
        RepoRef::parse("org/model").unwrap()
    }

    #[test]
    fn test_defaults() {
        let d = RepoDownloaderBuilder::hidden(repo()).build().unwrap();
        assert_eq!(d.concurrent_downloads(), 3);
        assert_eq!(d.max_attempts(), 3);
        assert_eq!(d.progress_file(), &PathBuf::from("download_progress.json"));
        assert_eq!(d.stats_interval(), 10);
    }

    #[test]
    fn test_zero_values_are_raised() {
        let d = RepoDownloaderBuilder::hidden(repo())
            .concurrent_downloads(0)
            .max_attempts(0)
            .stats_interval(0)
            .build()
            .unwrap();
        assert_eq!(d.concurrent_downloads(), 1);
        assert_eq!(d.max_attempts(), 1);
        assert_eq!(d.stats_interval(), 1);
    }

    #[test]
    fn test_headers_merge() {
        let d = RepoDownloaderBuilder::hidden(repo())
            .header(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"))
            .headers(HeaderMap::from_iter([(
                reqwest::header::USER_AGENT,
                HeaderValue::from_static("test"),
            )]))
            .build()
            .unwrap();
        let headers = d.config().http.headers.as_ref().unwrap();
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let err = RepoDownloaderBuilder::hidden(repo())
            .include(vec!["[oops".into()])
            .build()
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_shared_cancel_handle() {
        let cancel = CancelHandle::new();
        let d = RepoDownloaderBuilder::hidden(repo())
            .cancel_handle(cancel.clone())
            .build()
            .unwrap();
        cancel.cancel();
        assert!(d.cancel_handle().is_cancelled());
    }
}
