//! Repository download coordination.
//!
//! - `downloader` - [`RepoDownloader`], which lists, filters, reconciles and
//!   fans files out to a bounded set of concurrent fetches
//! - `builder` - [`RepoDownloaderBuilder`] for configuring one
//! - `config` - configuration structure and the event callback type
//! - `report` - what a run hands back
//!
//! ## Stopping a run
//!
//! ```rust,no_run
//! use hubfetch::downloader::{RepoDownloaderBuilder, RunOutcome};
//! use hubfetch::hub::RepoRef;
//!
//! # async fn example() -> hubfetch::Result<()> {
//! let downloader = RepoDownloaderBuilder::hidden(RepoRef::parse("org/model")?).build()?;
//! let cancel = downloader.cancel_handle();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     cancel.cancel();
//! });
//! let report = downloader.run().await?;
//! assert!(matches!(report.outcome, RunOutcome::Success | RunOutcome::PartialFailure | RunOutcome::Cancelled));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;
pub mod report;

pub use builder::RepoDownloaderBuilder;
pub use config::{DownloaderConfig, EventCallback};
pub use downloader::RepoDownloader;
pub use report::{RunOutcome, RunReport};
