//! Hubfetch downloads whole repositories from a Hugging Face style hub (or
//! one of its mirrors), several files at a time, and picks up where it left
//! off when interrupted.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use hubfetch::{hub::RepoRef, downloader::RepoDownloaderBuilder, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let repo = RepoRef::parse("https://huggingface.co/org/model")?;
//! let downloader = RepoDownloaderBuilder::new(repo)
//!     .directory(PathBuf::from("downloads/org_model"))
//!     .include(vec!["*.json".into(), "*.safetensors".into()])
//!     .build()?;
//! let report = downloader.run().await?;
//! println!("{}/{} files", report.snapshot.completed, report.snapshot.total);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`hub`] - repository references and the hub listing/resolve client
//! - [`filter`] - include/exclude glob selection
//! - [`ledger`] - the durable per-task progress file
//! - [`fetch`] - single-file transfers with resume and retry
//! - [`downloader`] - the concurrent coordinator and its builder
//! - [`progress`] - progress bars and structured events
//! - [`settings`] - last-used settings of the command line tool
//! - [`error`] - the `Error` enum
//! - [`http`] - HTTP client construction
//! - [`utils`] - shared helpers

pub mod cancel;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod http;
pub mod hub;
pub mod ledger;
pub mod progress;
pub mod settings;
pub mod utils;

pub use cancel::CancelHandle;
pub use downloader::{RepoDownloader, RepoDownloaderBuilder, RunOutcome, RunReport};
pub use error::{Error, Result};
pub use fetch::{FetchOutcome, Fetcher};
pub use filter::PatternFilter;
pub use http::{create_http_client, HttpClientConfig};
pub use hub::{HubClient, RepoKind, RepoRef};
pub use ledger::{Ledger, Reconciliation, Snapshot};
pub use progress::{Event, ProgressBarOpts, StyleOptions};
pub use settings::{Settings, SettingsStore};
