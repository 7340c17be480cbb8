//! Progress reporting.
//!
//! - `style` - progress bar templates and options
//! - `display` - the main and per-file bars of one run
//! - `event` - structured events for programmatic observers
//!
//! ## Hidden bars with an event observer
//!
//! ```rust,no_run
//! use hubfetch::downloader::RepoDownloaderBuilder;
//! use hubfetch::hub::RepoRef;
//! use hubfetch::progress::Event;
//!
//! # fn example() -> hubfetch::Result<()> {
//! let downloader = RepoDownloaderBuilder::hidden(RepoRef::parse("org/model")?)
//!     .on_event(|event: &Event| {
//!         if let Event::Stats { snapshot } = event {
//!             println!("{}/{} files", snapshot.completed, snapshot.total);
//!         }
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod display;
pub(crate) mod event;
pub(crate) mod style;

pub use display::ProgressDisplay;
pub use event::Event;
pub use style::{ProgressBarOpts, StyleOptions};
