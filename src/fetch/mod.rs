//! Single-file transfers with resumption and bounded retries.
//!
//! - [`fetcher`] - the [`Fetcher`] itself
//! - [`outcome`] - what a fetch reports back to the coordinator

pub mod fetcher;
pub mod outcome;

pub use fetcher::{local_path, Fetcher};
pub use outcome::FetchOutcome;
