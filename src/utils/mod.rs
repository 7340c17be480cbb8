//! Shared utility functions.
//!
//! - [`content_length`] - remote size extraction from hub response headers

pub mod content_length;

pub use content_length::{parse_content_range_total, remote_size};
