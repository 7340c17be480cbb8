//! Error handling for hubfetch.
//!
//! Every fallible operation in the library returns [`Result`], whose error side
//! is the [`Error`] enum below. Per-file transfer errors are folded into a
//! message inside [`FetchOutcome`](crate::fetch::FetchOutcome) instead, so that
//! one bad file never aborts its siblings.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can happen when using hubfetch.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// Captures failures that don't fit into the other categories.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The repository URL (or mirror URL) could not be understood.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An include or exclude glob could not be compiled.
    #[error("Invalid pattern \"{pattern}\"")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The access token contains characters that cannot go into a header.
    #[error("Invalid access token")]
    InvalidToken {
        #[from]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// A repository path would escape the destination directory.
    #[error("Refusing to write outside the destination: {0}")]
    UnsafePath(PathBuf),

    /// The remote listing endpoint answered with a non-success status.
    #[error("Listing {url} failed with status {status}")]
    Listing {
        status: reqwest::StatusCode,
        url: String,
    },

    /// I/O Error.
    ///
    /// Wraps errors raised while creating, writing or reading files.
    #[error("I/O error: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the HTTP middleware stack.
    #[error("HTTP error: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// A ledger, settings or listing document could not be (de)serialized.
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Result type alias for operations that can fail with a hubfetch [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
