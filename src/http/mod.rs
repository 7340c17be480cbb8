//! HTTP client construction.
//!
//! Every request made by hubfetch goes through a `reqwest` client wrapped in
//! `reqwest-middleware`, so requests are traced with `reqwest-tracing`. The
//! access token, when configured, rides along as a default
//! `Authorization: Bearer` header.
//!
//! ```rust
//! use hubfetch::http::{create_http_client, HttpClientConfig};
//!
//! # fn example() -> hubfetch::Result<()> {
//! let config = HttpClientConfig {
//!     token: Some("hf_xxx".into()),
//!     ..HttpClientConfig::default()
//! };
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{create_http_client, HttpClientConfig};
