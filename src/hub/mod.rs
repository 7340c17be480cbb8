//! Remote repository access.
//!
//! - [`repo`] - parsing user supplied repository or mirror URLs into a [`RepoRef`]
//! - [`client`] - the [`HubClient`] speaking the hub's listing and resolve endpoints

pub mod client;
pub mod repo;

pub use client::HubClient;
pub use repo::{RepoKind, RepoRef, MIRROR_ENDPOINT, OFFICIAL_ENDPOINT};
