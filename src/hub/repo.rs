//! Repository references.
//!
//! A [`RepoRef`] names one repository on one endpoint. It is usually parsed
//! from the URL a user copied out of a browser:
//!
//! ```rust
//! use hubfetch::hub::{RepoKind, RepoRef};
//!
//! # fn main() -> hubfetch::Result<()> {
//! let repo = RepoRef::parse("https://hf-mirror.com/datasets/org/corpus/tree/v2")?;
//! assert_eq!(repo.id, "org/corpus");
//! assert_eq!(repo.kind, RepoKind::Dataset);
//! assert_eq!(repo.revision, "v2");
//! assert!(repo.is_mirror());
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};

use reqwest::Url;
use std::fmt;
use std::str::FromStr;

/// Base URL of the official hub.
pub const OFFICIAL_ENDPOINT: &str = "https://huggingface.co";
/// Base URL of the best known community mirror.
pub const MIRROR_ENDPOINT: &str = "https://hf-mirror.com";

const OFFICIAL_HOST: &str = "huggingface.co";
const DEFAULT_REVISION: &str = "main";

/// Kind of repository. Each kind lives under its own URL namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoKind {
    #[default]
    Model,
    Dataset,
    Space,
}

impl RepoKind {
    /// Path segment used by the JSON API (`/api/models/...`).
    pub fn api_segment(&self) -> &'static str {
        match self {
            RepoKind::Model => "models",
            RepoKind::Dataset => "datasets",
            RepoKind::Space => "spaces",
        }
    }

    /// Path prefix used by browsable and resolve URLs. Models have none.
    pub fn url_prefix(&self) -> Option<&'static str> {
        match self {
            RepoKind::Model => None,
            RepoKind::Dataset => Some("datasets"),
            RepoKind::Space => Some("spaces"),
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "models" => Some(RepoKind::Model),
            "datasets" => Some(RepoKind::Dataset),
            "spaces" => Some(RepoKind::Space),
            _ => None,
        }
    }
}

/// A repository on a given endpoint, at a given revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// `owner/name` (or a bare `name` for legacy repositories).
    pub id: String,
    pub kind: RepoKind,
    /// Branch, tag or commit. Defaults to `main`.
    pub revision: String,
    /// Base URL of the hub serving the repository.
    pub endpoint: Url,
}

impl RepoRef {
    /// A model repository at `main` on `endpoint`.
    pub fn new(id: impl Into<String>, endpoint: Url) -> Self {
        Self {
            id: id.into(),
            kind: RepoKind::Model,
            revision: DEFAULT_REVISION.into(),
            endpoint,
        }
    }

    /// Sets the repository kind.
    pub fn with_kind(mut self, kind: RepoKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the revision.
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Parses a repository URL, a mirror URL or a bare `owner/name`.
    ///
    /// The host part becomes the endpoint, an optional `datasets/` or
    /// `spaces/` segment selects the kind, and a `/tree/<branch>` suffix
    /// selects the revision.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("the repository URL is empty".into()));
        }

        let (endpoint, path) = if trimmed.contains("://") {
            let url = Url::parse(trimmed).map_err(|e| {
                Error::InvalidUrl(format!("the url \"{}\" cannot be parsed: {}", trimmed, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(Error::InvalidUrl(format!(
                    "the url \"{}\" is not an http(s) address",
                    trimmed
                )));
            }
            let mut endpoint = url.clone();
            endpoint.set_path("");
            endpoint.set_query(None);
            endpoint.set_fragment(None);
            (endpoint, url.path().to_string())
        } else {
            let endpoint = Url::parse(OFFICIAL_ENDPOINT)
                .map_err(|e| Error::Internal(format!("bad official endpoint: {}", e)))?;
            (endpoint, trimmed.to_string())
        };

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let kind = match segments.first().and_then(|s| RepoKind::from_segment(s)) {
            Some(kind) => {
                segments.remove(0);
                kind
            }
            None => RepoKind::Model,
        };

        let mut revision = DEFAULT_REVISION.to_string();
        if let Some(pos) = segments.iter().skip(1).position(|s| *s == "tree") {
            let pos = pos + 1;
            let branch = segments[pos + 1..].join("/");
            if !branch.is_empty() {
                revision = branch;
            }
            segments.truncate(pos);
        }

        if segments.is_empty() || segments.len() > 2 {
            return Err(Error::InvalidUrl(format!(
                "\"{}\" does not name a repository (expected owner/name)",
                input.trim()
            )));
        }

        Ok(Self {
            id: segments.join("/"),
            kind,
            revision,
            endpoint,
        })
    }

    /// Whether the endpoint is anything other than the official hub.
    pub fn is_mirror(&self) -> bool {
        self.endpoint.host_str() != Some(OFFICIAL_HOST)
    }

    /// Endpoint without its trailing slash, for display.
    pub fn endpoint_str(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    /// Directory name used for this repository under the output directory.
    pub fn local_dir_name(&self) -> String {
        self.id.replace('/', "_")
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RepoRef::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.url_prefix() {
            Some(prefix) => write!(f, "{}/{}@{}", prefix, self.id, self.revision),
            None => write!(f, "{}@{}", self.id, self.revision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_url() {
        let repo = RepoRef::parse("https://huggingface.co/bert-base/uncased").unwrap();
        assert_eq!(repo.id, "bert-base/uncased");
        assert_eq!(repo.kind, RepoKind::Model);
        assert_eq!(repo.revision, "main");
        assert_eq!(repo.endpoint_str(), OFFICIAL_ENDPOINT);
        assert!(!repo.is_mirror());
    }

    #[test]
    fn test_mirror_url_with_tree_suffix() {
        let repo = RepoRef::parse("https://hf-mirror.com/org/model/tree/dev/").unwrap();
        assert_eq!(repo.id, "org/model");
        assert_eq!(repo.revision, "dev");
        assert_eq!(repo.endpoint_str(), MIRROR_ENDPOINT);
        assert!(repo.is_mirror());
    }

    #[test]
    fn test_tree_without_branch_keeps_main() {
        let repo = RepoRef::parse("https://huggingface.co/org/model/tree").unwrap();
        assert_eq!(repo.id, "org/model");
        assert_eq!(repo.revision, "main");
    }

    #[test]
    fn test_branch_with_slashes() {
        let repo = RepoRef::parse("https://huggingface.co/org/model/tree/refs/pr/3").unwrap();
        assert_eq!(repo.revision, "refs/pr/3");
    }

    #[test]
    fn test_dataset_and_space_prefixes() {
        let ds = RepoRef::parse("https://huggingface.co/datasets/org/data").unwrap();
        assert_eq!(ds.kind, RepoKind::Dataset);
        assert_eq!(ds.id, "org/data");
        let space = RepoRef::parse("https://huggingface.co/spaces/org/demo").unwrap();
        assert_eq!(space.kind, RepoKind::Space);
        assert_eq!(space.to_string(), "spaces/org/demo@main");
    }

    #[test]
    fn test_bare_repository_id() {
        let repo = RepoRef::parse("org/model").unwrap();
        assert_eq!(repo.id, "org/model");
        assert_eq!(repo.endpoint_str(), OFFICIAL_ENDPOINT);
    }

    #[test]
    fn test_custom_host_keeps_port() {
        let repo = RepoRef::parse("http://127.0.0.1:8080/org/model").unwrap();
        assert_eq!(repo.endpoint_str(), "http://127.0.0.1:8080");
        assert!(repo.is_mirror());
    }

    #[test]
    fn test_rejects_non_repository_input() {
        assert!(RepoRef::parse("").is_err());
        assert!(RepoRef::parse("https://huggingface.co/").is_err());
        assert!(RepoRef::parse("https://huggingface.co/org/model/blob/main/x.bin").is_err());
        assert!(RepoRef::parse("ftp://example.com/org/model").is_err());
    }

    #[test]
    fn test_local_dir_name() {
        let repo = RepoRef::parse("org/model").unwrap();
        assert_eq!(repo.local_dir_name(), "org_model");
    }
}
