//! Client for the hub's listing and resolve endpoints.

use super::repo::RepoRef;
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};
use crate::utils::content_length::remote_size;

use reqwest::{header::RANGE, Response, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::debug;

/// Subset of the repository metadata document we care about.
#[derive(Debug, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    siblings: Vec<Sibling>,
}

#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
}

/// Talks to one repository on one endpoint.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: ClientWithMiddleware,
    repo: RepoRef,
}

impl HubClient {
    /// Builds the underlying HTTP client from `config`.
    pub fn new(repo: RepoRef, config: HttpClientConfig) -> Result<Self> {
        Ok(Self::with_client(repo, create_http_client(config)?))
    }

    /// Uses an already configured client.
    pub fn with_client(repo: RepoRef, client: ClientWithMiddleware) -> Self {
        Self { client, repo }
    }

    /// The repository this client talks to.
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn endpoint_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.repo.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `{endpoint}/api/{kind}/{repo}/revision/{revision}`
    pub fn listing_url(&self) -> Url {
        let mut segments = vec!["api", self.repo.kind.api_segment()];
        segments.extend(self.repo.id.split('/'));
        segments.push("revision");
        segments.push(&self.repo.revision);
        self.endpoint_url(segments)
    }

    /// `{endpoint}/[{kind}/]{repo}/resolve/{revision}/{path}`, each segment percent-encoded.
    pub fn resolve_url(&self, path: &str) -> Url {
        let mut segments: Vec<&str> = self.repo.kind.url_prefix().into_iter().collect();
        segments.extend(self.repo.id.split('/'));
        segments.push("resolve");
        segments.push(&self.repo.revision);
        segments.extend(path.split('/'));
        self.endpoint_url(segments)
    }

    /// Lists every file path in the repository, in listing order.
    pub async fn list_files(&self) -> Result<Vec<String>> {
        let url = self.listing_url();
        debug!("Listing {}", url);
        let res = self.client.get(url.clone()).send().await?;
        if !res.status().is_success() {
            return Err(Error::Listing {
                status: res.status(),
                url: url.to_string(),
            });
        }
        let info: RepoInfo = res.json().await?;
        Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
    }

    /// Lightweight metadata probe returning the remote size of `path`.
    ///
    /// `Ok(None)` means the server did not say.
    pub async fn probe_size(&self, path: &str) -> Result<Option<u64>> {
        let res = self
            .client
            .head(self.resolve_url(path))
            .timeout(HttpClientConfig::PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(remote_size(res.headers()))
    }

    /// Requests `path`, starting at byte `offset` when it is non-zero.
    ///
    /// The response status is left for the caller to interpret, since a
    /// `416` can mean the local copy is already complete.
    pub async fn fetch(&self, path: &str, offset: u64) -> Result<Response> {
        let url = self.resolve_url(path);
        debug!("Fetching {} from byte {}", url, offset);
        let mut req = self.client.get(url);
        if offset > 0 {
            req = req.header(RANGE, format!("bytes={}-", offset));
        }
        Ok(req.send().await?)
    }

    /// HEAD on the endpoint root, used to warn early about an unreachable mirror.
    pub async fn check_endpoint(&self) -> Result<StatusCode> {
        let res = self
            .client
            .head(self.repo.endpoint.clone())
            .timeout(HttpClientConfig::CHECK_TIMEOUT)
            .send()
            .await?;
        Ok(res.status())
    }
}
