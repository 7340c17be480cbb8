#![allow(dead_code)]

use hubfetch::downloader::RepoDownloaderBuilder;
use hubfetch::hub::{HubClient, RepoRef};
use hubfetch::HttpClientConfig;
use reqwest::Url;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Common test constants
pub const REPO_ID: &str = "org/model";
pub const TEST_BACKOFF: Duration = Duration::from_millis(1);

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// `file-01.bin`, `file-02.bin`, ...
pub fn file_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("file-{:02}.bin", i)).collect()
}

/// Deterministic body of a repository file.
pub fn content_for(file: &str) -> Vec<u8> {
    format!("payload of {} ", file).repeat(8).into_bytes()
}

/// A repository on the mock server.
pub fn repo_for(server: &MockServer) -> RepoRef {
    RepoRef::new(REPO_ID, Url::parse(&server.uri()).expect("mock server uri"))
}

pub fn hub_for(server: &MockServer) -> HubClient {
    HubClient::new(repo_for(server), HttpClientConfig::default()).expect("Failed to build client")
}

/// Builder with hidden bars, a fast backoff, and the destination and ledger
/// inside `dir`.
pub fn builder_for(server: &MockServer, dir: &TempDir) -> RepoDownloaderBuilder {
    RepoDownloaderBuilder::hidden(repo_for(server))
        .directory(destination(dir))
        .progress_file(progress_file(dir))
        .backoff_unit(TEST_BACKOFF)
}

pub fn destination(dir: &TempDir) -> PathBuf {
    dir.path().join("out")
}

pub fn progress_file(dir: &TempDir) -> PathBuf {
    dir.path().join("download_progress.json")
}

pub fn resolve_path(file: &str) -> String {
    format!("/{}/resolve/main/{}", REPO_ID, file)
}

/// Serves the repository listing with `files` as siblings.
pub async fn mount_listing(server: &MockServer, files: &[String]) {
    let siblings: Vec<_> = files.iter().map(|f| json!({ "rfilename": f })).collect();
    Mock::given(method("GET"))
        .and(path(format!("/api/models/{}/revision/main", REPO_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": REPO_ID,
            "siblings": siblings,
        })))
        .mount(server)
        .await;
}

/// Serves the full body of `file`, expecting exactly `gets` plain GETs.
pub async fn mount_file(server: &MockServer, file: &str, body: &[u8], gets: u64) {
    Mock::given(method("GET"))
        .and(path(resolve_path(file)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(gets)
        .mount(server)
        .await;
}

/// Serves `file` with the hub's LFS size header on HEAD.
pub async fn mount_head(server: &MockServer, file: &str, size: u64) {
    Mock::given(method("HEAD"))
        .and(path(resolve_path(file)))
        .respond_with(ResponseTemplate::new(200).insert_header("x-linked-size", size.to_string()))
        .mount(server)
        .await;
}

/// Serves `body[offset..]` as a 206 to `Range: bytes={offset}-`.
pub async fn mount_range(server: &MockServer, file: &str, body: &[u8], offset: usize) {
    let total = body.len();
    Mock::given(method("GET"))
        .and(path(resolve_path(file)))
        .and(header("range", format!("bytes={}-", offset).as_str()))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header(
                    "content-range",
                    format!("bytes {}-{}/{}", offset, total - 1, total).as_str(),
                )
                .set_body_bytes(body[offset..].to_vec()),
        )
        .with_priority(1)
        .expect(1)
        .mount(server)
        .await;
}

/// Serves every file of `files` with its [`content_for`] body.
pub async fn mount_repository(server: &MockServer, files: &[String], gets: u64) {
    mount_listing(server, files).await;
    for file in files {
        mount_file(server, file, &content_for(file), gets).await;
    }
}

/// Creates a file with the given content, parents included
pub fn create_local_file(dir: &Path, file: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(file);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&file_path, content).expect("Failed to write local file");
    file_path
}

/// Asserts that a file holds exactly `expected`
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let actual = fs::read(path).unwrap_or_else(|e| panic!("Cannot read {:?}: {}", path, e));
    assert_eq!(actual, expected, "Content mismatch at path: {:?}", path);
}
