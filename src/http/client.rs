//! HTTP client setup and middleware configuration.

use crate::error::Result;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Proxy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Whole-request timeout for transfers. `None` lets large files stream
    /// for as long as they need.
    pub timeout: Option<Duration>,
    /// Longest a transfer may sit idle between two reads before the attempt
    /// fails. Resets after every successful read.
    pub read_timeout: Option<Duration>,
}

impl HttpClientConfig {
    /// Timeout applied to HEAD metadata probes.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
    /// Timeout applied to the endpoint reachability check.
    pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default idle limit for transfers.
    pub const READ_TIMEOUT: Duration = Duration::from_secs(60);
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            proxy: None,
            headers: None,
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            read_timeout: Some(Self::READ_TIMEOUT),
        }
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// Fails when the token cannot be encoded as a header value or when the
/// underlying client cannot be built (TLS backend initialisation).
pub fn create_http_client(config: HttpClientConfig) -> Result<ClientWithMiddleware> {
    let mut headers = config.headers.unwrap_or_default();
    if !headers.contains_key(USER_AGENT) {
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("hubfetch/", env!("CARGO_PKG_VERSION"))),
        );
    }
    if let Some(token) = config.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let mut inner_client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout);
    if let Some(timeout) = config.timeout {
        inner_client_builder = inner_client_builder.timeout(timeout);
    }
    if let Some(read_timeout) = config.read_timeout {
        inner_client_builder = inner_client_builder.read_timeout(read_timeout);
    }
    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }
    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert!(config.token.is_none());
        assert!(config.proxy.is_none());
        assert!(config.headers.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.read_timeout, Some(HttpClientConfig::READ_TIMEOUT));
    }

    #[test]
    fn test_create_http_client_with_token() {
        let config = HttpClientConfig {
            token: Some("hf_abcdef".into()),
            ..HttpClientConfig::default()
        };
        assert!(create_http_client(config).is_ok());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = HttpClientConfig {
            token: Some("   ".into()),
            ..HttpClientConfig::default()
        };
        assert!(create_http_client(config).is_ok());
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let config = HttpClientConfig {
            token: Some("bad\ntoken".into()),
            ..HttpClientConfig::default()
        };
        assert!(matches!(
            create_http_client(config),
            Err(Error::InvalidToken { .. })
        ));
    }
}
