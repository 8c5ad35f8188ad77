// OpenLibrary Search - Book Search and Wishlist Core
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! HTTP client for the Open Library catalog
//!
//! # Architecture
//!
//! ## Client Structure
//! The `CatalogClient` wraps `reqwest::Client` and provides:
//! - Search endpoint and cover endpoint management
//! - Custom headers (User-Agent, Accept)
//! - Timeout and connection pooling configuration
//!
//! ## Error Classification
//! - Request never answered (refused, DNS, timeout, body cut off) → `NoConnectivity`
//! - Non-2xx status → `UnexpectedStatusCode`
//! - Body that is not a search payload → `DecodeFailure`
//!
//! ## Retries
//! None. Each call issues exactly one request; the search debounce already
//! bounds the request rate and a user retries by typing again.

use crate::api::covers::{cover_url, CoverSize};
use crate::api::search::{build_search_url, parse_search_response, RawSearchResult};
use crate::config::{CoreConfig, DEFAULT_COVER_ENDPOINT, DEFAULT_SEARCH_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::error::{LibraryError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of raw search results
///
/// `CatalogClient` is the production implementation; the search coordinator
/// only depends on this trait.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<RawSearchResult>>;
}

/// Configuration for CatalogClient
/// Provides a builder pattern for client customization
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub search_endpoint: String,
    pub cover_endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            cover_endpoint: DEFAULT_COVER_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("openlibrary-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&CoreConfig> for ClientConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            search_endpoint: config.search_endpoint.clone(),
            cover_endpoint: config.cover_endpoint.clone(),
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn search_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.search_endpoint = endpoint.into();
        self
    }

    pub fn cover_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.cover_endpoint = endpoint.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the Open Library catalog
///
/// # Example
/// ```rust,no_run
/// use openlibrary_core::api::{CatalogClient, CatalogSearch};
///
/// # async fn example() -> openlibrary_core::error::Result<()> {
/// let client = CatalogClient::new()?;
/// let docs = client.search("the left hand of darkness").await?;
/// println!("{} results", docs.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    config: ClientConfig,
}

impl CatalogClient {
    /// Create a new CatalogClient with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new CatalogClient with custom configuration
    ///
    /// # Errors
    /// Returns error if an endpoint is not an absolute URL, the user agent is
    /// not a valid header value, or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        for endpoint in [&config.search_endpoint, &config.cover_endpoint] {
            url::Url::parse(endpoint).map_err(|e| {
                LibraryError::InvalidConfiguration(format!("Invalid endpoint '{}': {}", endpoint, e))
            })?;
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| LibraryError::InvalidInput(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of a cover image on the configured cover endpoint
    pub fn cover_url(&self, cover_id: &str, size: CoverSize) -> String {
        cover_url(&self.config.cover_endpoint, cover_id, size)
    }

    /// Download a cover image
    ///
    /// Same error classification as `search`. The caller decides whether to
    /// show a placeholder.
    pub async fn fetch_cover(&self, cover_id: &str, size: CoverSize) -> Result<Vec<u8>> {
        let url = self.cover_url(cover_id, size);
        debug!(%url, "Fetching cover image");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "image/*")
            .send()
            .await
            .map_err(|e| classify_send_error(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibraryError::UnexpectedStatusCode {
                status_code: status.as_u16(),
                endpoint: url,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            LibraryError::no_connectivity(format!("Failed to read cover body: {}", e), Some(url.clone()))
        })?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CatalogSearch for CatalogClient {
    /// Run one search request
    ///
    /// Zero matches is `Ok(vec![])`, not an error.
    async fn search(&self, query: &str) -> Result<Vec<RawSearchResult>> {
        let url = build_search_url(&self.config.search_endpoint, query)?;
        debug!(%url, "Dispatching catalog search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_send_error(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "Catalog search returned non-success status");
            return Err(LibraryError::UnexpectedStatusCode {
                status_code: status.as_u16(),
                endpoint: url,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            LibraryError::no_connectivity(format!("Failed to read response body: {}", e), Some(url.clone()))
        })?;

        let parsed = parse_search_response(&body)?;
        debug!(
            docs = parsed.docs.len(),
            num_found = parsed.num_found.unwrap_or_default(),
            "Catalog search decoded"
        );

        Ok(parsed.docs)
    }
}

fn classify_send_error(error: reqwest::Error, url: &str) -> LibraryError {
    if error.is_builder() {
        LibraryError::InvalidSearchUrl(format!("{}: {}", url, error))
    } else {
        LibraryError::no_connectivity(format!("Request failed: {}", error), Some(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a random local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/search.json", addr)
    }

    fn client_for(endpoint: String) -> CatalogClient {
        let config = ClientConfig::builder()
            .search_endpoint(endpoint)
            .timeout(Duration::from_secs(5))
            .build();
        CatalogClient::with_config(config).expect("Failed to create client")
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::builder()
            .search_endpoint("http://localhost:9000/search.json")
            .cover_endpoint("http://localhost:9000/covers")
            .timeout(Duration::from_secs(60))
            .user_agent("TestAgent/1.0")
            .build();

        assert_eq!(config.search_endpoint, "http://localhost:9000/search.json");
        assert_eq!(config.cover_endpoint, "http://localhost:9000/covers");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "TestAgent/1.0");
    }

    #[test]
    fn test_client_config_from_core_config() {
        let core = CoreConfig {
            request_timeout_secs: 7,
            ..CoreConfig::default()
        };
        let config = ClientConfig::from(&core);
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
    }

    #[test]
    fn test_client_rejects_relative_endpoint() {
        let config = ClientConfig::builder().search_endpoint("search.json").build();
        let result = CatalogClient::with_config(config);
        assert!(matches!(result.unwrap_err(), LibraryError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_cover_url_uses_configured_endpoint() {
        let client = CatalogClient::new().expect("Failed to create client");
        assert_eq!(
            client.cover_url("8231856", CoverSize::Medium),
            "https://covers.openlibrary.org/b/id/8231856-M.jpg"
        );
    }

    #[tokio::test]
    async fn test_search_decodes_docs() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"start":0,"num_found":2,"docs":[{"key":"k1","cover_i":1},{"key":"k2"}]}"#,
        )
        .await;

        let docs = client_for(endpoint).search("dune").await.expect("Search failed");
        let keys: Vec<&str> = docs.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2"]);
    }

    #[tokio::test]
    async fn test_search_zero_results_is_ok() {
        let endpoint = serve_once("200 OK", r#"{"start":0,"num_found":0,"docs":[]}"#).await;
        let docs = client_for(endpoint).search("zzzzunknown").await.expect("Search failed");
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_search_malformed_payload() {
        let endpoint = serve_once("200 OK", r#"{"results": "nope"}"#).await;
        let err = client_for(endpoint).search("dune").await.unwrap_err();
        assert!(matches!(err, LibraryError::DecodeFailure { .. }));
    }

    #[tokio::test]
    async fn test_search_server_error_status() {
        let endpoint = serve_once("500 Internal Server Error", "{}").await;
        let err = client_for(endpoint).search("dune").await.unwrap_err();
        assert!(matches!(err, LibraryError::UnexpectedStatusCode { status_code: 500, .. }));
        assert!(!err.is_no_connectivity());
    }

    #[tokio::test]
    async fn test_search_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        drop(listener);

        let err = client_for(format!("http://{}/search.json", addr))
            .search("dune")
            .await
            .unwrap_err();
        assert!(err.is_no_connectivity(), "unexpected error: {:?}", err);
    }
}
