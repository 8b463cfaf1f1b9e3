//! DocumentFetcher trait and its implementations.
//!
//! A fetcher turns a configured location into the text of a schedule page.
//! [`WebFetcher`] handles `http(s)://` URLs, `file://` URLs and plain paths;
//! [`StaticFetcher`] serves canned documents for tests and dry runs.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("schedcal/", env!("CARGO_PKG_VERSION"));

/// Fetches schedule documents.
///
/// Implementations must be `Send + Sync` so one fetcher can serve every
/// calendar of a run concurrently.
pub trait DocumentFetcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns the document text at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the location cannot be read or the
    /// document is empty.
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, SourceResult<String>>;
}

/// Where a location points.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Http(Url),
    File(PathBuf),
}

impl Location {
    fn parse(raw: &str) -> SourceResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SourceError::invalid_location("empty location"));
        }
        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Http(url)),
                "file" => url.to_file_path().map(Self::File).map_err(|_| {
                    SourceError::invalid_location("file URL has no usable path")
                        .with_location(raw)
                }),
                // Windows drive letters parse as a one-letter scheme.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(raw))),
                scheme => Err(SourceError::invalid_location(format!(
                    "unsupported scheme '{}'",
                    scheme
                ))
                .with_location(raw)),
            },
            Err(_) => Ok(Self::File(PathBuf::from(raw))),
        }
    }
}

/// Configuration for [`WebFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches over HTTP(S) or from the local filesystem.
pub struct WebFetcher {
    client: Client,
    config: FetchConfig,
}

impl WebFetcher {
    /// Creates a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_http(&self, url: Url) -> SourceResult<String> {
        trace!(url = %url, "Sending request");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            SourceError::network(format!("request failed: {}", e))
                .with_location(url.as_str())
                .with_source(e)
        })?;

        let status = response.status();
        trace!(status = %status, "Received response");
        check_status(status, &url)?;

        response.text().await.map_err(|e| {
            SourceError::network(format!("failed to read response: {}", e))
                .with_location(url.as_str())
                .with_source(e)
        })
    }

    async fn fetch_file(&self, path: PathBuf) -> SourceResult<String> {
        trace!(path = %path.display(), "Reading file");
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            let location = path.display().to_string();
            let err = if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::not_found("no such file")
            } else {
                SourceError::io(format!("failed to read file: {}", e))
            };
            err.with_location(location).with_source(e)
        })
    }
}

/// Accepts any 2xx status.
fn check_status(status: StatusCode, url: &Url) -> SourceResult<()> {
    if status.is_success() {
        return Ok(());
    }
    warn!(url = %url, status = %status, "Unexpected response status");
    Err(SourceError::http_status(status.as_u16()).with_location(url.as_str()))
}

impl DocumentFetcher for WebFetcher {
    fn name(&self) -> &str {
        "web"
    }

    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, SourceResult<String>> {
        Box::pin(async move {
            let body = match Location::parse(location)? {
                Location::Http(url) => self.fetch_http(url).await?,
                Location::File(path) => self.fetch_file(path).await?,
            };
            if body.trim().is_empty() {
                return Err(SourceError::empty_document().with_location(location));
            }
            debug!(location = %location, bytes = body.len(), "Fetched document");
            Ok(body)
        })
    }
}

/// Serves documents from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a document.
    pub fn with_document(mut self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(location.into(), body.into());
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentFetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, SourceResult<String>> {
        Box::pin(async move {
            match self.documents.get(location) {
                Some(body) if body.trim().is_empty() => {
                    Err(SourceError::empty_document().with_location(location))
                }
                Some(body) => Ok(body.clone()),
                None => Err(SourceError::not_found("no such document").with_location(location)),
            }
        })
    }
}
