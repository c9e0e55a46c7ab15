//! Page sources
//!
//! `PageSource` is the seam between the parsers and the network. The HTTP
//! implementation wraps a `reqwest` client with a timeout and a TTL cache;
//! tests substitute canned HTML.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::cache::TtlCache;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a page body; non-2xx responses are errors
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

pub struct HttpPageSource {
    client: reqwest::Client,
    cache: Arc<TtlCache<String, String>>,
}

impl HttpPageSource {
    pub fn new(timeout: Duration, cache: Arc<TtlCache<String, String>>) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ark-db-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client, cache })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        if let Some(body) = self.cache.get(&url.to_string()) {
            debug!("Page cache HIT: {}", url);
            return Ok(body);
        }

        let http_err = |source| ScrapeError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(http_err)?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        self.cache.insert(url.to_string(), body.clone());
        Ok(body)
    }
}
