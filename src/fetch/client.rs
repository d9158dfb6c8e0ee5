//! HTTP fetcher for abstract pages.
//!
//! [`HttpFetcher`] issues exactly one GET per call with a bounded timeout and
//! an identifying User-Agent. It never retries; failures are returned as
//! [`FetchError`] and logged with the URL and cause.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument, warn};

use super::constants::{ACCEPT_HTML, MAX_CONNECT_TIMEOUT};
use super::error::FetchError;
use crate::config::HarvestConfig;

/// Source of page bodies for the pipeline.
///
/// The pipeline holds this as `Arc<dyn PageFetcher>` so tests can substitute
/// canned responses for the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on timeout, connection failure or a
    /// non-success status.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Reqwest-backed [`PageFetcher`].
///
/// Created once per run and reused, taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with the given per-request timeout and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised or
    /// the User-Agent is not a valid header value.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .timeout(timeout)
            .gzip(true)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Creates a fetcher from the run configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpFetcher::new`].
    pub fn from_config(config: &HarvestConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.request_timeout, &config.user_agent)
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::bad_status(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_transport(url, e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.send(url).await.inspect_err(|error| {
            warn!(
                url = %url,
                kind = %error.kind(),
                error = %error,
                "Fetch failed"
            );
        })
    }
}
