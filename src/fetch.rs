//! Network fetching — the `Fetcher` collaborator contract and the built-in
//! HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HttpConfig;
use crate::error::{Error, TransportError};

/// Trait for fetching raw image bytes from a URL
///
/// This is the coordinator's network boundary. Implementations can use any
/// transport; the coordinator only requires "given a URL, return bytes or a
/// transport failure". The built-in [`HttpFetcher`] covers the common case.
///
/// A fetch is invoked sequentially by the worker, one request at a time, so
/// implementations need no internal request limiting.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch the raw byte content behind `url`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the URL is invalid, the host is
    /// unreachable, the request times out, or the server answers with a
    /// non-success status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// HTTP fetcher backed by a shared `reqwest` client
///
/// Built from [`HttpConfig`]: request/connect timeouts, User-Agent, and an
/// optional response-size cap.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_response_bytes: Option<u64>,
}

impl HttpFetcher {
    /// Build an HTTP fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the underlying HTTP client cannot be
    /// constructed from the given settings.
    pub fn new(config: &HttpConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
                key: Some("http".into()),
            })?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let parsed = url::Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Reject oversized bodies up front when the server declares a length
        if let (Some(limit), Some(declared)) = (self.max_response_bytes, response.content_length())
        {
            if declared > limit {
                return Err(TransportError::TooLarge {
                    actual: declared,
                    limit,
                });
            }
        }

        let bytes = response.bytes().await?;

        // Chunked responses carry no Content-Length; re-check the actual size
        if let Some(limit) = self.max_response_bytes {
            if bytes.len() as u64 > limit {
                return Err(TransportError::TooLarge {
                    actual: bytes.len() as u64,
                    limit,
                });
            }
        }

        Ok(bytes.to_vec())
    }
}
