//! Configuration types for thumbnail-dl

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// HTTP client configuration for the built-in [`HttpFetcher`](crate::HttpFetcher)
///
/// Groups settings for the outbound request behavior. Used as a nested
/// sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum accepted response body size in bytes (None = unlimited)
    ///
    /// Thumbnails are small; a cap protects the worker from accidentally
    /// enqueued full-size originals.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Top-level configuration for a [`ThumbnailDownloader`](crate::ThumbnailDownloader)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Capacity of the bounded delivery channel (default: 64)
    ///
    /// The worker blocks when the channel is full; it processes one item at
    /// a time, so a full channel only delays the next fetch.
    #[serde(default = "default_delivery_buffer")]
    pub delivery_buffer: usize,

    /// Capacity of the event broadcast channel (default: 256)
    ///
    /// A subscriber that falls behind by more than this many events receives
    /// a `RecvError::Lagged` and resumes from the oldest retained event.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            delivery_buffer: default_delivery_buffer(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key when a value is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        if self.delivery_buffer == 0 {
            return Err(Error::Config {
                message: "delivery_buffer must be at least 1".into(),
                key: Some("delivery_buffer".into()),
            });
        }
        if self.event_buffer == 0 {
            return Err(Error::Config {
                message: "event_buffer must be at least 1".into(),
                key: Some("event_buffer".into()),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(Error::Config {
                message: "request_timeout_secs must be at least 1".into(),
                key: Some("http.request_timeout_secs".into()),
            });
        }
        if self.http.user_agent.is_empty() {
            return Err(Error::Config {
                message: "user_agent must not be empty".into(),
                key: Some("http.user_agent".into()),
            });
        }
        Ok(())
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("thumbnail-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_response_bytes() -> Option<u64> {
    // 8 MiB — generous for thumbnails, small enough to reject originals
    Some(8 * 1024 * 1024)
}

fn default_delivery_buffer() -> usize {
    64
}

fn default_event_buffer() -> usize {
    256
}
