//! Error types for thumbnail-dl
//!
//! This module provides error handling for the library, including:
//! - Collaborator error types (`TransportError`, `DecodeError`)
//! - Lifecycle misuse errors reported synchronously to the caller
//! - Configuration validation errors with the offending key

use thiserror::Error;

use crate::types::LifecycleState;

/// Result type alias for thumbnail-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for thumbnail-dl
///
/// Collaborator failures (`Transport`, `Decode`) are normally consumed inside
/// the worker loop and never reach the caller; they appear here so that
/// `Fetcher` and `Decoder` implementations can be exercised directly.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "delivery_buffer")
        key: Option<String>,
    },

    /// Operation invoked in a lifecycle state that does not permit it
    #[error("cannot {operation} while {state:?}")]
    Lifecycle {
        /// The operation that was attempted (e.g., "enqueue", "stop")
        operation: &'static str,
        /// The lifecycle state that rejected the operation
        state: LifecycleState,
    },

    /// Network fetch failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Image decoding failed
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Transport-level fetch errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The URL could not be parsed
    #[error("invalid url {url}: {reason}")]
    InvalidUrl {
        /// The URL that failed to parse
        url: String,
        /// Why parsing failed
        reason: String,
    },

    /// The request itself failed (unreachable host, timeout, TLS, ...)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status {
        /// The HTTP status code returned
        status: u16,
        /// The URL that was fetched
        url: String,
    },

    /// The response body exceeded the configured size cap
    #[error("response of {actual} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Actual (or declared) body size in bytes
        actual: u64,
        /// Configured maximum in bytes
        limit: u64,
    },
}

/// Image decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The response body was empty
    #[error("empty image payload")]
    Empty,

    /// The bytes were not a decodable image
    #[error("malformed image data: {0}")]
    Malformed(String),

    /// Decoder-library failure
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
