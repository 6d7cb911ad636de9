//! # thumbnail-dl
//!
//! Background thumbnail download coordinator library.
//!
//! ## Design Philosophy
//!
//! thumbnail-dl is designed to be:
//! - **Non-blocking** - fetching and decoding happen on a dedicated worker,
//!   never on the caller's context
//! - **Last-write-wins** - re-enqueueing a token supersedes its previous
//!   request; a stale result is never delivered over a newer one
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Pluggable** - network and decoding are injected trait objects with
//!   batteries-included HTTP/image implementations
//!
//! ## Quick Start
//!
//! ```no_run
//! use thumbnail_dl::{Config, ThumbnailDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Tokens identify "which slot wants an image"; any Eq + Hash type works
//!     let downloader: ThumbnailDownloader<usize, _> =
//!         ThumbnailDownloader::over_http(Config::default())?;
//!
//!     downloader
//!         .set_listener(|slot: usize, image: image::DynamicImage| {
//!             println!("slot {slot}: {}x{}", image.width(), image.height());
//!         })
//!         .await;
//!
//!     downloader.start().await?;
//!     downloader.enqueue(0, "https://example.com/thumbs/0.jpg").await?;
//!     downloader.enqueue(1, "https://example.com/thumbs/1.jpg").await?;
//!
//!     // ... later, when the consumer goes away entirely:
//!     downloader.stop().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Image decoding collaborator
pub mod decode;
/// Core coordinator implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Network fetching collaborator
pub mod fetch;
/// Pending-request table
mod request_table;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, HttpConfig};
pub use decode::{Decoder, ImageDecoder};
pub use downloader::{Listener, ThumbnailDownloader};
pub use error::{DecodeError, Error, Result, TransportError};
pub use fetch::{Fetcher, HttpFetcher};
pub use types::{Event, LifecycleState, Token};

/// Helper function to run the coordinator with graceful signal handling.
///
/// Waits for a termination signal and then calls the coordinator's
/// [`stop()`](ThumbnailDownloader::stop) method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with a Ctrl+C fallback if
///   signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Errors
///
/// Propagates the error from `stop()` (lifecycle misuse if the coordinator
/// was never started).
///
/// # Example
///
/// ```no_run
/// use thumbnail_dl::{Config, ThumbnailDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader: ThumbnailDownloader<u64, _> =
///         ThumbnailDownloader::over_http(Config::default())?;
///     downloader.start().await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown<T, I>(downloader: ThumbnailDownloader<T, I>) -> Result<()>
where
    T: Token,
    I: Send + 'static,
{
    wait_for_signal().await;
    downloader.stop().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        _ => {
            tracing::warn!("Could not register unix signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
