//! Core coordinator implementation split into focused submodules.
//!
//! The `ThumbnailDownloader` struct and its methods are organized by domain:
//! - [`queue`] - Request intake (`enqueue`/`clear`) and the pending table
//! - [`worker`] - The background fetch+decode loop
//! - [`delivery`] - Listener registration and the dispatch task
//! - [`lifecycle`] - Startup and shutdown coordination

mod delivery;
mod lifecycle;
mod queue;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use delivery::Listener;

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::broadcast;

use crate::config::Config;
use crate::decode::{Decoder, ImageDecoder};
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::request_table::RequestTable;
use crate::types::{Event, LifecycleState, Token};

use delivery::ListenerSlot;
use lifecycle::WorkerHandles;

/// Background thumbnail download coordinator (cloneable - all fields are
/// Arc-wrapped)
///
/// Generic over the consumer's token type `T` (the identity of "a slot that
/// wants an image") and the decoded image type `I` produced by the injected
/// [`Decoder`]. The coordinator owns one worker task that fetches and decodes
/// sequentially, and one dispatch task that invokes the registered
/// [`Listener`] — the consumer's calling context never blocks on network or
/// decode latency.
///
/// ```no_run
/// use thumbnail_dl::{Config, ThumbnailDownloader};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader: ThumbnailDownloader<u32, _> =
///         ThumbnailDownloader::over_http(Config::default())?;
///
///     downloader
///         .set_listener(|slot: u32, image: image::DynamicImage| {
///             println!("slot {slot} ready ({}x{})", image.width(), image.height());
///         })
///         .await;
///
///     downloader.start().await?;
///     downloader.enqueue(1, "https://example.com/thumb.jpg").await?;
///     # Ok(())
/// }
/// ```
pub struct ThumbnailDownloader<T, I> {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Network collaborator (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// Decode collaborator (trait object for pluggable implementations)
    pub(crate) decoder: Arc<dyn Decoder<Image = I>>,
    /// Pending token → URL table shared with the worker
    pub(crate) table: RequestTable<T>,
    /// Listener slot read by the dispatch task
    pub(crate) listener: ListenerSlot<T, I>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event<T>>,
    /// Lifecycle state flag (LifecycleState integer encoding)
    pub(crate) state: Arc<AtomicU8>,
    /// Intake sender and task handles, present while Running
    pub(crate) handles: Arc<tokio::sync::Mutex<Option<WorkerHandles<T>>>>,
}

impl<T, I> Clone for ThumbnailDownloader<T, I> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            fetcher: Arc::clone(&self.fetcher),
            decoder: Arc::clone(&self.decoder),
            table: self.table.clone(),
            listener: Arc::clone(&self.listener),
            event_tx: self.event_tx.clone(),
            state: Arc::clone(&self.state),
            handles: Arc::clone(&self.handles),
        }
    }
}

impl<T: Token, I: Send + 'static> ThumbnailDownloader<T, I> {
    /// Create a new coordinator over injected collaborators
    ///
    /// The coordinator starts in the `Created` state; call
    /// [`start()`](Self::start) to spin up the worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) when the configuration
    /// fails validation.
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        decoder: Arc<dyn Decoder<Image = I>>,
    ) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(config.event_buffer);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            decoder,
            table: RequestTable::new(),
            listener: Arc::new(tokio::sync::RwLock::new(None)),
            event_tx,
            state: Arc::new(AtomicU8::new(LifecycleState::Created.to_u8())),
            handles: Arc::new(tokio::sync::Mutex::new(None)),
        })
    }

    /// Subscribe to coordinator events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Events carry tokens and URLs, never images — the
    /// success path to the consumer is the [`Listener`], not this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<T>> {
        self.event_tx.subscribe()
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of pending requests in the table
    pub async fn pending(&self) -> usize {
        self.table.len().await
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub(crate) fn set_state(&self, state: LifecycleState) {
        self.state.store(state.to_u8(), Ordering::SeqCst);
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped
    /// (ok() converts Err to None); coordination never depends on anyone
    /// listening to the bus.
    pub(crate) fn emit_event(&self, event: Event<T>) {
        self.event_tx.send(event).ok();
    }
}

impl<T: Token> ThumbnailDownloader<T, image::DynamicImage> {
    /// Create a coordinator wired to the built-in HTTP fetcher and image
    /// decoder
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) when the configuration
    /// fails validation or the HTTP client cannot be built from it.
    pub fn over_http(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
        Self::new(config, fetcher, Arc::new(ImageDecoder))
    }
}
