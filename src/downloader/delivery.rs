//! Delivery channel and Listener plumbing.
//!
//! Completed outcomes cross from the worker task to the consumer through a
//! bounded mpsc channel drained by a dedicated dispatch task. The Listener is
//! only ever invoked from that task, never from the worker.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use super::ThumbnailDownloader;
use crate::types::Token;

/// Callback contract for completed thumbnails
///
/// Invoked exactly once per delivered outcome, in delivery order, on the
/// dispatch task. Only success crosses this boundary — failures are logged
/// and surfaced on the event bus instead.
///
/// Closures of the right shape implement this automatically:
///
/// ```no_run
/// # use thumbnail_dl::{Config, ThumbnailDownloader};
/// # async fn example(downloader: ThumbnailDownloader<u32, image::DynamicImage>) {
/// downloader
///     .set_listener(|slot: u32, image: image::DynamicImage| {
///         // hand the bitmap to the view for `slot`
///     })
///     .await;
/// # }
/// ```
pub trait Listener<T, I>: Send + Sync + 'static {
    /// A decoded, still-relevant thumbnail is ready for `token`
    fn on_ready(&self, token: T, image: I);
}

impl<T, I, F> Listener<T, I> for F
where
    F: Fn(T, I) + Send + Sync + 'static,
{
    fn on_ready(&self, token: T, image: I) {
        self(token, image)
    }
}

/// Listener registration slot, written by the consumer and read per delivery
/// by the dispatch task
pub(crate) type ListenerSlot<T, I> = Arc<RwLock<Option<Arc<dyn Listener<T, I>>>>>;

/// One completed outcome in flight from the worker to the dispatch task
pub(crate) struct Delivery<T, I> {
    pub(crate) token: T,
    pub(crate) image: I,
}

/// Dispatch task state: drains the delivery channel and invokes the Listener
///
/// The loop ends when the worker drops its sender; pending deliveries are
/// drained first, so an in-flight item the worker was allowed to finish
/// still reaches the Listener during shutdown.
pub(crate) struct Dispatcher<T, I> {
    pub(crate) delivery_rx: mpsc::Receiver<Delivery<T, I>>,
    pub(crate) listener: ListenerSlot<T, I>,
}

impl<T: Token, I: Send + 'static> Dispatcher<T, I> {
    pub(crate) async fn run(mut self) {
        while let Some(delivery) = self.delivery_rx.recv().await {
            let listener = self.listener.read().await.clone();
            match listener {
                Some(listener) => listener.on_ready(delivery.token, delivery.image),
                None => {
                    tracing::debug!(token = ?delivery.token, "no listener registered, dropping delivery");
                }
            }
        }
        tracing::debug!("dispatch loop exited");
    }
}

impl<T: Token, I: Send + 'static> ThumbnailDownloader<T, I> {
    /// Register the listener that receives completed thumbnails
    ///
    /// May be called at any lifecycle state and replaces any previous
    /// listener. Deliveries that occur while no listener is registered are
    /// dropped silently.
    pub async fn set_listener<L: Listener<T, I>>(&self, listener: L) {
        *self.listener.write().await = Some(Arc::new(listener));
    }
}
