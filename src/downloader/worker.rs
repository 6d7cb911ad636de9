//! Worker loop — consumes the intake queue and drives fetch + decode.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use super::delivery::Delivery;
use crate::decode::Decoder;
use crate::fetch::Fetcher;
use crate::request_table::RequestTable;
use crate::types::{Event, Token};

/// Everything the worker task needs, cloned out of the coordinator at start
pub(crate) struct WorkerContext<T, I> {
    pub(crate) table: RequestTable<T>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) decoder: Arc<dyn Decoder<Image = I>>,
    pub(crate) delivery_tx: mpsc::Sender<Delivery<T, I>>,
    pub(crate) event_tx: broadcast::Sender<Event<T>>,
    pub(crate) cancel: CancellationToken,
    pub(crate) work_rx: mpsc::UnboundedReceiver<T>,
}

impl<T: Token, I: Send + 'static> WorkerContext<T, I> {
    /// Process intake until cancelled or the intake channel closes
    ///
    /// One item at a time, sequentially. Cancellation is checked between
    /// items (`biased`), so an in-flight request finishes while everything
    /// still queued behind it is dropped without fetching.
    pub(crate) async fn run(mut self) {
        loop {
            let token = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                maybe_token = self.work_rx.recv() => match maybe_token {
                    Some(token) => token,
                    None => break,
                },
            };
            self.handle_request(token).await;
        }
        tracing::debug!("worker loop exited");
    }

    /// Fetch, decode, staleness-check and deliver one request
    ///
    /// A fetch or decode failure ends this item only — the entry stays in
    /// the table (the consumer may re-enqueue to retry) and the loop moves
    /// on to the next item.
    async fn handle_request(&mut self, token: T) {
        // Live-read: fetch whatever URL the slot wants *now*, not whatever it
        // wanted when the token was queued. A token whose entry was already
        // satisfied by an earlier coalesced message, or cleared, is skipped
        // without touching the network.
        let Some(url) = self.table.get(&token).await else {
            tracing::debug!(token = ?token, "request gone before fetch, skipping");
            return;
        };

        let bytes = match self.fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "thumbnail fetch failed");
                self.emit(Event::FetchFailed {
                    token,
                    url,
                    error: e.to_string(),
                });
                return;
            }
        };

        let image = match self.decoder.decode(&bytes) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "thumbnail decode failed");
                self.emit(Event::DecodeFailed {
                    token,
                    url,
                    error: e.to_string(),
                });
                return;
            }
        };

        // Staleness re-check: the slot must still want exactly this URL at
        // delivery time. remove_if_current compares against the URL captured
        // at fetch start and deletes the entry in the same critical section.
        if !self.table.remove_if_current(&token, &url).await {
            tracing::debug!(url = %url, "discarding stale thumbnail");
            self.emit(Event::Stale { token, url });
            return;
        }

        let delivery = Delivery {
            token: token.clone(),
            image,
        };
        if self.delivery_tx.send(delivery).await.is_err() {
            // Dispatch side is gone; nothing left to notify
            tracing::debug!(url = %url, "delivery channel closed, dropping result");
            return;
        }
        self.emit(Event::Delivered { token, url });
    }

    fn emit(&self, event: Event<T>) {
        // send() returns Err when there are no subscribers, which is fine
        self.event_tx.send(event).ok();
    }
}
