//! Request intake — `enqueue` and `clear`.

use crate::error::{Error, Result};
use crate::types::{Event, LifecycleState, Token};

use super::ThumbnailDownloader;

impl<T: Token, I: Send + 'static> ThumbnailDownloader<T, I> {
    /// Request a thumbnail for `token`
    ///
    /// Records `url` as the image the slot wants and posts the token to the
    /// worker. A second enqueue for the same token before the first is
    /// processed supersedes it (last-write-wins): at most one image is ever
    /// delivered per token per enqueue, and it is the newest URL's.
    ///
    /// A failed fetch leaves the entry in the table and is not retried;
    /// enqueue the same token again to retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] when the coordinator is not Running.
    pub async fn enqueue(&self, token: T, url: impl Into<String>) -> Result<()> {
        let url = url.into();

        let handles = self.handles.lock().await;
        let state = self.state();
        let Some(handles) = handles.as_ref().filter(|_| state == LifecycleState::Running) else {
            return Err(Error::Lifecycle {
                operation: "enqueue",
                state,
            });
        };

        self.table.put(token.clone(), url.clone()).await;

        if handles.work_tx.send(token.clone()).is_err() {
            // Worker task died out from under us; undo the table write so the
            // entry does not linger as forever-pending
            self.table.remove(&token).await;
            return Err(Error::Lifecycle {
                operation: "enqueue",
                state: LifecycleState::Stopped,
            });
        }

        tracing::debug!(url = %url, "queued thumbnail request");
        self.emit_event(Event::Queued { token, url });
        Ok(())
    }

    /// Drop all pending requests
    ///
    /// Used when the consumer abandons all pending interest (its view is
    /// torn down) while the coordinator keeps running for a future view.
    /// Pending and in-flight-but-undelivered outcomes are cancelled
    /// logically: an in-flight fetch completes and its result is discarded
    /// by the staleness check.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] when the coordinator is not Running.
    pub async fn clear(&self) -> Result<()> {
        let state = self.state();
        if state != LifecycleState::Running {
            return Err(Error::Lifecycle {
                operation: "clear",
                state,
            });
        }

        self.table.clear().await;
        tracing::debug!("cleared all pending thumbnail requests");
        self.emit_event(Event::Cleared);
        Ok(())
    }
}
