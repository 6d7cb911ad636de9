//! Startup and shutdown coordination.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::ThumbnailDownloader;
use super::delivery::Dispatcher;
use super::worker::WorkerContext;
use crate::error::{Error, Result};
use crate::types::{Event, LifecycleState, Token};

/// How long `stop()` waits for each task to terminate before aborting it
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Intake sender and task handles, created by `start()` and consumed by
/// `stop()`
pub(crate) struct WorkerHandles<T> {
    pub(crate) work_tx: mpsc::UnboundedSender<T>,
    pub(crate) cancel: CancellationToken,
    pub(crate) worker: JoinHandle<()>,
    pub(crate) dispatcher: JoinHandle<()>,
}

impl<T: Token, I: Send + 'static> ThumbnailDownloader<T, I> {
    /// Spin up the worker and dispatch tasks
    ///
    /// Transitions `Created → Running`. Calling `start()` while already
    /// Running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] once the coordinator is Draining or
    /// Stopped — a stopped coordinator is not restartable.
    pub async fn start(&self) -> Result<()> {
        let mut slot = self.handles.lock().await;
        match self.state() {
            LifecycleState::Created => {}
            LifecycleState::Running => return Ok(()),
            state => {
                return Err(Error::Lifecycle {
                    operation: "start",
                    state,
                });
            }
        }

        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let (delivery_tx, delivery_rx) = mpsc::channel(self.config.delivery_buffer);
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(
            WorkerContext {
                table: self.table.clone(),
                fetcher: self.fetcher.clone(),
                decoder: self.decoder.clone(),
                delivery_tx,
                event_tx: self.event_tx.clone(),
                cancel: cancel.clone(),
                work_rx,
            }
            .run(),
        );

        let dispatcher = tokio::spawn(
            Dispatcher {
                delivery_rx,
                listener: self.listener.clone(),
            }
            .run(),
        );

        *slot = Some(WorkerHandles {
            work_tx,
            cancel,
            worker,
            dispatcher,
        });
        self.set_state(LifecycleState::Running);
        tracing::info!("thumbnail worker started");
        Ok(())
    }

    /// Gracefully shut the coordinator down
    ///
    /// Transitions `Running → Draining → Stopped`:
    /// 1. Signals the worker to stop; the in-flight item (if any) finishes
    ///    and may still be delivered, everything queued behind it is dropped
    ///    without fetching.
    /// 2. Waits for the worker, then for the dispatch task to drain and
    ///    terminate (each bounded by a timeout; a hung task is aborted).
    /// 3. Releases the request table and emits [`Event::Shutdown`].
    ///
    /// No deliveries occur after `stop()` returns. Idempotent once Stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] when called before `start()`.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.handles.lock().await;
        match self.state() {
            LifecycleState::Running => {}
            LifecycleState::Stopped => return Ok(()),
            state => {
                return Err(Error::Lifecycle {
                    operation: "stop",
                    state,
                });
            }
        }
        let Some(mut handles) = slot.take() else {
            // Running implies handles exist; fail closed if the invariant broke
            self.set_state(LifecycleState::Stopped);
            return Ok(());
        };

        self.set_state(LifecycleState::Draining);
        tracing::info!("initiating graceful shutdown");

        // Close the intake and signal the worker; queued items are dropped
        handles.cancel.cancel();
        drop(handles.work_tx);

        if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handles.worker)
            .await
            .is_err()
        {
            tracing::warn!("timeout waiting for worker to finish, aborting task");
            handles.worker.abort();
        }

        // The worker dropped its delivery sender; the dispatch task drains
        // what was already delivered, then terminates
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handles.dispatcher)
            .await
            .is_err()
        {
            tracing::warn!("timeout waiting for dispatcher to finish, aborting task");
            handles.dispatcher.abort();
        }

        self.table.clear().await;
        self.emit_event(Event::Shutdown);
        self.set_state(LifecycleState::Stopped);
        tracing::info!("graceful shutdown complete");
        Ok(())
    }
}
