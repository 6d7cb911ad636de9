//! Concurrent token → URL mapping shared between the consumer context and
//! the worker.
//!
//! The table is the single source of truth for "what should this slot show".
//! The consumer writes on enqueue and clear; the worker reads before fetching
//! and performs the atomic staleness check-then-delete on completion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::types::Token;

/// Shared pending-request table
///
/// One mutex guards the whole map, making every per-token operation atomic
/// with respect to all others. Entries are last-write-wins: a newer `put` for
/// the same token silently supersedes the old URL.
pub(crate) struct RequestTable<T> {
    entries: Arc<Mutex<HashMap<T, String>>>,
}

impl<T> Clone for RequestTable<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Token> RequestTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record `url` as the desired image for `token`, superseding any
    /// previous URL.
    pub(crate) async fn put(&self, token: T, url: String) {
        self.entries.lock().await.insert(token, url);
    }

    /// Current URL desired for `token`, if any.
    pub(crate) async fn get(&self, token: &T) -> Option<String> {
        self.entries.lock().await.get(token).cloned()
    }

    /// Delete the entry for `token`.
    pub(crate) async fn remove(&self, token: &T) {
        self.entries.lock().await.remove(token);
    }

    /// Atomic staleness check-then-delete.
    ///
    /// Removes the entry and returns true only if the table still maps
    /// `token` to exactly `url` (value equality against the URL captured at
    /// fetch start). Returns false — leaving the table untouched — when the
    /// entry was superseded or cleared while the fetch was in flight.
    pub(crate) async fn remove_if_current(&self, token: &T, url: &str) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(token) {
            Some(current) if current == url => {
                entries.remove(token);
                true
            }
            _ => false,
        }
    }

    /// Drop all entries.
    pub(crate) async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of pending entries.
    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
