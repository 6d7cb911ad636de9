//! Common test utilities for thumbnail-dl integration tests.
//!
//! Not every integration test uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thumbnail_dl::{
    Config, DecodeError, Decoder, Fetcher, ThumbnailDownloader, TransportError,
};
use tokio::sync::{Semaphore, mpsc};

/// How long tests wait for an expected delivery
pub const WAIT: Duration = Duration::from_secs(5);

/// In-memory fetcher driven entirely through the public `Fetcher` contract
pub struct MemoryFetcher {
    responses: Mutex<HashMap<String, Result<Vec<u8>, u16>>>,
    /// One shared gate; when armed, every fetch waits for a permit
    gate: Semaphore,
    gated: Mutex<bool>,
    fetch_count: Mutex<usize>,
}

impl MemoryFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            gate: Semaphore::new(0),
            gated: Mutex::new(false),
            fetch_count: Mutex::new(0),
        })
    }

    pub fn respond(&self, url: &str, bytes: &[u8]) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(bytes.to_vec()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }

    /// Make every subsequent fetch wait for a `release` permit
    pub fn hold_fetches(&self) {
        *self.gated.lock().unwrap() = true;
    }

    /// Allow `n` held fetches to proceed
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        *self.fetch_count.lock().unwrap() += 1;

        let gated = *self.gated.lock().unwrap();
        if gated {
            let permit = self.gate.acquire().await.expect("gate closed");
            permit.forget();
        }

        match self.responses.lock().unwrap().get(url) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(status)) => Err(TransportError::Status {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: "no scripted response".into(),
            }),
        }
    }
}

/// Decoder handing fetched bytes straight through
pub struct PassthroughDecoder;

impl Decoder for PassthroughDecoder {
    type Image = Vec<u8>;

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(bytes.to_vec())
    }
}

/// Coordinator over a memory fetcher and passthrough decoder, with a
/// channel-forwarding listener already registered
pub async fn memory_downloader() -> (
    ThumbnailDownloader<u32, Vec<u8>>,
    Arc<MemoryFetcher>,
    mpsc::UnboundedReceiver<(u32, Vec<u8>)>,
) {
    let fetcher = MemoryFetcher::new();
    let downloader =
        ThumbnailDownloader::new(Config::default(), fetcher.clone(), Arc::new(PassthroughDecoder))
            .expect("default config must be valid");

    let (tx, rx) = mpsc::unbounded_channel();
    downloader
        .set_listener(move |token: u32, image: Vec<u8>| {
            tx.send((token, image)).ok();
        })
        .await;

    (downloader, fetcher, rx)
}

/// Await the next delivery, panicking if none arrives in time
pub async fn next_delivery(rx: &mut mpsc::UnboundedReceiver<(u32, Vec<u8>)>) -> (u32, Vec<u8>) {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a delivery")
        .expect("listener channel closed")
}
