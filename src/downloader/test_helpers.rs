//! Shared test helpers for driving the coordinator deterministically.
//!
//! `ScriptedFetcher` replaces the network: tests script per-URL responses,
//! observe the exact moment a fetch starts, and hold a fetch in flight with a
//! gate until the test releases it. `IdentityDecoder` passes bytes through so
//! assertions can compare payloads directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};

use crate::config::Config;
use crate::decode::Decoder;
use crate::downloader::ThumbnailDownloader;
use crate::error::{DecodeError, TransportError};
use crate::fetch::Fetcher;
use crate::types::LifecycleState;

/// Payload prefix that makes `IdentityDecoder` fail
pub(crate) const DECODE_FAIL: &[u8] = b"!decode-fail";

/// How long tests wait for an expected delivery or event
pub(crate) const WAIT: Duration = Duration::from_secs(5);

enum Scripted {
    Bytes(Vec<u8>),
    Status(u16),
}

/// Fetcher with scripted per-URL responses and test-controlled timing
pub(crate) struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Scripted>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    started_tx: mpsc::UnboundedSender<String>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    /// Returns the fetcher and a receiver yielding each URL as its fetch starts
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let fetcher = Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            started_tx,
            fetched: Mutex::new(Vec::new()),
        });
        (fetcher, started_rx)
    }

    /// Script a successful response for `url`
    pub(crate) fn respond(&self, url: &str, bytes: &[u8]) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Bytes(bytes.to_vec()));
    }

    /// Script a transport failure for `url`
    pub(crate) fn fail(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Status(status));
    }

    /// Hold any fetch of `url` in flight until the returned gate gets a permit
    /// (`gate.add_permits(1)`)
    pub(crate) fn gate(&self, url: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(url.to_string(), gate.clone());
        gate
    }

    /// URLs for which a fetch was actually issued, in order
    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.started_tx.send(url.to_string()).ok();

        let gate = self.gates.lock().unwrap().get(url).cloned();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.expect("gate semaphore closed");
            permit.forget();
        }

        match self.responses.lock().unwrap().get(url) {
            Some(Scripted::Bytes(bytes)) => Ok(bytes.clone()),
            Some(Scripted::Status(status)) => Err(TransportError::Status {
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

/// Decoder that hands the fetched bytes straight through, failing on the
/// `DECODE_FAIL` marker
pub(crate) struct IdentityDecoder;

impl Decoder for IdentityDecoder {
    type Image = Vec<u8>;

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
        if bytes.starts_with(DECODE_FAIL) {
            return Err(DecodeError::Malformed("scripted decode failure".into()));
        }
        Ok(bytes.to_vec())
    }
}

fn test_config() -> Config {
    Config {
        delivery_buffer: 8,
        event_buffer: 64,
        ..Default::default()
    }
}

/// Coordinator over a scripted fetcher and identity decoder.
/// Returns the coordinator, the fetcher handle, and the fetch-started stream.
pub(crate) fn create_test_downloader() -> (
    ThumbnailDownloader<u32, Vec<u8>>,
    Arc<ScriptedFetcher>,
    mpsc::UnboundedReceiver<String>,
) {
    let (fetcher, started_rx) = ScriptedFetcher::new();
    let downloader =
        ThumbnailDownloader::new(test_config(), fetcher.clone(), Arc::new(IdentityDecoder))
            .unwrap();
    (downloader, fetcher, started_rx)
}

/// Register a listener that forwards every delivery into a channel
pub(crate) async fn channel_listener(
    downloader: &ThumbnailDownloader<u32, Vec<u8>>,
) -> mpsc::UnboundedReceiver<(u32, Vec<u8>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    downloader
        .set_listener(move |token: u32, image: Vec<u8>| {
            tx.send((token, image)).ok();
        })
        .await;
    rx
}

/// Await the next fetch start, panicking if none arrives in time
pub(crate) async fn next_started(started_rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(WAIT, started_rx.recv())
        .await
        .expect("timed out waiting for a fetch to start")
        .expect("fetch-started channel closed")
}

/// Await the next delivery, panicking if none arrives in time
pub(crate) async fn next_delivery(
    rx: &mut mpsc::UnboundedReceiver<(u32, Vec<u8>)>,
) -> (u32, Vec<u8>) {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a delivery")
        .expect("listener channel closed")
}

/// Poll until the coordinator reaches `state`
pub(crate) async fn wait_for_state(
    downloader: &ThumbnailDownloader<u32, Vec<u8>>,
    state: LifecycleState,
) {
    tokio::time::timeout(WAIT, async {
        while downloader.state() != state {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for state {state:?}"));
}
