//! In-memory content fetcher for deterministic testing
//!
//! Content is keyed by `"{address}/{path}"`, the same location string the
//! default [`ContentFetcher::locate`] produces. Unknown locations answer with a
//! 404 status error.
//!
//! # Blocking Lock Usage
//!
//! Uses `std::sync::Mutex` because this is test infrastructure; the lock is
//! never held across an await point.

use async_trait::async_trait;
use proveit_core::{ContentAddress, ContentFetcher, FetchError, ItemMetadata};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Kind of request observed by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `fetch_metadata`
    Metadata,
    /// `fetch_bytes`
    Bytes,
}

/// A request observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Which operation was called
    pub kind: RequestKind,
    /// `"{address}/{path}"`
    pub location: String,
    /// Timeout the caller supplied
    pub timeout: Duration,
}

#[derive(Debug, Default)]
struct MockState {
    metadata: HashMap<String, ItemMetadata>,
    blobs: HashMap<String, Vec<u8>>,
    failures: HashMap<String, VecDeque<FetchError>>,
    delays: HashMap<String, Duration>,
    requests: Vec<FetchRequest>,
}

/// Mock content network
#[derive(Debug, Clone, Default)]
pub struct MockContentFetcher {
    state: Arc<Mutex<MockState>>,
}

/// Location key used by the mock
pub fn location(address: &str, path: &str) -> String {
    format!("{address}/{}", path.trim_start_matches('/'))
}

impl MockContentFetcher {
    /// Create an empty content network
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `metadata` at `address/path`
    pub fn insert_metadata(&self, address: &str, path: &str, metadata: ItemMetadata) {
        let mut state = self.state.lock().unwrap();
        state.metadata.insert(location(address, path), metadata);
    }

    /// Serve `bytes` at `address/path`
    pub fn insert_bytes(&self, address: &str, path: &str, bytes: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.blobs.insert(location(address, path), bytes);
    }

    /// Fail the next `times` requests to `address/path` with `error`
    pub fn fail_next(&self, address: &str, path: &str, error: FetchError, times: usize) {
        let mut state = self.state.lock().unwrap();
        let queue = state.failures.entry(location(address, path)).or_default();
        queue.extend(std::iter::repeat(error).take(times));
    }

    /// Delay every response from `address/path`
    pub fn set_delay(&self, address: &str, path: &str, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.delays.insert(location(address, path), delay);
    }

    /// All requests observed so far, in call order
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Locations requested so far, in call order
    pub fn requested_locations(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.location).collect()
    }

    /// Number of requests to `address/path`
    pub fn request_count(&self, address: &str, path: &str) -> usize {
        let key = location(address, path);
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.location == key)
            .count()
    }

    /// Forget observed requests, keeping served content
    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    /// Record the request and decide its outcome without holding the lock
    /// across the simulated latency.
    fn begin(
        &self,
        kind: RequestKind,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> (String, Option<Duration>, Option<FetchError>) {
        let key = location(address.as_str(), path);
        let mut state = self.state.lock().unwrap();
        state.requests.push(FetchRequest {
            kind,
            location: key.clone(),
            timeout,
        });
        let delay = state.delays.get(&key).copied();
        let failure = state.failures.get_mut(&key).and_then(VecDeque::pop_front);
        (key, delay, failure)
    }

    async fn settle(
        key: &str,
        delay: Option<Duration>,
        failure: Option<FetchError>,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        if let Some(delay) = delay {
            if delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(FetchError::Timeout {
                    url: key.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn not_found(key: String) -> FetchError {
    FetchError::Status {
        url: key,
        status: 404,
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn fetch_metadata(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<ItemMetadata, FetchError> {
        let (key, delay, failure) = self.begin(RequestKind::Metadata, address, path, timeout);
        Self::settle(&key, delay, failure, timeout).await?;

        let found = self.state.lock().unwrap().metadata.get(&key).cloned();
        found.ok_or_else(|| not_found(key))
    }

    async fn fetch_bytes(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let (key, delay, failure) = self.begin(RequestKind::Bytes, address, path, timeout);
        Self::settle(&key, delay, failure, timeout).await?;

        let found = self.state.lock().unwrap().blobs.get(&key).cloned();
        found.ok_or_else(|| not_found(key))
    }
}
