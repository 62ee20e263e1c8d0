//! Retrying content fetcher
//!
//! Wraps any [`ContentFetcher`] and retries timed-out requests according to a
//! [`RetryPolicy`]. Status, transport and decode failures are returned on the
//! first occurrence.

use async_trait::async_trait;
use proveit_core::{ContentAddress, ContentFetcher, FetchError, ItemMetadata, RetryPolicy};
use std::time::Duration;
use tracing::warn;

/// Fetcher decorator that retries timeouts
#[derive(Debug, Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: ContentFetcher> RetryingFetcher<F> {
    /// Wrap `inner` with the given retry policy
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wrapped fetcher
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

fn log_retry(attempt: u32, location: &str) {
    if attempt > 0 {
        warn!("Retrying {} after timeout (attempt {})", location, attempt + 1);
    }
}

#[async_trait]
impl<F: ContentFetcher> ContentFetcher for RetryingFetcher<F> {
    async fn fetch_metadata(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<ItemMetadata, FetchError> {
        let inner = &self.inner;
        let location = inner.locate(address, path);
        self.policy
            .execute_when(
                move |attempt| {
                    log_retry(attempt, &location);
                    inner.fetch_metadata(address, path, timeout)
                },
                FetchError::is_timeout,
            )
            .await
    }

    async fn fetch_bytes(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let inner = &self.inner;
        let location = inner.locate(address, path);
        self.policy
            .execute_when(
                move |attempt| {
                    log_retry(attempt, &location);
                    inner.fetch_bytes(address, path, timeout)
                },
                FetchError::is_timeout,
            )
            .await
    }

    fn locate(&self, address: &ContentAddress, path: &str) -> String {
        self.inner.locate(address, path)
    }
}
