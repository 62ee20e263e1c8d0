//! Content network effects trait definitions
//!
//! The gateway that resolves content addresses is an interchangeable detail:
//! any gateway serving the same addressing scheme can stand behind this trait.
//! Implementations live in `proveit-effects` (HTTP) and `proveit-testkit`
//! (in-memory).

use crate::address::ContentAddress;
use crate::manifest::ItemMetadata;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Content network fetch errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within its timeout
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout {
        /// Resolved request URL
        url: String,
        /// Timeout that elapsed, in milliseconds
        timeout_ms: u64,
    },
    /// The gateway answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// Resolved request URL
        url: String,
        /// HTTP status code
        status: u16,
    },
    /// Connection or transfer failure
    #[error("Request to {url} failed: {reason}")]
    Transport {
        /// Resolved request URL
        url: String,
        /// Reason for the failure
        reason: String,
    },
    /// Response body could not be decoded
    #[error("Failed to decode response from {url}: {reason}")]
    Decode {
        /// Resolved request URL
        url: String,
        /// Decoder error message
        reason: String,
    },
}

impl FetchError {
    /// Whether the failure is an elapsed timeout, as opposed to any other
    /// transport or resolution failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Status { url, .. }
            | Self::Transport { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }
}

/// Resolves a content address plus path to item metadata or raw bytes.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch and decode the metadata document at `address/path`
    async fn fetch_metadata(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<ItemMetadata, FetchError>;

    /// Fetch the raw bytes at `address/path`, regardless of content type
    async fn fetch_bytes(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError>;

    /// Human-readable location of `address/path`, used in error reports
    fn locate(&self, address: &ContentAddress, path: &str) -> String {
        format!("{address}/{path}")
    }
}

/// Blanket implementation for Arc<T> where T: ContentFetcher
#[async_trait]
impl<T: ContentFetcher + ?Sized> ContentFetcher for Arc<T> {
    async fn fetch_metadata(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<ItemMetadata, FetchError> {
        (**self).fetch_metadata(address, path, timeout).await
    }

    async fn fetch_bytes(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_bytes(address, path, timeout).await
    }

    fn locate(&self, address: &ContentAddress, path: &str) -> String {
        (**self).locate(address, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguishable() {
        let timeout = FetchError::Timeout {
            url: "u".to_string(),
            timeout_ms: 10,
        };
        let transport = FetchError::Transport {
            url: "u".to_string(),
            reason: "connection reset".to_string(),
        };
        assert!(timeout.is_timeout());
        assert!(!transport.is_timeout());
    }

    #[test]
    fn test_error_display_names_url() {
        let err = FetchError::Status {
            url: "https://gw/cid/3.png".to_string(),
            status: 504,
        };
        assert_eq!(err.url(), "https://gw/cid/3.png");
        assert_eq!(
            err.to_string(),
            "Request to https://gw/cid/3.png failed with status 504"
        );
    }
}
