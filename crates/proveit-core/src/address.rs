//! Content address extraction
//!
//! Content-addressed URIs may carry the address behind a gateway prefix
//! (`https://gw/ipfs/<cid>/0`) or as the authority (`ipfs://<cid>/0`). The
//! address is the rightmost path segment of the fixed address length.

use crate::errors::{ProveitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a content address token in the supported scheme (CIDv1, base32)
pub const CONTENT_ADDRESS_LEN: usize = 59;

/// Routing key into the content network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Extract the content address from a URI-like string.
    ///
    /// Splits on `/` and keeps the last segment whose length equals
    /// [`CONTENT_ADDRESS_LEN`]. Fails with [`ProveitError::NoAddressFound`]
    /// when no segment qualifies.
    pub fn extract(uri: &str) -> Result<Self> {
        uri.split('/')
            .filter(|segment| segment.chars().count() == CONTENT_ADDRESS_LEN)
            .last()
            .map(|segment| Self(segment.to_string()))
            .ok_or_else(|| ProveitError::no_address_found(uri))
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
