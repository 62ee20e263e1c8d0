//! Unified error type for provenance verification
//!
//! Every failure is terminal to a run: a verification either fully succeeds or
//! fails with exactly one identified cause.

use crate::effects::FetchError;
use crate::proof::ProofMismatch;
use serde::{Deserialize, Serialize};

/// Unified error type for all Proveit operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ProveitError {
    /// Manifest is missing required fields or is malformed
    #[error("Invalid manifest: {reason}")]
    InvalidManifest {
        /// What is wrong with the manifest
        reason: String,
    },

    /// Manifest file could not be read
    #[error("Failed to read manifest {path}: {reason}")]
    ManifestUnreadable {
        /// Path that was read
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// A URI contains no segment of the content-address length
    #[error("No content address found in '{uri}'")]
    NoAddressFound {
        /// The URI that was searched
        uri: String,
    },

    /// Content network failure
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Content does not match its commitment
    #[error(transparent)]
    ProofMismatch(#[from] ProofMismatch),

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Internal invariant violated
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal failure
        message: String,
    },
}

impl ProveitError {
    /// Create an invalid manifest error
    pub fn invalid_manifest(reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            reason: reason.into(),
        }
    }

    /// Create a missing content address error
    pub fn no_address_found(uri: impl Into<String>) -> Self {
        Self::NoAddressFound { uri: uri.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the failure came from a fetch that timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Fetch(err) if err.is_timeout())
    }
}

/// Standard Result type for Proveit operations
pub type Result<T> = std::result::Result<T, ProveitError>;

impl From<serde_json::Error> for ProveitError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_manifest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ProveitError::invalid_manifest("total is missing");
        assert!(matches!(err, ProveitError::InvalidManifest { .. }));
        assert_eq!(err.to_string(), "Invalid manifest: total is missing");
    }

    #[test]
    fn test_no_address_message_names_uri() {
        let err = ProveitError::no_address_found("ipfs://short/0");
        assert_eq!(
            err.to_string(),
            "No content address found in 'ipfs://short/0'"
        );
    }

    #[test]
    fn test_timeout_classification() {
        let timeout = ProveitError::from(FetchError::Timeout {
            url: "https://gw/x/0.png".to_string(),
            timeout_ms: 25_000,
        });
        assert!(timeout.is_timeout());

        let status = ProveitError::from(FetchError::Status {
            url: "https://gw/x/0.png".to_string(),
            status: 404,
        });
        assert!(!status.is_timeout());
        assert!(!ProveitError::internal("boom").is_timeout());
    }
}
