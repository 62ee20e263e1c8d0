//! Collection manifest and per-item metadata

use crate::errors::{ProveitError, Result};
use serde::{Deserialize, Serialize};

/// Published collection commitment
///
/// Immutable once loaded. Only presence of the required fields is checked;
/// the provenance hash is compared verbatim against the recomputed aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Number of items in the collection
    pub total: u64,
    /// Content-addressed URI of the metadata directory
    pub base_uri: String,
    /// Declared aggregate digest
    pub provenance_hash: String,
}

/// Wire shape of `manifest.json`; fields are optional so that absence is
/// reported as an invalid manifest rather than a parse failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestDocument {
    total: Option<serde_json::Number>,
    base_uri: Option<String>,
    provenance_hash: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl Manifest {
    /// Create a manifest directly
    pub fn new(
        total: u64,
        base_uri: impl Into<String>,
        provenance_hash: impl Into<String>,
    ) -> Self {
        Self {
            total,
            base_uri: base_uri.into(),
            provenance_hash: provenance_hash.into(),
        }
    }

    /// Parse and check a `manifest.json` document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: ManifestDocument = serde_json::from_str(content)?;

        if document.metadata.is_none() {
            return Err(ProveitError::invalid_manifest("missing 'metadata' field"));
        }

        let total = document
            .total
            .ok_or_else(|| ProveitError::invalid_manifest("missing 'total' field"))?;
        let total = total.as_u64().ok_or_else(|| {
            ProveitError::invalid_manifest(format!(
                "'total' must be a non-negative integer, got {total}"
            ))
        })?;

        let base_uri = document
            .base_uri
            .ok_or_else(|| ProveitError::invalid_manifest("missing 'baseUri' field"))?;
        let provenance_hash = document
            .provenance_hash
            .ok_or_else(|| ProveitError::invalid_manifest("missing 'provenanceHash' field"))?;

        Ok(Self {
            total,
            base_uri,
            provenance_hash,
        })
    }
}

/// Metadata document served for a single token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Content-addressed URI of the image
    pub image: String,
    /// Declared image digest
    pub hash: String,
}

impl ItemMetadata {
    /// Create item metadata
    pub fn new(image: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            hash: hash.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_complete_manifest() {
        let manifest = Manifest::from_json_str(
            r#"{
                "total": 3,
                "baseUri": "ipfs://cid/",
                "provenanceHash": "abc",
                "metadata": [],
                "name": "ignored"
            }"#,
        )
        .unwrap();

        assert_eq!(manifest, Manifest::new(3, "ipfs://cid/", "abc"));
    }

    #[test]
    fn test_missing_metadata_field_rejected() {
        let err = Manifest::from_json_str(r#"{"total": 1, "baseUri": "x", "provenanceHash": "y"}"#)
            .unwrap_err();
        assert_matches!(err, ProveitError::InvalidManifest { reason } if reason.contains("metadata"));
    }

    #[test]
    fn test_negative_total_rejected() {
        let err = Manifest::from_json_str(
            r#"{"total": -1, "baseUri": "x", "provenanceHash": "y", "metadata": {}}"#,
        )
        .unwrap_err();
        assert_matches!(err, ProveitError::InvalidManifest { .. });
    }

    #[test]
    fn test_fractional_total_rejected() {
        let err = Manifest::from_json_str(
            r#"{"total": 1.5, "baseUri": "x", "provenanceHash": "y", "metadata": {}}"#,
        )
        .unwrap_err();
        assert_matches!(err, ProveitError::InvalidManifest { reason } if reason.contains("1.5"));
    }

    #[test]
    fn test_mistyped_field_rejected() {
        let err = Manifest::from_json_str(
            r#"{"total": 1, "baseUri": 7, "provenanceHash": "y", "metadata": {}}"#,
        )
        .unwrap_err();
        assert_matches!(err, ProveitError::InvalidManifest { .. });
    }

    #[test]
    fn test_item_metadata_ignores_extra_fields() {
        let metadata: ItemMetadata = serde_json::from_str(
            r#"{"name": "Token 0", "image": "ipfs://cid/0.png", "hash": "ff", "attributes": []}"#,
        )
        .unwrap();
        assert_eq!(metadata, ItemMetadata::new("ipfs://cid/0.png", "ff"));
    }
}
