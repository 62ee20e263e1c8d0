//! Proof outcomes and run progress
//!
//! A run moves through a linear sequence of stages:
//!
//! ```text
//! Idle -> Fetching(i) -> Digesting(i) -> PerItemChecked(i) -> [i+1 | Aggregating]
//!      -> AggregateChecked -> Done
//! ```
//!
//! `Aborted` is reachable from any per-item stage and from `Aggregating`.

use crate::digest::Digest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which proof stage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// An image digest differs from its metadata declaration
    PerItem,
    /// The aggregate differs from the manifest's provenance hash
    Aggregate,
}

/// Content verifiably does not match its commitment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ProofMismatch {
    /// Proof 1: image digest vs. declared metadata hash
    #[error("Image hash does not match metadata hash for token {token_id} ({image_url}): {actual} != {expected}")]
    PerItem {
        /// Offending token index
        token_id: u64,
        /// Location the image was fetched from
        image_url: String,
        /// Digest declared in the item metadata
        expected: String,
        /// Digest computed over the fetched bytes
        actual: Digest,
    },
    /// Proof 2: aggregate digest vs. manifest provenance hash
    #[error("Provenance hash did not match: {expected} != {actual}")]
    Aggregate {
        /// Digest declared in the manifest
        expected: String,
        /// Aggregate recomputed from the fetched images
        actual: Digest,
    },
}

impl ProofMismatch {
    /// Stage that failed
    pub fn kind(&self) -> MismatchKind {
        match self {
            Self::PerItem { .. } => MismatchKind::PerItem,
            Self::Aggregate { .. } => MismatchKind::Aggregate,
        }
    }

    /// Offending token, for per-item mismatches
    pub fn token_id(&self) -> Option<u64> {
        match self {
            Self::PerItem { token_id, .. } => Some(*token_id),
            Self::Aggregate { .. } => None,
        }
    }
}

/// Verified digest of a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProof {
    /// Token index
    pub token_id: u64,
    /// Digest of the image bytes
    pub digest: Digest,
    /// Whether the digest matched the metadata declaration
    pub matched: bool,
}

/// Terminal value of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Per-item digests in token order
    pub per_item: Vec<ItemProof>,
    /// Aggregate over `per_item` digests
    pub aggregate_digest: Digest,
    /// Whether the aggregate matched the manifest
    pub aggregate_matched: bool,
    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,
}

impl VerificationResult {
    /// Both proof stages passed for every item
    pub fn is_proven(&self) -> bool {
        self.aggregate_matched && self.per_item.iter().all(|item| item.matched)
    }

    /// Digests in token order
    pub fn digests(&self) -> impl Iterator<Item = &Digest> {
        self.per_item.iter().map(|item| &item.digest)
    }
}

/// Progress of a verification run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofStage {
    /// Run has not started
    Idle,
    /// Fetching metadata and image for a token
    Fetching(u64),
    /// Hashing the fetched image
    Digesting(u64),
    /// Token digest matched its metadata
    PerItemChecked(u64, Digest),
    /// Folding per-item digests
    Aggregating,
    /// Aggregate matched the manifest
    AggregateChecked(Digest),
    /// Run finished successfully
    Done,
    /// Run stopped on the given cause
    Aborted(String),
}

impl fmt::Display for ProofStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching(id) => write!(f, "fetching({id})"),
            Self::Digesting(id) => write!(f, "digesting({id})"),
            Self::PerItemChecked(id, _) => write!(f, "per-item-checked({id})"),
            Self::Aggregating => write!(f, "aggregating"),
            Self::AggregateChecked(_) => write!(f, "aggregate-checked"),
            Self::Done => write!(f, "done"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Receives stage transitions as a run progresses
pub trait ProofObserver: Send + Sync {
    /// Called on every transition
    fn on_stage(&self, stage: &ProofStage);
}

/// Observer that discards every transition
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProofObserver for NoopObserver {
    fn on_stage(&self, _stage: &ProofStage) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::ImageDigester;

    #[test]
    fn test_mismatch_kind_and_token() {
        let per_item = ProofMismatch::PerItem {
            token_id: 7,
            image_url: "https://gw/cid/7.png".to_string(),
            expected: "00".to_string(),
            actual: ImageDigester::digest(b"x"),
        };
        assert_eq!(per_item.kind(), MismatchKind::PerItem);
        assert_eq!(per_item.token_id(), Some(7));
        assert!(per_item.to_string().contains("https://gw/cid/7.png"));

        let aggregate = ProofMismatch::Aggregate {
            expected: "00".to_string(),
            actual: ImageDigester::digest(b"x"),
        };
        assert_eq!(aggregate.kind(), MismatchKind::Aggregate);
        assert_eq!(aggregate.token_id(), None);
    }

    #[test]
    fn test_result_serializes_digests_as_strings() {
        let digest = ImageDigester::digest(b"abc");
        let result = VerificationResult {
            per_item: vec![ItemProof {
                token_id: 0,
                digest: digest.clone(),
                matched: true,
            }],
            aggregate_digest: digest.clone(),
            aggregate_matched: true,
            elapsed_seconds: 0.5,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["per_item"][0]["digest"], digest.as_str());
        assert_eq!(json["aggregate_matched"], true);
        assert!(result.is_proven());
        assert_eq!(result.digests().collect::<Vec<_>>(), vec![&digest]);
    }

    #[test]
    fn test_stage_display() {
        let digest = ImageDigester::digest(b"x");
        assert_eq!(ProofStage::Fetching(3).to_string(), "fetching(3)");
        assert_eq!(
            ProofStage::PerItemChecked(3, digest).to_string(),
            "per-item-checked(3)"
        );
        assert_eq!(
            ProofStage::Aborted("timed out".to_string()).to_string(),
            "aborted: timed out"
        );
    }
}
