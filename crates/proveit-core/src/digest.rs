//! Per-image and aggregate digests
//!
//! Two digest domains exist and must not be conflated:
//!
//! - **Image digest**: SHA-256 over the raw image bytes.
//! - **Aggregate digest**: SHA-256 over the UTF-8 text of every image digest,
//!   concatenated in token order with no separator. The hex strings are hashed
//!   as text, never decoded back to bytes.
//!
//! Both render as lowercase hex, 64 characters.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// SHA-256 of the empty string, the aggregate of an empty collection
pub const EMPTY_AGGREGATE: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Lowercase hex SHA-256 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    fn from_output(output: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(output))
    }

    /// Get the hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the hex string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Digest {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Digest {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for Digest {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

/// Digest of raw image content
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDigester;

impl ImageDigester {
    /// SHA-256 over the exact byte sequence
    pub fn digest(bytes: &[u8]) -> Digest {
        Digest::from_output(Sha256::digest(bytes))
    }
}

/// Fold of per-image digests into the provenance commitment
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateDigester;

impl AggregateDigester {
    /// SHA-256 over the concatenated digest strings, in the given order.
    ///
    /// Order-sensitive: the aggregate commits to both content and sequence.
    pub fn aggregate<'a, I>(digests: I) -> Digest
    where
        I: IntoIterator<Item = &'a Digest>,
    {
        let mut hasher = Sha256::new();
        for digest in digests {
            hasher.update(digest.as_str().as_bytes());
        }
        Digest::from_output(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_digest_known_vector() {
        let digest = ImageDigester::digest(b"abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_shape() {
        let digest = ImageDigester::digest(&[0xff, 0x00, 0x10]);
        assert_eq!(digest.as_str().len(), 64);
        assert!(digest
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_empty_aggregate_constant() {
        assert_eq!(AggregateDigester::aggregate(&[] as &[Digest]), EMPTY_AGGREGATE);
        assert_eq!(ImageDigester::digest(b""), EMPTY_AGGREGATE);
    }

    #[test]
    fn test_aggregate_hashes_text_not_bytes() {
        let a = ImageDigester::digest(&[0x01, 0x02]);
        let b = ImageDigester::digest(&[0x03, 0x04]);
        let concatenated = format!("{a}{b}");

        assert_eq!(
            AggregateDigester::aggregate([&a, &b]),
            ImageDigester::digest(concatenated.as_bytes())
        );
    }

    #[test]
    fn test_aggregate_is_order_sensitive() {
        let a = ImageDigester::digest(b"first");
        let b = ImageDigester::digest(b"second");
        assert_ne!(
            AggregateDigester::aggregate([&a, &b]),
            AggregateDigester::aggregate([&b, &a])
        );
    }
}
