//! Collection fixtures
//!
//! Builds a self-consistent collection (manifest, per-item metadata and image
//! bytes) served from a [`MockContentFetcher`]. Tests then tamper with one
//! piece to exercise each failure mode.

use crate::fetcher::MockContentFetcher;
use proveit_core::{
    AggregateDigester, Digest, ImageDigester, ItemMetadata, Manifest, CONTENT_ADDRESS_LEN,
};

/// Deterministic content address of the right length for `label`
pub fn test_cid(label: &str) -> String {
    let mut cid: String = format!("bafybei{}", label.to_ascii_lowercase())
        .chars()
        .filter(|c| c.is_ascii_lowercase() || ('2'..='7').contains(c))
        .take(CONTENT_ADDRESS_LEN)
        .collect();
    while cid.len() < CONTENT_ADDRESS_LEN {
        cid.push('a');
    }
    cid
}

/// Aggregate the manifest should declare for `images`
pub fn expected_aggregate(images: &[Vec<u8>]) -> Digest {
    let digests: Vec<Digest> = images
        .iter()
        .map(|bytes| ImageDigester::digest(bytes))
        .collect();
    AggregateDigester::aggregate(&digests)
}

/// A collection served from an in-memory content network
#[derive(Debug, Clone)]
pub struct CollectionFixture {
    /// Manifest committing to the collection
    pub manifest: Manifest,
    /// Image bytes in token order
    pub images: Vec<Vec<u8>>,
    /// Address of the metadata directory
    pub metadata_cid: String,
    /// Address of the image directory
    pub image_cid: String,
    /// Content network serving the collection
    pub fetcher: MockContentFetcher,
}

impl CollectionFixture {
    /// Build a consistent collection from image bytes
    pub fn new(images: Vec<Vec<u8>>) -> Self {
        let metadata_cid = test_cid("metadata");
        let image_cid = test_cid("images");
        let fetcher = MockContentFetcher::new();

        for (token_id, bytes) in images.iter().enumerate() {
            fetcher.insert_metadata(
                &metadata_cid,
                &token_id.to_string(),
                ItemMetadata::new(
                    format!("ipfs://{image_cid}/{token_id}.png"),
                    ImageDigester::digest(bytes).into_string(),
                ),
            );
            fetcher.insert_bytes(&image_cid, &format!("{token_id}.png"), bytes.clone());
        }

        let manifest = Manifest::new(
            images.len() as u64,
            format!("ipfs://{metadata_cid}/"),
            expected_aggregate(&images).into_string(),
        );

        Self {
            manifest,
            images,
            metadata_cid,
            image_cid,
            fetcher,
        }
    }

    /// Build a collection of `count` distinct small images
    pub fn with_items(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| format!("image-{i}").into_bytes())
                .collect(),
        )
    }

    /// Location string of a token's image, as the mock reports it
    pub fn image_location(&self, token_id: u64) -> String {
        crate::fetcher::location(&self.image_cid, &format!("{token_id}.png"))
    }

    /// Location string of a token's metadata, as the mock reports it
    pub fn metadata_location(&self, token_id: u64) -> String {
        crate::fetcher::location(&self.metadata_cid, &token_id.to_string())
    }

    /// Serve different image bytes while leaving the declared hash alone.
    /// Breaks the per-item proof for `token_id`.
    pub fn tamper_image(&self, token_id: u64, bytes: Vec<u8>) {
        self.fetcher
            .insert_bytes(&self.image_cid, &format!("{token_id}.png"), bytes);
    }

    /// Replace an image and its declared hash consistently.
    /// The per-item proof holds; the aggregate no longer matches.
    pub fn replace_image(&mut self, token_id: u64, bytes: Vec<u8>) {
        let index = usize::try_from(token_id).unwrap();
        self.fetcher.insert_metadata(
            &self.metadata_cid,
            &token_id.to_string(),
            ItemMetadata::new(
                format!("ipfs://{}/{token_id}.png", self.image_cid),
                ImageDigester::digest(&bytes).into_string(),
            ),
        );
        self.tamper_image(token_id, bytes.clone());
        self.images[index] = bytes;
    }

    /// Serve metadata for `token_id` as-is
    pub fn set_metadata(&self, token_id: u64, metadata: ItemMetadata) {
        self.fetcher
            .insert_metadata(&self.metadata_cid, &token_id.to_string(), metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_has_address_length() {
        for label in ["", "metadata", "A-very-long-label-that-keeps-going-and-going-beyond-sixty"] {
            assert_eq!(test_cid(label).len(), CONTENT_ADDRESS_LEN);
        }
        assert_ne!(test_cid("metadata"), test_cid("images"));
    }

    #[test]
    fn test_fixture_manifest_commits_to_images() {
        let fixture = CollectionFixture::with_items(3);
        assert_eq!(fixture.manifest.total, 3);
        assert_eq!(
            fixture.manifest.provenance_hash,
            expected_aggregate(&fixture.images).into_string()
        );
        assert!(fixture.manifest.base_uri.contains(&fixture.metadata_cid));
    }
}
