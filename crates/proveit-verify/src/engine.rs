//! Proof engine
//!
//! Runs per-item verification for every token in the manifest, then folds the
//! per-item digests into the aggregate and compares it with the provenance
//! hash.
//!
//! Items are verified through a bounded pipeline. With a concurrency of one it
//! is strictly sequential: token `i + 1` is not fetched until token `i` has been
//! checked. Wider pipelines keep at most `concurrency` items in flight but still
//! yield results in token order, so the digests accumulate in index order and
//! the reported failure is the lowest-indexed one among those in flight. The
//! first failure drops the pipeline, abandoning any in-flight fetches.
//!
//! Nothing is allocated up front from the manifest's `total`; the accumulator
//! only grows as items verify.

use crate::config::EngineConfig;
use futures::stream::{self, StreamExt, TryStreamExt};
use proveit_core::{
    AggregateDigester, ContentAddress, ContentFetcher, ImageDigester, ItemProof, Manifest,
    NoopObserver, ProofMismatch, ProofObserver, ProofStage, Result, VerificationResult,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Verifies a manifest against the content network
pub struct ProofEngine<F> {
    fetcher: F,
    config: EngineConfig,
    observer: Arc<dyn ProofObserver>,
}

impl<F: ContentFetcher> ProofEngine<F> {
    /// Create an engine over `fetcher`
    pub fn new(fetcher: F, config: EngineConfig) -> Self {
        Self {
            fetcher,
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report stage transitions to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProofObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run both proofs for `manifest`.
    ///
    /// Succeeds only when every item matched its metadata and the aggregate
    /// matched the manifest; otherwise fails with the single causing error.
    pub async fn verify(&self, manifest: &Manifest) -> Result<VerificationResult> {
        let started = Instant::now();
        self.emit(ProofStage::Idle);

        match self.run(manifest, started).await {
            Ok(result) => {
                self.emit(ProofStage::Done);
                Ok(result)
            }
            Err(err) => {
                self.emit(ProofStage::Aborted(err.to_string()));
                Err(err)
            }
        }
    }

    async fn run(&self, manifest: &Manifest, started: Instant) -> Result<VerificationResult> {
        info!(
            "Proving {} items (concurrency {})",
            manifest.total, self.config.concurrency
        );

        let per_item = self.verify_items(manifest).await?;

        self.emit(ProofStage::Aggregating);
        let aggregate_digest = AggregateDigester::aggregate(per_item.iter().map(|item| &item.digest));
        debug!("Aggregated {} digests into {}", per_item.len(), aggregate_digest);

        if aggregate_digest != manifest.provenance_hash {
            return Err(ProofMismatch::Aggregate {
                expected: manifest.provenance_hash.clone(),
                actual: aggregate_digest,
            }
            .into());
        }
        self.emit(ProofStage::AggregateChecked(aggregate_digest.clone()));
        info!("Provenance hash matches: {}", aggregate_digest);

        Ok(VerificationResult {
            per_item,
            aggregate_digest,
            aggregate_matched: true,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    async fn verify_items(&self, manifest: &Manifest) -> Result<Vec<ItemProof>> {
        let base_uri = manifest.base_uri.as_str();
        stream::iter(0..manifest.total)
            .map(move |token_id| self.verify_item(base_uri, token_id))
            .buffered(self.config.concurrency.get())
            .try_collect()
            .await
    }

    async fn verify_item(&self, base_uri: &str, token_id: u64) -> Result<ItemProof> {
        self.emit(ProofStage::Fetching(token_id));

        let metadata_address = ContentAddress::extract(base_uri)?;
        let metadata = self
            .fetcher
            .fetch_metadata(
                &metadata_address,
                &token_id.to_string(),
                self.config.metadata_timeout,
            )
            .await?;

        let image_address = ContentAddress::extract(&metadata.image)?;
        let image_path = format!("{token_id}.png");
        let bytes = self
            .fetcher
            .fetch_bytes(&image_address, &image_path, self.config.image_timeout)
            .await?;

        self.emit(ProofStage::Digesting(token_id));
        let digest = ImageDigester::digest(&bytes);
        drop(bytes);

        if digest != metadata.hash {
            return Err(ProofMismatch::PerItem {
                token_id,
                image_url: self.fetcher.locate(&image_address, &image_path),
                expected: metadata.hash,
                actual: digest,
            }
            .into());
        }

        debug!("Hashed {}.png: {}", token_id, digest);
        self.emit(ProofStage::PerItemChecked(token_id, digest.clone()));

        Ok(ItemProof {
            token_id,
            digest,
            matched: true,
        })
    }

    fn emit(&self, stage: ProofStage) {
        trace!("Proof stage: {}", stage);
        self.observer.on_stage(&stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proveit_testkit::CollectionFixture;

    #[tokio::test]
    async fn test_single_item_collection() {
        let fixture = CollectionFixture::new(vec![b"only".to_vec()]);
        let engine = ProofEngine::new(fixture.fetcher.clone(), EngineConfig::default());

        let result = engine.verify(&fixture.manifest).await.unwrap();
        assert_eq!(result.per_item.len(), 1);
        assert_eq!(result.per_item[0].digest, ImageDigester::digest(b"only"));
        assert!(result.aggregate_matched);
    }

    #[tokio::test]
    async fn test_metadata_fetch_uses_bare_index_path() {
        let fixture = CollectionFixture::with_items(1);
        let engine = ProofEngine::new(fixture.fetcher.clone(), EngineConfig::default());
        assert_eq!(engine.config(), &EngineConfig::sequential());
        engine.verify(&fixture.manifest).await.unwrap();

        assert_eq!(
            fixture.fetcher.requested_locations(),
            vec![fixture.metadata_location(0), fixture.image_location(0)]
        );
    }
}
