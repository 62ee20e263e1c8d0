//! Verify handler tests over an import directory on disk

use assert_matches::assert_matches;
use proveit_cli::handlers::{normalize_import_dir, verify_collection};
use proveit_cli::output::{render_failure, render_text, TextReporter};
use proveit_cli::VerifierConfig;
use proveit_core::{Manifest, NoopObserver, ProofMismatch, ProveitError};
use proveit_effects::MANIFEST_FILE;
use proveit_testkit::CollectionFixture;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_manifest(dir: &Path, manifest: &Manifest) {
    let mut document = serde_json::to_value(manifest).unwrap();
    document["metadata"] = serde_json::json!([]);
    std::fs::write(dir.join(MANIFEST_FILE), document.to_string()).unwrap();
}

#[tokio::test]
async fn test_import_dir_with_trailing_separator_verifies() {
    let fixture = CollectionFixture::with_items(3);
    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), &fixture.manifest);

    let raw = format!("{}/", temp_dir.path().display());
    let reporter = Arc::new(TextReporter::new(Vec::new()));
    let result = verify_collection(
        &normalize_import_dir(&raw),
        fixture.fetcher.clone(),
        VerifierConfig::default().engine_config().unwrap(),
        reporter.clone(),
    )
    .await
    .unwrap();

    assert!(result.is_proven());
    assert_eq!(result.aggregate_digest, fixture.manifest.provenance_hash);
    assert!(render_text(&result).contains("[3/3 items]"));

    let reporter = Arc::try_unwrap(reporter).ok().unwrap();
    let printed = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 3);
    for (token_id, line) in lines.iter().enumerate() {
        assert_eq!(
            *line,
            format!("[+] Hashed {token_id}.png: {}", result.per_item[token_id].digest)
        );
    }
}

#[tokio::test]
async fn test_missing_manifest_is_unreadable() {
    let fixture = CollectionFixture::with_items(1);
    let temp_dir = TempDir::new().unwrap();

    let err = verify_collection(
        temp_dir.path(),
        fixture.fetcher.clone(),
        VerifierConfig::default().engine_config().unwrap(),
        Arc::new(NoopObserver),
    )
    .await
    .unwrap_err();

    assert_matches!(err, ProveitError::ManifestUnreadable { .. });
    assert!(fixture.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_manifest_without_metadata_is_rejected_before_fetching() {
    let fixture = CollectionFixture::with_items(1);
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(MANIFEST_FILE),
        serde_json::to_string(&fixture.manifest).unwrap(),
    )
    .unwrap();

    let err = verify_collection(
        temp_dir.path(),
        fixture.fetcher.clone(),
        VerifierConfig::default().engine_config().unwrap(),
        Arc::new(NoopObserver),
    )
    .await
    .unwrap_err();

    assert_matches!(err, ProveitError::InvalidManifest { .. });
    assert!(fixture.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_tampered_item_is_reported_with_context() {
    let fixture = CollectionFixture::with_items(4);
    fixture.tamper_image(3, b"not the committed art".to_vec());
    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), &fixture.manifest);

    let config = VerifierConfig {
        concurrency: 2,
        ..VerifierConfig::default()
    };
    let err = verify_collection(
        temp_dir.path(),
        fixture.fetcher.clone(),
        config.engine_config().unwrap(),
        Arc::new(NoopObserver),
    )
    .await
    .unwrap_err();

    assert_matches!(
        err,
        ProveitError::ProofMismatch(ProofMismatch::PerItem { token_id: 3, .. })
    );
    let report = render_failure(&err);
    assert!(report.contains("FAIL at token 3"));
    assert!(report.contains(&fixture.image_location(3)));
}
