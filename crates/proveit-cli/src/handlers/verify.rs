//! Verify command handler

use crate::config::VerifierConfig;
use crate::output::{self, OutputFormat, TextReporter};
use anyhow::Result;
use proveit_core::{ContentFetcher, NoopObserver, ProofObserver, ProveitError, VerificationResult};
use proveit_effects::{load_manifest, GatewayFetcher, RetryingFetcher};
use proveit_verify::{EngineConfig, ProofEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Strip trailing path separators, keeping a lone root separator intact
pub fn normalize_import_dir(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(std::path::is_separator);
    if trimmed.is_empty() {
        return match raw.chars().next() {
            Some(root) => PathBuf::from(root.to_string()),
            None => PathBuf::new(),
        };
    }
    PathBuf::from(trimmed)
}

/// Load the manifest from `import_dir` and run both proofs through `fetcher`
pub async fn verify_collection<F: ContentFetcher>(
    import_dir: &Path,
    fetcher: F,
    engine_config: EngineConfig,
    observer: Arc<dyn ProofObserver>,
) -> std::result::Result<VerificationResult, ProveitError> {
    let manifest = load_manifest(import_dir).await?;
    ProofEngine::new(fetcher, engine_config)
        .with_observer(observer)
        .verify(&manifest)
        .await
}

/// Handle `proveit <IMPORT_DIR>` against the configured gateway
pub async fn handle_verify(
    import_dir: &Path,
    config: &VerifierConfig,
    format: OutputFormat,
) -> Result<VerificationResult> {
    let fetcher = RetryingFetcher::new(GatewayFetcher::new(&config.gateway)?, config.retry_policy());
    let engine_config = config.engine_config()?;
    info!(
        "Verifying {} via {} (timeout retries: {})",
        import_dir.display(),
        fetcher.inner().base_url(),
        fetcher.policy().max_attempts
    );

    let observer: Arc<dyn ProofObserver> = match format {
        OutputFormat::Text => Arc::new(TextReporter::new(std::io::stdout())),
        OutputFormat::Json => Arc::new(NoopObserver),
    };

    match verify_collection(import_dir, fetcher, engine_config, observer).await {
        Ok(result) => {
            match format {
                OutputFormat::Text => println!("{}", output::render_text(&result)),
                OutputFormat::Json => println!("{}", output::render_json(&result)?),
            }
            Ok(result)
        }
        Err(err) => {
            if format == OutputFormat::Text {
                println!("{}", output::render_failure(&err));
            }
            Err(err.into())
        }
    }
}
