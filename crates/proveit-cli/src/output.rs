//! Report rendering
//!
//! Text mode streams one line per verified item while the run progresses, then
//! prints the verdict for each proof. JSON mode prints the serialized
//! [`VerificationResult`] once the run completes.

use crate::{CliError, Result};
use proveit_core::{ProofMismatch, ProofObserver, ProofStage, ProveitError, VerificationResult};
use std::io::Write;
use std::sync::Mutex;

/// Report format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress and verdicts
    #[default]
    Text,
    /// Machine-readable result document
    Json,
}

/// Banner printed before a text-mode run
pub fn banner() -> String {
    format!("Proveit [v{}]", env!("CARGO_PKG_VERSION"))
}

/// Streams per-item progress lines to a writer
pub struct TextReporter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TextReporter<W> {
    /// Report to `out`
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ProofObserver for TextReporter<W> {
    fn on_stage(&self, stage: &ProofStage) {
        if let ProofStage::PerItemChecked(token_id, digest) = stage {
            if let Ok(mut out) = self.out.lock() {
                // Progress output is best effort; a closed stdout must not abort the run.
                let _ = writeln!(out, "[+] Hashed {token_id}.png: {digest}");
                let _ = out.flush();
            }
        }
    }
}

/// Verdict block for a successful run
pub fn render_text(result: &VerificationResult) -> String {
    let items = result.per_item.len();
    let matched = result.per_item.iter().filter(|item| item.matched).count();
    format!(
        "Proof 1 (per-item hashes): {} [{matched}/{items} items]\n\
         Aggregate hash: {}\n\
         Proof 2 (provenance hash): {}\n\
         Completed in {:.4}s",
        verdict(matched == items),
        result.aggregate_digest,
        verdict(result.aggregate_matched),
        result.elapsed_seconds,
    )
}

/// Verdict block for a failed run
pub fn render_failure(err: &ProveitError) -> String {
    match err {
        ProveitError::ProofMismatch(ProofMismatch::PerItem {
            token_id,
            image_url,
            expected,
            actual,
        }) => format!(
            "Proof 1 (per-item hashes): {} at token {token_id}\n  \
             image:    {image_url}\n  \
             expected: {expected}\n  \
             actual:   {actual}\n\
             Proof 2 (provenance hash): not reached",
            verdict(false),
        ),
        ProveitError::ProofMismatch(ProofMismatch::Aggregate { expected, actual }) => format!(
            "Proof 1 (per-item hashes): {}\n\
             Aggregate hash: {actual}\n\
             Proof 2 (provenance hash): {}\n  \
             expected: {expected}",
            verdict(true),
            verdict(false),
        ),
        other => format!("Verification aborted: {other}"),
    }
}

/// Pretty-printed JSON result document
pub fn render_json(result: &VerificationResult) -> Result<String> {
    serde_json::to_string_pretty(result)
        .map_err(|e| CliError::Serialization(format!("Failed to format JSON: {e}")))
}

fn verdict(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}
