//! Proveit core
//!
//! Data model, digest protocol and effect interfaces for verifying that a
//! published generative-art collection matches its pre-reveal provenance
//! commitment.
//!
//! The protocol has two proofs:
//!
//! 1. **Per item**: the SHA-256 of each image equals the `hash` declared in
//!    that item's metadata.
//! 2. **Aggregate**: the SHA-256 of all per-item digest strings, concatenated
//!    in token order, equals the manifest's `provenanceHash`.
//!
//! This crate performs no I/O. Fetching is abstracted behind
//! [`effects::ContentFetcher`].

pub mod address;
pub mod digest;
pub mod effects;
pub mod errors;
pub mod manifest;
pub mod proof;

pub use address::{ContentAddress, CONTENT_ADDRESS_LEN};
pub use digest::{AggregateDigester, Digest, ImageDigester, EMPTY_AGGREGATE};
pub use effects::{BackoffStrategy, ContentFetcher, FetchError, RetryPolicy};
pub use errors::{ProveitError, Result};
pub use manifest::{ItemMetadata, Manifest};
pub use proof::{
    ItemProof, MismatchKind, NoopObserver, ProofMismatch, ProofObserver, ProofStage,
    VerificationResult,
};
