//! Proveit verification
//!
//! [`ProofEngine`] orchestrates the two-stage provenance proof over any
//! [`proveit_core::ContentFetcher`].

pub mod config;
pub mod engine;

pub use config::{EngineConfig, DEFAULT_IMAGE_TIMEOUT, DEFAULT_METADATA_TIMEOUT};
pub use engine::ProofEngine;
