//! Proveit Testing Infrastructure
//!
//! Deterministic, in-memory stand-ins for the content network plus fixtures
//! that build self-consistent collections.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! proveit-testkit = { path = "../proveit-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use proveit_testkit::*;
//!
//! let fixture = CollectionFixture::with_items(4);
//! fixture.tamper_image(2, b"not the committed image".to_vec());
//! // verify fixture.manifest against fixture.fetcher ...
//! ```

pub mod fetcher;
pub mod fixtures;
pub mod observer;

pub use fetcher::{FetchRequest, MockContentFetcher, RequestKind};
pub use fixtures::{expected_aggregate, test_cid, CollectionFixture};
pub use observer::RecordingObserver;

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
