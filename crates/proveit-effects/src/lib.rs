//! Proveit effect handlers
//!
//! Production implementations of the effect interfaces defined in
//! `proveit-core`:
//!
//! - [`GatewayFetcher`]: content fetching over an HTTP gateway
//! - [`RetryingFetcher`]: timeout retries around any fetcher
//! - [`load_manifest`]: manifest loading from an import directory

pub mod gateway;
pub mod manifest;
pub mod retry;

pub use gateway::{GatewayFetcher, DEFAULT_GATEWAY};
pub use manifest::{load_manifest, manifest_path, MANIFEST_FILE};
pub use retry::RetryingFetcher;
