//! Effect interfaces
//!
//! Traits for the side-effecting capabilities the proof protocol consumes.
//! Handlers are provided by `proveit-effects` (production) and
//! `proveit-testkit` (deterministic, in-memory).

pub mod fetch;
pub mod reliability;

pub use fetch::{ContentFetcher, FetchError};
pub use reliability::{BackoffStrategy, RetryPolicy};
