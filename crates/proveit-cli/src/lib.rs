//! Proveit CLI library
//!
//! Configuration layering, report rendering and the verify handler behind the
//! `proveit` binary. Split out of `main.rs` so the pieces can be tested without
//! spawning a process.

pub mod config;
pub mod handlers;
pub mod output;

pub use config::{ConfigOverrides, RetryConfig, VerifierConfig};
pub use output::{OutputFormat, TextReporter};

/// CLI error types
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad value in a config file, environment variable or flag
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Config file could not be read
    #[error("File system error: {0}")]
    FileSystem(String),

    /// Report could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result alias for CLI plumbing
pub type Result<T> = std::result::Result<T, CliError>;
