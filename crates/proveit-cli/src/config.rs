//! Verifier configuration
//!
//! Settings are layered, lowest precedence first: built-in defaults, an
//! optional TOML file, `PROVEIT_*` environment variables, command-line flags.
//!
//! ```toml
//! gateway = "https://ipfs.io/ipfs/"
//! concurrency = 8
//! metadata_timeout_ms = 25000
//! image_timeout_ms = 25000
//!
//! [retry]
//! max_attempts = 2
//! initial_delay_ms = 500
//! max_delay_ms = 30000
//! strategy = "exponential"
//! ```

use crate::{CliError, Result};
use proveit_core::{BackoffStrategy, RetryPolicy};
use proveit_effects::DEFAULT_GATEWAY;
use proveit_verify::{EngineConfig, DEFAULT_IMAGE_TIMEOUT, DEFAULT_METADATA_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Prefix shared by every recognised environment variable
pub const ENV_PREFIX: &str = "PROVEIT_";

/// Full verifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// HTTP gateway used to resolve content addresses
    pub gateway: String,
    /// Items verified at once
    pub concurrency: usize,
    /// Metadata fetch timeout in milliseconds
    pub metadata_timeout_ms: u64,
    /// Image fetch timeout in milliseconds
    pub image_timeout_ms: u64,
    /// Timeout retry settings
    pub retry: RetryConfig,
}

/// Retry settings; only timeouts are retried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay_ms: u64,
    /// Upper bound on any delay
    pub max_delay_ms: u64,
    /// Backoff between retries
    pub strategy: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            strategy: BackoffStrategy::Exponential,
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_GATEWAY.to_string(),
            concurrency: 1,
            metadata_timeout_ms: duration_ms(DEFAULT_METADATA_TIMEOUT),
            image_timeout_ms: duration_ms(DEFAULT_IMAGE_TIMEOUT),
            retry: RetryConfig::default(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layer in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--gateway`
    pub gateway: Option<String>,
    /// `--concurrency`
    pub concurrency: Option<usize>,
    /// `--retries`
    pub retries: Option<u32>,
    /// `--metadata-timeout-ms`
    pub metadata_timeout_ms: Option<u64>,
    /// `--image-timeout-ms`
    pub image_timeout_ms: Option<u64>,
}

impl VerifierConfig {
    /// Build the effective configuration from every layer and validate it
    pub fn resolve<I>(
        config_file: Option<&Path>,
        env: I,
        overrides: &ConfigOverrides,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = match config_file {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file; absent keys keep their defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::FileSystem(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            CliError::Configuration(reason) => CliError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                reason
            )),
            other => other,
        })
    }

    /// Parse TOML config text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| CliError::Configuration(e.to_string()))
    }

    /// Apply `PROVEIT_*` variables; anything without the prefix is ignored
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "GATEWAY" => self.gateway = value,
                "CONCURRENCY" => self.concurrency = parse_env(&key, &value)?,
                "METADATA_TIMEOUT_MS" => self.metadata_timeout_ms = parse_env(&key, &value)?,
                "IMAGE_TIMEOUT_MS" => self.image_timeout_ms = parse_env(&key, &value)?,
                "RETRIES" => self.retry.max_attempts = parse_env(&key, &value)?,
                "RETRY_STRATEGY" => {
                    self.retry.strategy = match value.as_str() {
                        "fixed" => BackoffStrategy::Fixed,
                        "linear" => BackoffStrategy::Linear,
                        "exponential" => BackoffStrategy::Exponential,
                        other => {
                            return Err(CliError::Configuration(format!(
                                "{key}: unknown retry strategy '{other}'"
                            )))
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply command-line values on top of everything else
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(gateway) = &overrides.gateway {
            self.gateway = gateway.clone();
        }
        if let Some(concurrency) = overrides.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(retries) = overrides.retries {
            self.retry.max_attempts = retries;
        }
        if let Some(timeout) = overrides.metadata_timeout_ms {
            self.metadata_timeout_ms = timeout;
        }
        if let Some(timeout) = overrides.image_timeout_ms {
            self.image_timeout_ms = timeout;
        }
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CliError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.metadata_timeout_ms == 0 || self.image_timeout_ms == 0 {
            return Err(CliError::Configuration(
                "fetch timeouts must be greater than zero".to_string(),
            ));
        }

        let gateway = self.gateway.trim();
        if gateway.is_empty() {
            return Err(CliError::Configuration("gateway is empty".to_string()));
        }
        if !(gateway.starts_with("http://") || gateway.starts_with("https://")) {
            return Err(CliError::Configuration(format!(
                "gateway must be an http(s) URL, got '{gateway}'"
            )));
        }
        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(CliError::Configuration(
                "retry.max_delay_ms is below retry.initial_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let concurrency = NonZeroUsize::new(self.concurrency).ok_or_else(|| {
            CliError::Configuration("concurrency must be at least 1".to_string())
        })?;
        Ok(EngineConfig::sequential()
            .with_concurrency(concurrency)
            .with_metadata_timeout(Duration::from_millis(self.metadata_timeout_ms))
            .with_image_timeout(Duration::from_millis(self.image_timeout_ms)))
    }

    /// Retry policy for timed-out fetches
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::none()
            .with_max_attempts(self.retry.max_attempts)
            .with_initial_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .with_strategy(self.retry.strategy)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Configuration(format!("{key}='{value}': {e}")))
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
