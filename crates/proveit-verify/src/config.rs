//! Proof engine configuration

use std::num::NonZeroUsize;
use std::time::Duration;

/// Image fetch timeout used by the reference tool
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_millis(25_000);

/// Metadata fetches get the same bound as image fetches
pub const DEFAULT_METADATA_TIMEOUT: Duration = DEFAULT_IMAGE_TIMEOUT;

/// Tuning knobs for a verification run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Items verified at once; 1 is strictly sequential
    pub concurrency: NonZeroUsize,
    /// Timeout for each metadata fetch
    pub metadata_timeout: Duration,
    /// Timeout for each image fetch
    pub image_timeout: Duration,
}

impl EngineConfig {
    /// Sequential run with default timeouts
    pub fn sequential() -> Self {
        Self {
            concurrency: NonZeroUsize::MIN,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }

    /// Set the number of items verified at once
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the metadata fetch timeout
    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    /// Set the image fetch timeout
    pub fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::sequential()
    }
}
