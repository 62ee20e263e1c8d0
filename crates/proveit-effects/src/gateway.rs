//! HTTP gateway content fetcher
//!
//! Resolves `{gateway}/{address}/{path}` over HTTP(S). Bodies are read as raw
//! bytes regardless of declared content type; metadata bodies are decoded as
//! JSON afterwards so that a timeout during the body read is still reported as
//! a timeout.

use async_trait::async_trait;
use proveit_core::{ContentAddress, ContentFetcher, FetchError, ItemMetadata, ProveitError};
use std::time::Duration;
use tracing::debug;

/// Public gateway used when none is configured
pub const DEFAULT_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Content fetcher backed by a public or private HTTP gateway
#[derive(Debug, Clone)]
pub struct GatewayFetcher {
    /// Gateway base URL without trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl GatewayFetcher {
    /// Create a fetcher for the given gateway base URL
    pub fn new(base_url: &str) -> Result<Self, ProveitError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("proveit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProveitError::config(format!("Failed to create HTTP client: {e}")))?;

        Self::with_client(base_url, client)
    }

    /// Create a fetcher that sends requests through an existing client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ProveitError> {
        let base_url = normalize_gateway(base_url)?;
        Ok(Self { base_url, client })
    }

    /// Gateway base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an address and path to a request URL
    pub fn url_for(&self, address: &ContentAddress, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            address,
            path.trim_start_matches('/')
        )
    }

    async fn get_body(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        debug!("GET {} (timeout {}ms)", url, timeout.as_millis());

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify(url, timeout, e))?;
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ContentFetcher for GatewayFetcher {
    async fn fetch_metadata(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<ItemMetadata, FetchError> {
        let url = self.url_for(address, path);
        let body = self.get_body(&url, timeout).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    async fn fetch_bytes(
        &self,
        address: &ContentAddress,
        path: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(address, path);
        self.get_body(&url, timeout).await
    }

    fn locate(&self, address: &ContentAddress, path: &str) -> String {
        self.url_for(address, path)
    }
}

/// Check the gateway scheme and strip trailing slashes
fn normalize_gateway(base_url: &str) -> Result<String, ProveitError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ProveitError::config("Gateway URL is empty"));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ProveitError::config(format!("Invalid gateway URL '{base_url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ProveitError::config(format!(
            "Gateway URL must use http or https, got '{other}'"
        ))),
    }
}

fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_decode() {
        FetchError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    #[test]
    fn test_default_gateway_url_layout() {
        let fetcher = GatewayFetcher::new(DEFAULT_GATEWAY).unwrap();
        let address = ContentAddress::extract(&format!("ipfs://{CID}/")).unwrap();

        assert_eq!(fetcher.base_url(), "https://ipfs.io/ipfs");
        assert_eq!(
            fetcher.url_for(&address, "4"),
            format!("https://ipfs.io/ipfs/{CID}/4")
        );
        assert_eq!(
            fetcher.locate(&address, "/4.png"),
            format!("https://ipfs.io/ipfs/{CID}/4.png")
        );
    }

    #[test]
    fn test_gateway_without_trailing_slash() {
        let fetcher = GatewayFetcher::new("https://cloudflare-ipfs.com/ipfs").unwrap();
        assert_eq!(fetcher.base_url(), "https://cloudflare-ipfs.com/ipfs");
    }

    #[test]
    fn test_rejects_non_http_gateway() {
        assert!(matches!(
            GatewayFetcher::new("ftp://gateway.example/ipfs"),
            Err(ProveitError::Config { .. })
        ));
        assert!(matches!(
            GatewayFetcher::new("   "),
            Err(ProveitError::Config { .. })
        ));
        assert!(matches!(
            GatewayFetcher::new("not a url"),
            Err(ProveitError::Config { .. })
        ));
    }
}
