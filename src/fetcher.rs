//! Feed fetching over HTTP.
//!
//! Retrieves raw feed payloads with timeouts, a redirect cap, and a
//! response size limit. Format probing and parsing happen downstream in
//! `feed::parser`; the fetcher only moves bytes.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::{FeedbeatError, Result};

/// User agent string for feed requests.
const USER_AGENT: &str = concat!("feedbeat/", env!("CARGO_PKG_VERSION"), " (feed poller)");

/// Source of raw feed payloads.
pub trait FetchFeed {
    /// Fetch the raw payload of the feed at `url`.
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP fetcher with timeouts and resource limits.
pub struct HttpFetcher {
    client: Client,
    max_feed_size_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedbeatError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size_bytes: config.max_feed_size_bytes,
        })
    }
}

impl FetchFeed for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedbeatError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedbeatError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        // Declared size first, actual size after the body is read.
        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size_bytes {
                return Err(FeedbeatError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size_bytes
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedbeatError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size_bytes {
            return Err(FeedbeatError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size_bytes
            )));
        }

        debug!(url = %url, bytes = bytes.len(), "fetched feed payload");
        Ok(bytes.to_vec())
    }
}

/// Validate a feed URL before fetching.
///
/// Only http and https URLs with a host are accepted.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| FeedbeatError::Fetch(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FeedbeatError::Fetch(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(FeedbeatError::Fetch("URL has no host".to_string()));
    }

    Ok(())
}
