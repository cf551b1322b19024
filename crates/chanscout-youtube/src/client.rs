//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with API key management, retry on transient failures, and
//! error-envelope decoding. Endpoint methods live in sibling modules
//! (`search`, `channels`, `uploads`) as additional `impl` blocks.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest `maxResults` any list endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Client for the `YouTube` Data API.
///
/// Use [`YoutubeClient::new`] for production or [`YoutubeClient::with_base_url`]
/// to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for YoutubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl YoutubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, YoutubeError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`YoutubeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanscout/0.1 (channel-discovery)")
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends the endpoint name
        // instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| YoutubeError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds `<base>/<endpoint>?key=...&<params>` with percent-encoded values.
    pub(crate) fn build_url(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| YoutubeError::InvalidBaseUrl(format!("{endpoint}: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Issues a GET against `endpoint` and decodes the body as `T`.
    ///
    /// Transient failures are retried per the client's back-off settings.
    /// Errors never carry the request URL, since it contains the API key.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] when the platform reports a spent quota.
    /// - [`YoutubeError::Api`] for any other non-2xx response.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] if the body does not match `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, YoutubeError> {
        let url = self.build_url(endpoint, params)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_text(&url)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }

    async fn request_text(&self, url: &Url) -> Result<String, YoutubeError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(YoutubeError::from_response(status.as_u16(), &body));
        }
        Ok(body)
    }
}
