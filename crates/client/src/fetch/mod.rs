//! HTTP fetch pipeline shared by the adapters.
//!
//! ### Downloads
//! - One reqwest client per run (rustls, gzip/brotli/deflate).
//! - Max redirects: 10
//! - Body size capped by `max_download_bytes`, checked against
//!   `Content-Length` and again while streaming.
//!
//! ### Content-type probe
//! - Single `HEAD` request; the media type is returned without parameters.
//!
//! ### Upstream APIs
//! - OCR, transcription and extraction calls use `api_timeout_ms` instead of
//!   the download timeout, since the provider does the slow work.

pub mod error;

use bytes::{Bytes, BytesMut};
use reqwest::{Client, Method, RequestBuilder, header};
use std::time::{Duration, Instant};
use url::Url;

pub use error::FetchError;

use perceiver_core::AppConfig;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,

    /// Maximum response body size in bytes.
    pub max_bytes: usize,

    pub timeout: Duration,

    /// Per-request timeout for provider API calls.
    pub api_timeout: Duration,

    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_download_bytes,
            timeout: config.timeout(),
            api_timeout: config.api_timeout(),
            max_redirects: 10,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub final_url: Url,
    pub bytes: Bytes,
}

/// HTTP client with size and time limits.
///
/// Adapters that talk to JSON APIs borrow the inner client through
/// [`FetchClient::http`] so every request shares one connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Download a URL, returning raw bytes and metadata.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();

        let mut response = self.http.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FetchError::TooLarge { size: len as usize, limit: self.config.max_bytes });
        }

        let final_url = response.url().clone();

        let mut buf = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if buf.len() + chunk.len() > self.config.max_bytes {
                return Err(FetchError::TooLarge { size: buf.len() + chunk.len(), limit: self.config.max_bytes });
            }
            buf.extend_from_slice(&chunk);
        }
        let bytes = buf.freeze();

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { final_url, bytes })
    }

    /// Media type reported by a `HEAD` request, if any.
    pub async fn probe_content_type(&self, url: &Url) -> Result<Option<String>, FetchError> {
        let response = self.http.head(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        Ok(media_type(response.headers()))
    }

    /// The underlying reqwest client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Request to a provider API, bounded by the API timeout rather than the
    /// download timeout.
    pub fn api_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url).timeout(self.config.api_timeout)
    }
}

/// `Content-Type` without parameters, lowercased.
fn media_type(headers: &header::HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(';').next())
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}
