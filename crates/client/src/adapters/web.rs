//! Web page extraction through the Parallel extract API.
//!
//! The API takes a batch of URLs and answers with per-URL results and
//! per-URL errors. We send one URL and look for it in either list.

use async_trait::async_trait;
use perceiver_core::{AdapterKind, AppConfig, Error, Source};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Adapter, check_status, network_error, unsupported};
use crate::fetch::FetchClient;

const EXTRACT_URL: &str = "https://api.parallel.ai/v1beta/extract";

/// Beta feature flag required by the extract endpoint.
const BETA_HEADER: &str = "search-extract-2025-10-10";

const SERVICE: &str = "Parallel";

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    urls: [&'a str; 1],
    excerpts: bool,
    full_content: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractResponse {
    #[serde(default)]
    results: Vec<ExtractResult>,
    #[serde(default)]
    errors: Vec<ExtractErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ExtractResult {
    url: String,
    #[serde(default)]
    full_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractErrorItem {
    url: String,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Pick the content for `url` out of a batch response.
pub(crate) fn select_content(response: ExtractResponse, url: &str) -> Result<String, String> {
    if let Some(err) = response.errors.iter().find(|e| e.url == url) {
        return Err(format!(
            "failed to extract content: {} - {}",
            err.error_type.as_deref().unwrap_or("error"),
            err.content.as_deref().unwrap_or("no details")
        ));
    }

    let single = response.results.len() == 1;
    response
        .results
        .into_iter()
        .find(|r| single || r.url == url)
        .map(|r| r.full_content.unwrap_or_default().trim().to_string())
        .ok_or_else(|| format!("no result returned for URL: {url}"))
}

/// Full-content web page extraction.
#[derive(Debug, Clone)]
pub struct WebPageAdapter {
    fetch: Arc<FetchClient>,
    config: Arc<AppConfig>,
}

impl WebPageAdapter {
    pub fn new(fetch: Arc<FetchClient>, config: Arc<AppConfig>) -> Self {
        Self { fetch, config }
    }
}

#[async_trait]
impl Adapter for WebPageAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Web
    }

    async fn extract(&self, source: &Source) -> Result<String, Error> {
        let Source::WebPage { url } = source else {
            return Err(unsupported(self.kind(), source));
        };

        let api_key = self.config.require_parallel_api_key()?;
        tracing::debug!(%url, "extracting web page with Parallel");

        let response = self
            .fetch
            .api_request(Method::POST, EXTRACT_URL)
            .header("x-api-key", api_key)
            .header("parallel-beta", BETA_HEADER)
            .json(&ExtractRequest { urls: [url.as_str()], excerpts: false, full_content: true })
            .send()
            .await
            .map_err(|e| network_error(self.kind(), SERVICE, e))?;

        let body: ExtractResponse = check_status(response, self.kind(), SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| Error::extraction(self.kind().as_str(), format!("invalid extract response: {e}")))?;

        select_content(body, url.as_str()).map_err(|reason| Error::extraction(self.kind().as_str(), reason))
    }
}
