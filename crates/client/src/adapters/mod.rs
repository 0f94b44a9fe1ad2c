//! Extraction adapters, one per source category.
//!
//! Every adapter turns a classified [`Source`] into plain text. Credentials
//! are checked when `extract` runs, so a run that never needs OCR does not
//! need a Mistral key.

pub mod arxiv;
pub mod audio;
pub mod github;
pub mod ocr;
pub mod text;
pub mod web;
pub mod youtube;

pub use arxiv::ArxivAdapter;
pub use audio::AudioTranscriptionAdapter;
pub use github::GitHubAdapter;
pub use ocr::DocumentOcrAdapter;
pub use text::TextFileAdapter;
pub use web::WebPageAdapter;
pub use youtube::YouTubeAdapter;

use async_trait::async_trait;
use bytes::Bytes;
use perceiver_core::{AdapterKind, Error, Source};

use crate::fetch::FetchClient;

/// Extracts text from one category of source.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// The category this adapter serves.
    fn kind(&self) -> AdapterKind;

    /// Extract the full text of `source`.
    ///
    /// # Errors
    ///
    /// `ExtractionFailure` for backend or format failures and
    /// `ConfigurationMissing` when a credential is absent.
    async fn extract(&self, source: &Source) -> Result<String, Error>;
}

/// File contents ready to upload or decode.
#[derive(Debug, Clone)]
pub struct Payload {
    pub bytes: Bytes,
    /// Name sent to upstream services; keeps the original extension.
    pub file_name: String,
}

/// Read a local file or download a direct file URL.
pub(crate) async fn load_payload(source: &Source, fetch: &FetchClient, adapter: AdapterKind) -> Result<Payload, Error> {
    match source {
        Source::LocalFile { path, .. } | Source::SpecialFilename { path, .. } => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| Error::extraction(adapter.as_str(), format!("{}: {e}", path.display())))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(upload_name)
                .unwrap_or_else(|| "upload".to_string());
            Ok(Payload { bytes: Bytes::from(bytes), file_name })
        }
        Source::DirectFile { url, extension, .. } => {
            let response = fetch
                .fetch(url)
                .await
                .map_err(|e| Error::extraction(adapter.as_str(), format!("{url}: {e}")))?;
            if response.final_url != *url {
                tracing::debug!(%url, final_url = %response.final_url, "download redirected");
            }
            Ok(Payload { bytes: response.bytes, file_name: format!("download.{extension}") })
        }
        other => Err(unsupported(adapter, other)),
    }
}

/// `uploaded_file.<ext>`; the upstream services only care about the extension.
fn upload_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!("uploaded_file.{ext}"),
        _ => "uploaded_file".to_string(),
    }
}

pub(crate) fn unsupported(adapter: AdapterKind, source: &Source) -> Error {
    Error::extraction(adapter.as_str(), format!("unsupported source: {source}"))
}

/// Turn a non-success API response into an `ExtractionFailure` carrying the body.
pub(crate) async fn check_status(
    response: reqwest::Response, adapter: AdapterKind, service: &str,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = match status.as_u16() {
        401 | 403 => format!("{service} rejected the API key ({status})"),
        429 => format!("{service} rate limited the request"),
        _ => format!("{service} returned {status}: {}", truncate(body.trim(), 300)),
    };
    Err(Error::extraction(adapter.as_str(), reason))
}

pub(crate) fn network_error(adapter: AdapterKind, service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::extraction(adapter.as_str(), format!("{service} request timed out"))
    } else {
        Error::extraction(adapter.as_str(), format!("{service} request failed: {err}"))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
