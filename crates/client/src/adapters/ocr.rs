//! Document and image OCR through the Mistral API.
//!
//! ### Flow
//! - Upload the file (`purpose=ocr`) to `/v1/files`.
//! - Request a signed URL for the upload.
//! - Run `/v1/ocr` with a `document_url` or `image_url` chunk.
//! - Join page markdown with newlines and drop image references.

use async_trait::async_trait;
use perceiver_core::{AdapterKind, AppConfig, Error, FileKind, Source};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;

use super::{Adapter, Payload, check_status, load_payload, network_error, unsupported};
use crate::extract::strip_markdown_images;
use crate::fetch::FetchClient;

const BASE_URL: &str = "https://api.mistral.ai";

const SERVICE: &str = "Mistral";

/// Signed URL lifetime in hours.
const SIGNED_URL_EXPIRY_HOURS: u32 = 24;

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OcrResponse {
    #[serde(default)]
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    #[serde(default)]
    markdown: String,
}

/// Mistral OCR for PDFs, office documents and images.
#[derive(Debug, Clone)]
pub struct DocumentOcrAdapter {
    fetch: Arc<FetchClient>,
    config: Arc<AppConfig>,
}

impl DocumentOcrAdapter {
    pub fn new(fetch: Arc<FetchClient>, config: Arc<AppConfig>) -> Self {
        Self { fetch, config }
    }

    /// Run OCR over an already loaded file.
    pub async fn ocr_payload(&self, payload: Payload, is_image: bool) -> Result<String, Error> {
        let api_key = self.config.require_mistral_api_key()?;
        let kind = AdapterKind::DocumentOcr;

        tracing::debug!(file = %payload.file_name, bytes = payload.bytes.len(), "uploading to Mistral");

        let form = Form::new()
            .text("purpose", "ocr")
            .part("file", Part::bytes(payload.bytes.to_vec()).file_name(payload.file_name));

        let response = self
            .fetch
            .api_request(Method::POST, &format!("{BASE_URL}/v1/files"))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(kind, SERVICE, e))?;
        let uploaded: UploadedFile = check_status(response, kind, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| Error::extraction(kind.as_str(), format!("invalid upload response: {e}")))?;

        let response = self
            .fetch
            .api_request(Method::GET, &format!("{BASE_URL}/v1/files/{}/url", uploaded.id))
            .query(&[("expiry", SIGNED_URL_EXPIRY_HOURS)])
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| network_error(kind, SERVICE, e))?;
        let signed: SignedUrl = check_status(response, kind, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| Error::extraction(kind.as_str(), format!("invalid signed URL response: {e}")))?;

        tracing::debug!(model = %self.config.ocr_model, is_image, "processing with Mistral OCR");

        let response = self
            .fetch
            .api_request(Method::POST, &format!("{BASE_URL}/v1/ocr"))
            .bearer_auth(api_key)
            .json(&ocr_request(&self.config.ocr_model, &signed.url, is_image))
            .send()
            .await
            .map_err(|e| network_error(kind, SERVICE, e))?;
        let ocr: OcrResponse = check_status(response, kind, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| Error::extraction(kind.as_str(), format!("invalid OCR response: {e}")))?;

        let text = join_pages(&ocr);
        tracing::debug!(pages = ocr.pages.len(), chars = text.len(), "OCR finished");
        Ok(text)
    }
}

fn ocr_request(model: &str, url: &str, is_image: bool) -> serde_json::Value {
    let document = if is_image {
        serde_json::json!({ "type": "image_url", "image_url": url })
    } else {
        serde_json::json!({ "type": "document_url", "document_url": url })
    };

    serde_json::json!({
        "model": model,
        "document": document,
        "include_image_base64": false,
    })
}

pub(crate) fn join_pages(response: &OcrResponse) -> String {
    let joined = response.pages.iter().map(|p| p.markdown.as_str()).collect::<Vec<_>>().join("\n");
    strip_markdown_images(&joined).trim().to_string()
}

#[async_trait]
impl Adapter for DocumentOcrAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::DocumentOcr
    }

    async fn extract(&self, source: &Source) -> Result<String, Error> {
        let is_image = match source {
            Source::LocalFile { kind, .. } | Source::DirectFile { kind, .. } => match kind {
                FileKind::Image => true,
                FileKind::Document => false,
                _ => return Err(unsupported(self.kind(), source)),
            },
            _ => return Err(unsupported(self.kind(), source)),
        };

        self.config.require_mistral_api_key()?;
        let payload = load_payload(source, &self.fetch, self.kind()).await?;
        self.ocr_payload(payload, is_image).await
    }
}
