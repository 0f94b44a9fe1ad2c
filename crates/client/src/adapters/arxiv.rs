//! arXiv papers: download the PDF and hand it to document OCR.

use async_trait::async_trait;
use perceiver_core::{AdapterKind, AppConfig, Error, Source};
use std::sync::Arc;
use url::Url;

use super::{Adapter, DocumentOcrAdapter, Payload, unsupported};
use crate::fetch::FetchClient;

pub(crate) fn pdf_url(paper_id: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://arxiv.org/pdf/{paper_id}"))
}

/// Old-style identifiers carry a slash (`hep-th/9901001`).
fn pdf_file_name(paper_id: &str) -> String {
    format!("{}.pdf", paper_id.replace('/', "_"))
}

#[derive(Debug, Clone)]
pub struct ArxivAdapter {
    fetch: Arc<FetchClient>,
    config: Arc<AppConfig>,
    ocr: DocumentOcrAdapter,
}

impl ArxivAdapter {
    pub fn new(fetch: Arc<FetchClient>, config: Arc<AppConfig>) -> Self {
        let ocr = DocumentOcrAdapter::new(fetch.clone(), config.clone());
        Self { fetch, config, ocr }
    }
}

#[async_trait]
impl Adapter for ArxivAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Arxiv
    }

    async fn extract(&self, source: &Source) -> Result<String, Error> {
        let Source::Arxiv { paper_id, .. } = source else {
            return Err(unsupported(self.kind(), source));
        };

        // Fail on a missing key before spending a download on the PDF.
        self.config.require_mistral_api_key()?;

        let url = pdf_url(paper_id).map_err(|e| Error::extraction(self.kind().as_str(), e.to_string()))?;
        tracing::debug!(%url, "downloading arXiv PDF");

        let response = self
            .fetch
            .fetch(&url)
            .await
            .map_err(|e| Error::extraction(self.kind().as_str(), format!("{url}: {e}")))?;

        let payload = Payload { bytes: response.bytes, file_name: pdf_file_name(paper_id) };
        self.ocr.ocr_payload(payload, false).await
    }
}
