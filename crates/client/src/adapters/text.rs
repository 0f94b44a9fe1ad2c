//! Plain text and source code.

use async_trait::async_trait;
use perceiver_core::{AdapterKind, Error, Source};
use std::sync::Arc;

use super::{Adapter, load_payload, unsupported};
use crate::extract::decode_text;
use crate::fetch::FetchClient;

/// Reads local text files and downloads remote ones.
#[derive(Debug, Clone)]
pub struct TextFileAdapter {
    fetch: Arc<FetchClient>,
}

impl TextFileAdapter {
    pub fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Adapter for TextFileAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Text
    }

    async fn extract(&self, source: &Source) -> Result<String, Error> {
        if source.adapter_kind() != AdapterKind::Text {
            return Err(unsupported(self.kind(), source));
        }

        tracing::debug!(%source, "reading text");
        let payload = load_payload(source, &self.fetch, self.kind()).await?;

        decode_text(&payload.bytes).map_err(|e| Error::extraction(self.kind().as_str(), format!("{source}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use perceiver_core::classify;

    fn adapter() -> TextFileAdapter {
        TextFileAdapter::new(Arc::new(FetchClient::new(FetchConfig::default()).unwrap()))
    }

    #[tokio::test]
    async fn test_reads_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\nbody").unwrap();

        let source = classify(path.to_str().unwrap()).unwrap();
        assert_eq!(adapter().extract(&source).await.unwrap(), "# Notes\n\nbody");
    }

    #[tokio::test]
    async fn test_reads_special_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Makefile");
        std::fs::write(&path, "all:\n\tcargo build\n").unwrap();

        let source = classify(path.to_str().unwrap()).unwrap();
        assert!(adapter().extract(&source).await.unwrap().contains("cargo build"));
    }

    #[tokio::test]
    async fn test_binary_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.weird");
        std::fs::write(&path, b"\x00\x01\x02\x03").unwrap();

        let source = classify(path.to_str().unwrap()).unwrap();
        let err = adapter().extract(&source).await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailure { adapter, .. } if adapter == "text"));
    }

    #[tokio::test]
    async fn test_rejects_other_sources() {
        let source = classify("https://example.com/page").unwrap();
        assert!(adapter().extract(&source).await.is_err());
    }
}
