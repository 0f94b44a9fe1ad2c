//! Audio transcription through the OpenAI speech API.
//!
//! Translation to English is the default; `translate_audio = false` keeps the
//! spoken language by calling the transcription endpoint instead.

use async_trait::async_trait;
use perceiver_core::{AdapterKind, AppConfig, Error, Source};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;

use super::{Adapter, check_status, load_payload, network_error, unsupported};
use crate::fetch::FetchClient;

const BASE_URL: &str = "https://api.openai.com/v1";

const SERVICE: &str = "OpenAI";

/// Whisper transcription for audio and video files.
#[derive(Debug, Clone)]
pub struct AudioTranscriptionAdapter {
    fetch: Arc<FetchClient>,
    config: Arc<AppConfig>,
}

impl AudioTranscriptionAdapter {
    pub fn new(fetch: Arc<FetchClient>, config: Arc<AppConfig>) -> Self {
        Self { fetch, config }
    }

    fn endpoint(&self) -> String {
        let path = if self.config.translate_audio { "translations" } else { "transcriptions" };
        format!("{BASE_URL}/audio/{path}")
    }
}

#[async_trait]
impl Adapter for AudioTranscriptionAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Audio
    }

    async fn extract(&self, source: &Source) -> Result<String, Error> {
        if source.adapter_kind() != AdapterKind::Audio {
            return Err(unsupported(self.kind(), source));
        }

        let api_key = self.config.require_openai_api_key()?;
        let payload = load_payload(source, &self.fetch, self.kind()).await?;

        tracing::debug!(
            file = %payload.file_name,
            bytes = payload.bytes.len(),
            model = %self.config.whisper_model,
            translate = self.config.translate_audio,
            "transcribing audio"
        );

        let form = Form::new()
            .text("model", self.config.whisper_model.clone())
            .text("response_format", "text")
            .part("file", Part::bytes(payload.bytes.to_vec()).file_name(payload.file_name));

        let response = self
            .fetch
            .api_request(Method::POST, &self.endpoint())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(self.kind(), SERVICE, e))?;

        let text = check_status(response, self.kind(), SERVICE)
            .await?
            .text()
            .await
            .map_err(|e| network_error(self.kind(), SERVICE, e))?;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use perceiver_core::classify;

    fn adapter(config: AppConfig) -> AudioTranscriptionAdapter {
        AudioTranscriptionAdapter::new(Arc::new(FetchClient::new(FetchConfig::default()).unwrap()), Arc::new(config))
    }

    #[test]
    fn test_endpoint_follows_translate_flag() {
        assert_eq!(adapter(AppConfig::default()).endpoint(), "https://api.openai.com/v1/audio/translations");

        let config = AppConfig { translate_audio: false, ..AppConfig::default() };
        assert_eq!(adapter(config).endpoint(), "https://api.openai.com/v1/audio/transcriptions");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode.mp3");
        std::fs::write(&path, b"ID3").unwrap();

        let source = classify(path.to_str().unwrap()).unwrap();
        let err = adapter(AppConfig::default()).extract(&source).await.unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing { field, .. } if field == "openai_api_key"));
    }
}
