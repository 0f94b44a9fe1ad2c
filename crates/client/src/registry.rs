//! Adapter registry keyed by adapter kind.

use perceiver_core::{AdapterKind, AppConfig, Error, Source};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::{
    Adapter, ArxivAdapter, AudioTranscriptionAdapter, DocumentOcrAdapter, GitHubAdapter, TextFileAdapter,
    WebPageAdapter, YouTubeAdapter,
};
use crate::fetch::{FetchClient, FetchConfig};

/// Registry of extraction adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<AdapterKind, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter sharing one HTTP client.
    pub fn from_config(config: Arc<AppConfig>, fetch: Arc<FetchClient>) -> Self {
        let mut registry = Self::new();
        registry.register(TextFileAdapter::new(fetch.clone()));
        registry.register(DocumentOcrAdapter::new(fetch.clone(), config.clone()));
        registry.register(AudioTranscriptionAdapter::new(fetch.clone(), config.clone()));
        registry.register(WebPageAdapter::new(fetch.clone(), config.clone()));
        registry.register(YouTubeAdapter::new(fetch.clone()));
        registry.register(GitHubAdapter::new(config.clone()));
        registry.register(ArxivAdapter::new(fetch, config));
        registry
    }

    /// Register an adapter under its own kind, replacing any previous one.
    pub fn register<A: Adapter + 'static>(&mut self, adapter: A) {
        self.adapters.insert(adapter.kind(), Arc::new(adapter));
    }

    #[must_use]
    pub fn get(&self, kind: AdapterKind) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Extract a source with the adapter registered for its kind.
    pub async fn extract(&self, source: &Source) -> Result<String, Error> {
        let kind = source.adapter_kind();
        let adapter = self
            .get(kind)
            .ok_or_else(|| Error::extraction(kind.as_str(), "no adapter registered"))?;

        adapter.extract(source).await
    }
}

/// Build the shared HTTP client from application config.
pub fn fetch_client(config: &AppConfig) -> Result<FetchClient, Error> {
    FetchClient::new(FetchConfig::from(config)).map_err(|e| Error::extraction("http", e.to_string()))
}
