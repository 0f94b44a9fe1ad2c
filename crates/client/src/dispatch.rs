//! The perception pipeline.
//!
//! ```text
//! classify -> fingerprint -> cache lookup -> hit: done
//!                                         -> miss: extract -> cache write -> done
//! ```
//!
//! With `bypass_cache` the lookup is skipped and the write always follows a
//! successful extraction.

use perceiver_core::cache::fingerprint;
use perceiver_core::{AppConfig, Error, Perception, PerceptionCache, Source, classify};
use std::sync::Arc;
use std::time::Instant;

use crate::extract::{TextStats, normalize_text};
use crate::fetch::FetchClient;
use crate::registry::{AdapterRegistry, fetch_client};

/// How a perception was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    CacheHit,
    Extracted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CacheHit => "cache",
            Outcome::Extracted => "extracted",
        }
    }
}

/// Classifies, looks up, extracts and stores.
pub struct Perceiver {
    registry: AdapterRegistry,
    cache: PerceptionCache,
    /// Present when web pages should be probed for file content types.
    probe: Option<Arc<FetchClient>>,
}

impl Perceiver {
    pub fn new(registry: AdapterRegistry, cache: PerceptionCache) -> Self {
        Self { registry, cache, probe: None }
    }

    /// Probe web page URLs with `HEAD` before choosing an adapter.
    pub fn with_probe(mut self, fetch: Arc<FetchClient>) -> Self {
        self.probe = Some(fetch);
        self
    }

    /// Wire the built-in adapters, the HTTP client and the cache from config.
    pub async fn from_config(config: AppConfig) -> Result<Self, Error> {
        let config = Arc::new(config);
        let fetch = Arc::new(fetch_client(&config)?);
        let registry = AdapterRegistry::from_config(config.clone(), fetch.clone());
        let cache = PerceptionCache::connect(&config).await;

        let perceiver = Self::new(registry, cache);
        Ok(if config.probe_content_type { perceiver.with_probe(fetch) } else { perceiver })
    }

    pub fn cache(&self) -> &PerceptionCache {
        &self.cache
    }

    /// Produce the text for `input`, from cache when possible.
    ///
    /// # Errors
    ///
    /// `UnrecognizedSource` before anything else runs, then whatever the
    /// selected adapter reports. Cache failures never surface here.
    pub async fn perceive(&self, input: &str, bypass_cache: bool) -> Result<(Perception, Outcome), Error> {
        let start = Instant::now();

        let source = classify(input)?;
        let key = fingerprint(&source).await?;
        tracing::debug!(%source, fingerprint = %key, "classified source");

        if !bypass_cache && let Some(hit) = self.cache.get(&key).await {
            log_stats(&hit.contents, hit.source_type.as_str(), Outcome::CacheHit, start);
            return Ok((hit, Outcome::CacheHit));
        }

        let source = self.probe(source).await;
        let kind = source.adapter_kind();
        tracing::debug!(adapter = %kind, "extracting");

        let text = normalize_text(&self.registry.extract(&source).await?);
        if text.trim().is_empty() {
            return Err(Error::extraction(kind.as_str(), format!("no content extracted from {source}")));
        }

        let perception = Perception {
            namespace: self.cache.namespace().to_string(),
            fingerprint: key,
            source: source.to_string(),
            source_type: kind.as_str().to_string(),
            contents: text,
            extracted_at: chrono::Utc::now().to_rfc3339(),
        };

        if self.cache.put(&perception).await {
            tracing::debug!(fingerprint = %perception.fingerprint, "stored in cache");
        }

        log_stats(&perception.contents, kind.as_str(), Outcome::Extracted, start);
        Ok((perception, Outcome::Extracted))
    }

    /// Re-route a web page to a direct file when `HEAD` reports a file type.
    async fn probe(&self, source: Source) -> Source {
        let Some(fetch) = &self.probe else {
            return source;
        };
        let Source::WebPage { url } = &source else {
            return source;
        };

        match fetch.probe_content_type(url).await {
            Ok(Some(content_type)) => {
                let rerouted = source.clone().with_content_type(&content_type);
                if rerouted != source {
                    tracing::debug!(%content_type, adapter = %rerouted.adapter_kind(), "content type re-routed source");
                }
                rerouted
            }
            Ok(None) => source,
            Err(e) => {
                tracing::debug!(error = %e, "content type probe failed");
                source
            }
        }
    }
}

fn log_stats(text: &str, method: &str, outcome: Outcome, start: Instant) {
    let stats = TextStats::of(text);
    tracing::info!(
        chars = stats.chars,
        words = stats.words,
        lines = stats.lines,
        tokens = stats.tokens,
        mib = %format!("{:.3}", stats.mib),
        elapsed_ms = start.elapsed().as_millis() as u64,
        method,
        outcome = outcome.as_str(),
        "perception ready"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Adapter;
    use async_trait::async_trait;
    use perceiver_core::{AdapterKind, CacheDb};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Text adapter that counts calls and returns a fixed body.
    struct Counting {
        calls: Arc<AtomicUsize>,
        body: String,
    }

    #[async_trait]
    impl Adapter for Counting {
        fn kind(&self) -> AdapterKind {
            AdapterKind::Text
        }

        async fn extract(&self, _source: &Source) -> Result<String, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    async fn perceiver(body: &str) -> (Perceiver, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = AdapterRegistry::new();
        registry.register(Counting { calls: calls.clone(), body: body.to_string() });

        let db = CacheDb::open_in_memory().await.unwrap();
        (Perceiver::new(registry, PerceptionCache::with_db(db, "tests")), calls)
    }

    fn text_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_cache_hit_skips_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_file(&dir, "a.txt", "ignored");
        let (perceiver, calls) = perceiver("extracted body").await;

        let (first, outcome) = perceiver.perceive(&input, false).await.unwrap();
        assert_eq!(outcome, Outcome::Extracted);
        assert_eq!(first.contents, "extracted body");
        assert_eq!(first.source_type, "text");
        assert_eq!(first.namespace, "tests");

        let (second, outcome) = perceiver.perceive(&input, false).await.unwrap();
        assert_eq!(outcome, Outcome::CacheHit);
        assert_eq!(second.contents, "extracted body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_identical_copy_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let a = text_file(&dir, "a.txt", "same bytes");
        let b = text_file(&dir, "copy.md", "same bytes");
        let (perceiver, calls) = perceiver("body").await;

        perceiver.perceive(&a, false).await.unwrap();
        let (_, outcome) = perceiver.perceive(&b, false).await.unwrap();
        assert_eq!(outcome, Outcome::CacheHit);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bypass_always_extracts_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_file(&dir, "a.txt", "x");
        let (perceiver, calls) = perceiver("fresh").await;

        let key = perceiver_core::cache::file_fingerprint(&input).await.unwrap();
        perceiver
            .cache()
            .put(&Perception {
                namespace: "tests".into(),
                fingerprint: key.clone(),
                source: input.clone(),
                source_type: "text".into(),
                contents: "stale".into(),
                extracted_at: "2020-01-01T00:00:00+00:00".into(),
            })
            .await;

        let (result, outcome) = perceiver.perceive(&input, true).await.unwrap();
        assert_eq!(outcome, Outcome::Extracted);
        assert_eq!(result.contents, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        perceiver.perceive(&input, true).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(perceiver.cache().get(&key).await.unwrap().contents, "fresh");
    }

    #[tokio::test]
    async fn test_unrecognized_source_fails_first() {
        let (perceiver, calls) = perceiver("body").await;
        let err = perceiver.perceive("???", false).await.unwrap_err();
        assert!(matches!(err, Error::UnrecognizedSource(_)));
        assert_ne!(err.exit_code(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_output_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_file(&dir, "a.txt", "x");
        let (perceiver, _) = perceiver("  line one\r\nline two\r\n\n").await;

        let (result, _) = perceiver.perceive(&input, false).await.unwrap();
        assert_eq!(result.contents, "  line one\nline two");
    }

    #[tokio::test]
    async fn test_text_file_keeps_leading_indentation() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_file(&dir, "snippet.py", "    return x\n");

        let fetch = Arc::new(fetch_client(&AppConfig::default()).unwrap());
        let mut registry = AdapterRegistry::new();
        registry.register(crate::adapters::TextFileAdapter::new(fetch));
        let perceiver = Perceiver::new(registry, PerceptionCache::disabled("tests"));

        let (result, _) = perceiver.perceive(&input, false).await.unwrap();
        assert_eq!(result.contents, "    return x");
    }

    #[tokio::test]
    async fn test_empty_result_fails_and_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_file(&dir, "a.txt", "x");
        let (perceiver, _) = perceiver(" \n\t ").await;

        let err = perceiver.perceive(&input, false).await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailure { adapter, .. } if adapter == "text"));

        let key = perceiver_core::cache::file_fingerprint(&input).await.unwrap();
        assert!(perceiver.cache().get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_still_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let input = text_file(&dir, "a.txt", "x");
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = AdapterRegistry::new();
        registry.register(Counting { calls: calls.clone(), body: "body".into() });
        let perceiver = Perceiver::new(registry, PerceptionCache::disabled("tests"));

        perceiver.perceive(&input, false).await.unwrap();
        let (_, outcome) = perceiver.perceive(&input, false).await.unwrap();
        assert_eq!(outcome, Outcome::Extracted);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_probe_leaves_non_web_sources() {
        let (perceiver, _) = perceiver("body").await;
        let fetch = Arc::new(fetch_client(&AppConfig::default()).unwrap());
        let perceiver = perceiver.with_probe(fetch);

        let source = classify("https://github.com/owner/repo").unwrap();
        assert_eq!(perceiver.probe(source.clone()).await, source);
    }
}
