//! Namespace-scoped perception store that degrades to a no-op.
//!
//! A missing `cache_path` disables caching silently. An unreachable or
//! corrupt database is logged once as a warning and the run continues
//! without a cache. Read and write failures after a successful open are
//! logged and swallowed.

use super::connection::CacheDb;
use super::perceptions::Perception;
use crate::Error;
use crate::config::AppConfig;

#[derive(Clone, Debug)]
pub struct PerceptionCache {
    db: Option<CacheDb>,
    namespace: String,
}

impl PerceptionCache {
    /// Connect using the configured path and namespace.
    pub async fn connect(config: &AppConfig) -> Self {
        let namespace = config.cache_namespace.clone();

        let Some(path) = config.cache_path.as_ref() else {
            tracing::debug!("cache_path not set, caching disabled");
            return Self { db: None, namespace };
        };

        match CacheDb::open(path).await {
            Ok(db) => {
                tracing::debug!(path = %path.display(), namespace = %namespace, "cache connected");
                Self { db: Some(db), namespace }
            }
            Err(e) => {
                let err = Error::CacheUnavailable(format!("{}: {e}", path.display()));
                tracing::warn!(error = %err, "continuing without cache");
                Self { db: None, namespace }
            }
        }
    }

    /// A store that never hits and never writes.
    pub fn disabled(namespace: impl Into<String>) -> Self {
        Self { db: None, namespace: namespace.into() }
    }

    /// Wrap an already opened database.
    pub fn with_db(db: CacheDb, namespace: impl Into<String>) -> Self {
        Self { db: Some(db), namespace: namespace.into() }
    }

    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up a fingerprint. Errors are reported as a miss.
    pub async fn get(&self, fingerprint: &str) -> Option<Perception> {
        let db = self.db.as_ref()?;
        match db.get_perception(&self.namespace, fingerprint).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, fingerprint, "cache read failed");
                None
            }
        }
    }

    /// Store a perception. Returns whether it was written.
    pub async fn put(&self, perception: &Perception) -> bool {
        let Some(db) = self.db.as_ref() else {
            return false;
        };
        match db.upsert_perception(perception).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, fingerprint = %perception.fingerprint, "cache write failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perception(namespace: &str, contents: &str) -> Perception {
        Perception {
            namespace: namespace.to_string(),
            fingerprint: "fp".to_string(),
            source: "/tmp/a.txt".to_string(),
            source_type: "text".to_string(),
            contents: contents.to_string(),
            extracted_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let cache = PerceptionCache::disabled("perceiver");
        assert!(!cache.is_enabled());
        assert!(!cache.put(&perception("perceiver", "x")).await);
        assert!(cache.get("fp").await.is_none());
    }

    #[tokio::test]
    async fn test_roundtrip_through_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = PerceptionCache::with_db(db, "perceiver");

        assert!(cache.put(&perception("perceiver", "hello")).await);
        assert_eq!(cache.get("fp").await.unwrap().contents, "hello");
    }

    #[tokio::test]
    async fn test_connect_without_path_is_disabled() {
        let config = AppConfig::default();
        let cache = PerceptionCache::connect(&config).await;
        assert!(!cache.is_enabled());
        assert_eq!(cache.namespace(), config.cache_namespace);
    }

    #[tokio::test]
    async fn test_connect_unreachable_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let config = AppConfig { cache_path: Some(blocker.join("cache.sqlite")), ..AppConfig::default() };
        let cache = PerceptionCache::connect(&config).await;
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_connect_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            cache_path: Some(dir.path().join("cache.sqlite")),
            cache_namespace: "tests".to_string(),
            ..AppConfig::default()
        };

        let cache = PerceptionCache::connect(&config).await;
        assert!(cache.is_enabled());
        assert!(cache.put(&perception("tests", "stored")).await);
        assert_eq!(cache.get("fp").await.unwrap().contents, "stored");
    }
}
