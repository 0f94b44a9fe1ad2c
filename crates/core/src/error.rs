//! Unified error types for perceiver.
//!
//! Every failure surfaces to the binary as one of these variants. Only
//! [`Error::CacheUnavailable`] is downgraded to a warning by the cache store;
//! the rest terminate the run.

use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Unified error types for perceiver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The argument is neither an existing path nor an http(s) URL.
    #[error("UNRECOGNIZED_SOURCE: {0}")]
    UnrecognizedSource(String),

    /// An adapter or its external service failed.
    #[error("EXTRACTION_FAILED: [{adapter}] {reason}")]
    ExtractionFailure { adapter: String, reason: String },

    /// The cache backend could not be reached. Never fatal.
    #[error("CACHE_UNAVAILABLE: {0}")]
    CacheUnavailable(String),

    /// A credential required by the selected adapter is absent.
    #[error("CONFIGURATION_MISSING: {field} ({hint})")]
    ConfigurationMissing { field: String, hint: String },

    /// Configuration failed to load or validate.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// Local I/O failed.
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Shorthand for an [`Error::ExtractionFailure`].
    pub fn extraction(adapter: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ExtractionFailure { adapter: adapter.into(), reason: reason.into() }
    }

    /// Process exit code for this error.
    ///
    /// 2 for an unrecognized source, 3 for missing or invalid configuration,
    /// 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::UnrecognizedSource(_) => 2,
            Error::ConfigurationMissing { .. } | Error::Config(_) => 3,
            _ => 1,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::extraction("web", "status 502");
        assert!(err.to_string().contains("EXTRACTION_FAILED"));
        assert!(err.to_string().contains("[web] status 502"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::UnrecognizedSource("???".into()).exit_code(), 2);
        let missing = Error::ConfigurationMissing { field: "openai_api_key".into(), hint: "set it".into() };
        assert_eq!(missing.exit_code(), 3);
        let invalid = Error::from(ConfigError::Invalid { field: "timeout_ms".into(), reason: "too small".into() });
        assert_eq!(invalid.exit_code(), 3);
        assert_eq!(Error::extraction("text", "binary").exit_code(), 1);
        assert_ne!(Error::CacheUnavailable("down".into()).exit_code(), 0);
    }
}
