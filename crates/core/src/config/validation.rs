//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.
//! Credentials are not checked here; each adapter asks for its own key
//! when it runs.

use crate::config::AppConfig;
use thiserror::Error;

/// Largest accepted download: 1 GiB.
const MAX_DOWNLOAD_CAP: usize = 1024 * 1024 * 1024;

/// Longest accepted timeout: 30 minutes.
const MAX_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_download_bytes` is 0 or exceeds 1GiB
    /// - `timeout_ms`, `api_timeout_ms` or `tool_timeout_ms` is below 100ms or above 30 minutes
    /// - `user_agent`, `cache_namespace`, `whisper_model` or `ocr_model` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_download_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_download_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_download_bytes > MAX_DOWNLOAD_CAP {
            return Err(ConfigError::Invalid {
                field: "max_download_bytes".into(),
                reason: "must not exceed 1GiB".into(),
            });
        }

        for (field, value) in [
            ("timeout_ms", self.timeout_ms),
            ("api_timeout_ms", self.api_timeout_ms),
            ("tool_timeout_ms", self.tool_timeout_ms),
        ] {
            if value < 100 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
            }
            if value > MAX_TIMEOUT_MS {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must not exceed 30 minutes (1800000ms)".into(),
                });
            }
        }

        for (field, value) in [
            ("user_agent", &self.user_agent),
            ("cache_namespace", &self.cache_namespace),
            ("whisper_model", &self.whisper_model),
            ("ocr_model", &self.ocr_model),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        if self.cache_path.is_none() {
            tracing::debug!("cache_path not set; extraction results will not be cached");
        }

        Ok(())
    }
}
