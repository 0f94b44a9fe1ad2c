//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PERCEIVER_*)
//! 2. Provider credentials under their conventional names (OPENAI_API_KEY, ...)
//! 3. TOML config file (`--config` or PERCEIVER_CONFIG_FILE)
//! 4. Built-in defaults
//!
//! The resulting [`AppConfig`] is built once at startup and passed down to the
//! adapters and the cache store. Nothing else reads the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

use crate::Error;

/// Environment variables read verbatim for provider credentials.
const PROVIDER_KEYS: &[&str] = &["OPENAI_API_KEY", "MISTRAL_API_KEY", "PARALLEL_API_KEY"];

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenAI key for audio transcription.
    ///
    /// Set via OPENAI_API_KEY or PERCEIVER_OPENAI_API_KEY.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Mistral key for document and image OCR.
    ///
    /// Set via MISTRAL_API_KEY or PERCEIVER_MISTRAL_API_KEY.
    #[serde(default)]
    pub mistral_api_key: Option<String>,

    /// Parallel key for web page extraction.
    ///
    /// Set via PARALLEL_API_KEY or PERCEIVER_PARALLEL_API_KEY.
    #[serde(default)]
    pub parallel_api_key: Option<String>,

    /// Path to the SQLite cache database. Caching is disabled when unset.
    ///
    /// Set via PERCEIVER_CACHE_PATH environment variable.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// Logical partition inside the cache database.
    ///
    /// Set via PERCEIVER_CACHE_NAMESPACE environment variable.
    #[serde(default = "default_cache_namespace")]
    pub cache_namespace: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for provider API calls (OCR, transcription, web extraction)
    /// in milliseconds.
    #[serde(default = "default_api_timeout_ms")]
    pub api_timeout_ms: u64,

    /// Maximum bytes accepted when downloading a remote file.
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: usize,

    /// Timeout for external tools (git, repomix) in milliseconds.
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,

    /// OpenAI speech model.
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,

    /// Translate audio to English instead of transcribing in the source language.
    #[serde(default = "default_true")]
    pub translate_audio: bool,

    /// Mistral OCR model.
    #[serde(default = "default_ocr_model")]
    pub ocr_model: String,

    /// git executable used by the GitHub adapter.
    #[serde(default = "default_git_bin")]
    pub git_bin: String,

    /// repomix executable used by the GitHub adapter.
    #[serde(default = "default_repomix_bin")]
    pub repomix_bin: String,

    /// Issue a HEAD request for extensionless URLs to detect file downloads.
    #[serde(default = "default_true")]
    pub probe_content_type: bool,
}

fn default_cache_namespace() -> String {
    "perceiver".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
        .into()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_api_timeout_ms() -> u64 {
    600_000
}

fn default_max_download_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_tool_timeout_ms() -> u64 {
    300_000
}

fn default_whisper_model() -> String {
    "whisper-1".into()
}

fn default_ocr_model() -> String {
    "mistral-ocr-latest".into()
}

fn default_git_bin() -> String {
    "git".into()
}

fn default_repomix_bin() -> String {
    "repomix".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            mistral_api_key: None,
            parallel_api_key: None,
            cache_path: None,
            cache_namespace: default_cache_namespace(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            api_timeout_ms: default_api_timeout_ms(),
            max_download_bytes: default_max_download_bytes(),
            tool_timeout_ms: default_tool_timeout_ms(),
            whisper_model: default_whisper_model(),
            translate_audio: true,
            ocr_model: default_ocr_model(),
            git_bin: default_git_bin(),
            repomix_bin: default_repomix_bin(),
            probe_content_type: true,
        }
    }
}

impl AppConfig {
    /// HTTP timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Provider API timeout as Duration.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    /// External tool timeout as Duration.
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// `config_file` takes priority over `PERCEIVER_CONFIG_FILE`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let from_env = std::env::var_os("PERCEIVER_CONFIG_FILE").map(PathBuf::from);
        if let Some(path) = config_file.map(Path::to_path_buf).or(from_env) {
            if !path.is_file() {
                return Err(ConfigError::LoadFailed(format!("config file not found: {}", path.display())));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(
                Env::raw()
                    .only(PROVIDER_KEYS)
                    .map(|key| key.as_str().to_lowercase().into()),
            )
            .merge(
                Env::prefixed("PERCEIVER_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into()),
            );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// OpenAI key, checked when the audio adapter runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigurationMissing` if the key is not set.
    pub fn require_openai_api_key(&self) -> Result<&str, Error> {
        require(&self.openai_api_key, "openai_api_key", "OPENAI_API_KEY")
    }

    /// Mistral key, checked when the OCR adapter runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigurationMissing` if the key is not set.
    pub fn require_mistral_api_key(&self) -> Result<&str, Error> {
        require(&self.mistral_api_key, "mistral_api_key", "MISTRAL_API_KEY")
    }

    /// Parallel key, checked when the web page adapter runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigurationMissing` if the key is not set.
    pub fn require_parallel_api_key(&self) -> Result<&str, Error> {
        require(&self.parallel_api_key, "parallel_api_key", "PARALLEL_API_KEY")
    }
}

fn require<'a>(value: &'a Option<String>, field: &str, env: &str) -> Result<&'a str, Error> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::ConfigurationMissing {
            field: field.into(),
            hint: format!("Set the {env} environment variable"),
        })
}
