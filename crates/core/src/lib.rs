//! Core types and shared functionality for perceiver.
//!
//! This crate provides:
//! - Source classification and URL normalization
//! - Perception cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod source;

pub use cache::{CacheDb, Perception, PerceptionCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use source::{AdapterKind, FileKind, Source, classify};
