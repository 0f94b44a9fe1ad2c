//! SQLite-backed cache of extracted text.
//!
//! Entries are keyed by `(namespace, fingerprint)` where the fingerprint is
//! a content hash for local files and the normalized URL for remote sources.
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Degrades to a no-op store when the database is unavailable

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod perceptions;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::{file_fingerprint, fingerprint};
pub use perceptions::Perception;
pub use store::PerceptionCache;
