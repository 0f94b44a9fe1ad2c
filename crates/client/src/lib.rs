//! Client code for perceiver.
//!
//! This crate provides the HTTP fetch pipeline, the extraction adapters
//! and the dispatcher that ties classification, caching and extraction
//! together for the CLI.

pub mod adapters;
pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod registry;

pub use adapters::{Adapter, Payload};
pub use dispatch::{Outcome, Perceiver};
pub use extract::{TextStats, decode_text, normalize_text, strip_markdown_images};
pub use fetch::{FetchClient, FetchConfig, FetchError, FetchResponse};
pub use registry::AdapterRegistry;
