//! Text post-processing shared by the adapters and the dispatcher.
//!
//! - Decoding of raw file bytes (UTF-8, BOM, Latin-1 fallback, binary sniff).
//! - Line ending normalization and trailing whitespace trimming.
//! - Markdown image removal for OCR output.
//! - Content statistics, including gpt-4o token counts.

pub mod decode;
pub mod normalize;

pub use decode::{DecodeError, decode_text};
pub use normalize::{TextStats, count_tokens, normalize_text, strip_markdown_images};
