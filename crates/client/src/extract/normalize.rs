//! Output normalization applied before caching and printing.

use regex::Regex;
use std::sync::LazyLock;
use tiktoken_rs::CoreBPE;

static MARKDOWN_IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());

/// The gpt-4o encoding. `None` if the bundled ranks fail to load.
static TOKENIZER: LazyLock<Option<CoreBPE>> = LazyLock::new(|| match tiktoken_rs::o200k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::debug!(error = %e, "tokenizer unavailable");
        None
    }
});

/// Convert CRLF and lone CR to LF and trim trailing whitespace.
///
/// Leading whitespace is kept so indented code keeps its first line intact.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim_end().to_string()
}

/// Remove markdown image references such as `![alt](img-0.jpeg)`.
pub fn strip_markdown_images(markdown: &str) -> String {
    MARKDOWN_IMAGE_REGEX.replace_all(markdown, "").into_owned()
}

/// Simple content statistics reported after an extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStats {
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
    /// gpt-4o token count, when the tokenizer loaded.
    pub tokens: Option<usize>,
    pub mib: f64,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.lines().count(),
            tokens: count_tokens(text),
            mib: text.len() as f64 / (1024.0 * 1024.0),
        }
    }
}

/// Tokens `text` costs in a gpt-4o prompt.
pub fn count_tokens(text: &str) -> Option<usize> {
    TOKENIZER.as_ref().map(|bpe| bpe.encode_ordinary(text).len())
}
