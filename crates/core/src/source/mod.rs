//! Source classification.
//!
//! Turns the raw command-line argument into a tagged [`Source`]:
//!
//! ### Local paths
//! - Existing paths are checked first; directories are rejected.
//! - Extension table lookup (text, document, image, audio).
//! - Special filenames (`Dockerfile`, `Makefile`, `.gitignore`, ...).
//! - Anything else is read as text.
//!
//! ### URLs
//! - Explicit `http`/`https` scheme required.
//! - Ordered patterns: YouTube, GitHub, arXiv.
//! - A recognised file extension on the last path segment makes a direct file.
//! - Everything else is a web page.

pub mod tables;
pub mod url;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ::url::Url;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use tables::{kind_for_content_type, kind_for_extension};
pub use self::url::{UrlError, canonicalize, normalize};

use crate::Error;

static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").unwrap());

static ARXIV_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:abs|pdf|html)/((?:\d{4}\.\d{4,5}|[a-z][a-z\-]*(?:\.[A-Z]{2})?/\d{7})(?:v\d+)?)(?:\.pdf)?/?$")
        .unwrap()
});

/// GitHub first path segments that are site pages, not repository owners.
const GITHUB_RESERVED: &[&str] = &[
    "settings",
    "notifications",
    "pulls",
    "issues",
    "marketplace",
    "explore",
    "topics",
    "orgs",
    "sponsors",
    "login",
];

/// Broad family of a file, decided by extension or content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Document,
    Image,
    Audio,
}

/// Extraction backend selected for a source. Also stored as `source_type`
/// on cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Text,
    DocumentOcr,
    Audio,
    Web,
    YouTube,
    GitHub,
    Arxiv,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Text => "text",
            AdapterKind::DocumentOcr => "document_ocr",
            AdapterKind::Audio => "audio",
            AdapterKind::Web => "web",
            AdapterKind::YouTube => "youtube",
            AdapterKind::GitHub => "github",
            AdapterKind::Arxiv => "arxiv",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FileKind {
    fn adapter_kind(self) -> AdapterKind {
        match self {
            FileKind::Text => AdapterKind::Text,
            FileKind::Document | FileKind::Image => AdapterKind::DocumentOcr,
            FileKind::Audio => AdapterKind::Audio,
        }
    }
}

/// A classified source reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    LocalFile { path: PathBuf, kind: FileKind },
    SpecialFilename { path: PathBuf, name: String },
    YouTube { url: Url, video_id: String },
    GitHub { url: Url, owner: String, repo: String },
    Arxiv { url: Url, paper_id: String },
    DirectFile { url: Url, kind: FileKind, extension: String },
    WebPage { url: Url },
}

impl Source {
    /// Adapter responsible for this source.
    pub fn adapter_kind(&self) -> AdapterKind {
        match self {
            Source::LocalFile { kind, .. } | Source::DirectFile { kind, .. } => kind.adapter_kind(),
            Source::SpecialFilename { .. } => AdapterKind::Text,
            Source::YouTube { .. } => AdapterKind::YouTube,
            Source::GitHub { .. } => AdapterKind::GitHub,
            Source::Arxiv { .. } => AdapterKind::Arxiv,
            Source::WebPage { .. } => AdapterKind::Web,
        }
    }

    /// Local path, for file sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::LocalFile { path, .. } | Source::SpecialFilename { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Remote URL, for URL sources.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Source::YouTube { url, .. }
            | Source::GitHub { url, .. }
            | Source::Arxiv { url, .. }
            | Source::DirectFile { url, .. }
            | Source::WebPage { url } => Some(url),
            Source::LocalFile { .. } | Source::SpecialFilename { .. } => None,
        }
    }

    /// Re-route a web page to a direct file when the server reports a file
    /// content type. Other sources are returned unchanged.
    pub fn with_content_type(self, content_type: &str) -> Source {
        match self {
            Source::WebPage { url } => match kind_for_content_type(content_type) {
                Some((kind, ext)) => Source::DirectFile { url, kind, extension: ext.to_string() },
                None => Source::WebPage { url },
            },
            other => other,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.path(), self.url()) {
            (Some(path), _) => write!(f, "{}", path.display()),
            (_, Some(url)) => write!(f, "{url}"),
            _ => Ok(()),
        }
    }
}

/// Classify a raw argument.
///
/// # Errors
///
/// Returns `Error::UnrecognizedSource` if the argument is neither an existing
/// file nor an http(s) URL.
pub fn classify(input: &str) -> Result<Source, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::UnrecognizedSource("empty source".into()));
    }

    let path = expand_home(trimmed);
    if path.exists() {
        return classify_path(&path);
    }

    let url = canonicalize(trimmed).map_err(|e| {
        Error::UnrecognizedSource(format!("{trimmed}: not an existing file or an http(s) URL ({e})"))
    })?;

    Ok(classify_url(url))
}

fn expand_home(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    if input == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    PathBuf::from(input)
}

fn classify_path(path: &Path) -> Result<Source, Error> {
    if !path.is_file() {
        return Err(Error::UnrecognizedSource(format!("{}: not a regular file", path.display())));
    }

    let path = std::path::absolute(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if let Some(kind) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(kind_for_extension)
    {
        return Ok(Source::LocalFile { path, kind });
    }

    if tables::is_special_filename(&name) {
        return Ok(Source::SpecialFilename { path, name });
    }

    Ok(Source::LocalFile { path, kind: FileKind::Text })
}

/// Classify an already parsed http(s) URL.
pub fn classify_url(url: Url) -> Source {
    if let Some(video_id) = youtube_video_id(&url) {
        return Source::YouTube { url, video_id };
    }

    if let Some((owner, repo)) = github_repo(&url) {
        return Source::GitHub { url, owner, repo };
    }

    if let Some(paper_id) = arxiv_paper_id(&url) {
        return Source::Arxiv { url, paper_id };
    }

    if let Some(ext) = self::url::path_extension(&url)
        && !tables::is_page_extension(&ext)
        && let Some(kind) = kind_for_extension(&ext)
    {
        return Source::DirectFile { url, kind, extension: ext };
    }

    Source::WebPage { url }
}

fn bare_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    for prefix in ["www.", "m.", "music."] {
        if let Some(rest) = host.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    host
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default()
}

fn youtube_video_id(url: &Url) -> Option<String> {
    let host = bare_host(url);
    let parts = segments(url);

    let candidate = match host.as_str() {
        "youtu.be" => parts.first().map(|s| s.to_string()),
        "youtube.com" | "youtube-nocookie.com" => match parts.as_slice() {
            ["watch"] => url.query_pairs().find(|(k, _)| k == "v").map(|(_, v)| v.into_owned()),
            [kind, id, ..] if matches!(*kind, "embed" | "v" | "shorts" | "live") => Some(id.to_string()),
            _ => None,
        },
        _ => None,
    }?;

    VIDEO_ID_REGEX.is_match(&candidate).then_some(candidate)
}

fn github_repo(url: &Url) -> Option<(String, String)> {
    if bare_host(url) != "github.com" {
        return None;
    }

    let parts = segments(url);
    let [owner, repo, ..] = parts.as_slice() else {
        return None;
    };

    if GITHUB_RESERVED.contains(&owner.to_ascii_lowercase().as_str()) {
        return None;
    }

    let repo = repo.strip_suffix(".git").unwrap_or(*repo);
    if repo.is_empty() {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

fn arxiv_paper_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    if !matches!(host.as_str(), "arxiv.org" | "www.arxiv.org" | "export.arxiv.org") {
        return None;
    }

    ARXIV_PATH_REGEX
        .captures(url.path())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
