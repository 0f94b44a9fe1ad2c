//! Static lookup tables used by the classifier.

use super::FileKind;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "sh", "bat", "ps1", "js", "mjs", "cjs", "css", "scss", "ts", "jsx", "tsx", "py", "java",
    "c", "cpp", "cc", "h", "hpp", "cs", "go", "rs", "rb", "php", "swift", "kt", "json", "jsonl", "yaml", "yml", "xml",
    "sql", "env", "html", "htm", "csv", "tsv", "log", "ini", "cfg", "conf", "toml", "rst", "tex", "r", "scala",
    "groovy", "pl", "pm", "lua", "vim", "zsh", "bash", "fish", "awk", "sed", "proto", "graphql", "vue", "svelte",
];

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "pptx", "epub", "odt"];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "avif", "tif", "tiff"];

const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "mp4", "mpeg", "mpga", "m4a", "ogg", "oga", "wav", "webm"];

/// Extensions that name a rendered page rather than a downloadable file.
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "php", "asp", "aspx", "jsp", "cfm", "shtml"];

/// Extensionless (or dot-prefixed) file names that are known to be text.
const SPECIAL_FILENAMES: &[&str] = &[
    "dockerfile",
    "containerfile",
    "makefile",
    "gnumakefile",
    "justfile",
    "gemfile",
    "rakefile",
    "procfile",
    "vagrantfile",
    "jenkinsfile",
    "brewfile",
    "readme",
    "license",
    "licence",
    "changelog",
    "authors",
    "contributors",
    "copying",
    "install",
    "news",
    "todo",
    "notice",
    "codeowners",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".dockerignore",
    ".editorconfig",
    ".eslintrc",
    ".prettierrc",
    ".babelrc",
    ".npmrc",
    ".yarnrc",
    ".env",
    ".env.example",
    ".env.local",
    ".env.development",
    ".env.production",
];

/// Content types that identify a downloadable file, with the extension used
/// when the file is forwarded to an extraction service.
const CONTENT_TYPES: &[(&str, FileKind, &str)] = &[
    ("application/pdf", FileKind::Document, "pdf"),
    ("application/vnd.openxmlformats-officedocument.wordprocessingml.document", FileKind::Document, "docx"),
    ("application/vnd.openxmlformats-officedocument.presentationml.presentation", FileKind::Document, "pptx"),
    ("application/epub+zip", FileKind::Document, "epub"),
    ("application/vnd.oasis.opendocument.text", FileKind::Document, "odt"),
    ("image/png", FileKind::Image, "png"),
    ("image/jpeg", FileKind::Image, "jpg"),
    ("image/gif", FileKind::Image, "gif"),
    ("image/webp", FileKind::Image, "webp"),
    ("image/bmp", FileKind::Image, "bmp"),
    ("image/avif", FileKind::Image, "avif"),
    ("image/tiff", FileKind::Image, "tiff"),
    ("audio/mpeg", FileKind::Audio, "mp3"),
    ("audio/mp3", FileKind::Audio, "mp3"),
    ("audio/flac", FileKind::Audio, "flac"),
    ("audio/wav", FileKind::Audio, "wav"),
    ("audio/x-wav", FileKind::Audio, "wav"),
    ("audio/ogg", FileKind::Audio, "ogg"),
    ("audio/webm", FileKind::Audio, "webm"),
    ("audio/mp4", FileKind::Audio, "m4a"),
    ("audio/m4a", FileKind::Audio, "m4a"),
    ("audio/x-m4a", FileKind::Audio, "m4a"),
    ("video/mp4", FileKind::Audio, "mp4"),
    ("video/mpeg", FileKind::Audio, "mpeg"),
    ("video/webm", FileKind::Audio, "webm"),
];

/// Look up a lowercase extension (without the dot).
pub fn kind_for_extension(ext: &str) -> Option<FileKind> {
    let ext = ext.to_ascii_lowercase();
    let ext = ext.as_str();
    if TEXT_EXTENSIONS.contains(&ext) {
        Some(FileKind::Text)
    } else if DOCUMENT_EXTENSIONS.contains(&ext) {
        Some(FileKind::Document)
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Some(FileKind::Image)
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Some(FileKind::Audio)
    } else {
        None
    }
}

pub fn is_page_extension(ext: &str) -> bool {
    PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

pub fn is_special_filename(name: &str) -> bool {
    SPECIAL_FILENAMES.contains(&name.to_ascii_lowercase().as_str())
}

/// Map a `Content-Type` header value to a file kind and extension.
///
/// Parameters such as `; charset=utf-8` are ignored. `text/*` never maps:
/// those responses are pages, not files.
pub fn kind_for_content_type(content_type: &str) -> Option<(FileKind, &'static str)> {
    let base = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(ct, _, _)| *ct == base)
        .map(|(_, kind, ext)| (*kind, *ext))
}
