//! Fingerprints: the cache keys for classified sources.
//!
//! Local files are keyed by a SHA-256 digest of their bytes, so renames and
//! copies share an entry. URLs are keyed by their normalized string.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::Error;
use crate::source::{Source, normalize};

const READ_CHUNK: usize = 64 * 1024;

/// Compute the fingerprint of a classified source.
pub async fn fingerprint(source: &Source) -> Result<String, Error> {
    match (source.path(), source.url()) {
        (Some(path), _) => file_fingerprint(path).await,
        (_, Some(url)) => Ok(normalize(url)),
        _ => Err(Error::UnrecognizedSource(source.to_string())),
    }
}

/// Stream a file through SHA-256.
pub async fn file_fingerprint(path: impl AsRef<Path>) -> Result<String, Error> {
    let mut file = tokio::fs::File::open(path.as_ref()).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::classify;
    use std::fs;

    #[tokio::test]
    async fn test_identical_bytes_share_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        let b = nested.join("renamed.md");
        fs::write(&a, "same bytes").unwrap();
        fs::write(&b, "same bytes").unwrap();

        let fa = file_fingerprint(&a).await.unwrap();
        let fb = file_fingerprint(&b).await.unwrap();
        assert_eq!(fa, fb);
    }

    #[tokio::test]
    async fn test_different_bytes_differ() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "two").unwrap();

        assert_ne!(file_fingerprint(&a).await.unwrap(), file_fingerprint(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_fingerprint_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let fp = file_fingerprint(&path).await.unwrap();
        assert_eq!(fp, "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[tokio::test]
    async fn test_fingerprint_spans_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("big-a.bin");
        let b = dir.path().join("big-b.bin");
        let mut bytes = vec![7u8; READ_CHUNK * 2 + 17];
        fs::write(&a, &bytes).unwrap();
        *bytes.last_mut().unwrap() = 8;
        fs::write(&b, &bytes).unwrap();

        assert_ne!(file_fingerprint(&a).await.unwrap(), file_fingerprint(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_url_fingerprint_ignores_tracking_and_slash() {
        let a = classify("https://example.com/page/?utm_source=x").unwrap();
        let b = classify("https://EXAMPLE.com/page").unwrap();
        assert_eq!(fingerprint(&a).await.unwrap(), fingerprint(&b).await.unwrap());
        assert_eq!(fingerprint(&a).await.unwrap(), "https://example.com/page");
    }

    #[tokio::test]
    async fn test_source_fingerprint_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "content").unwrap();

        let source = classify(path.to_str().unwrap()).unwrap();
        assert_eq!(fingerprint(&source).await.unwrap(), file_fingerprint(&path).await.unwrap());
    }
}
