//! URL parsing and normalization for classification and cache keys.

use url::Url;

/// Error type for URL parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("missing scheme")]
    MissingScheme,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Query keys dropped from cache keys. Matched case-insensitively, in
/// addition to every key starting with `utm_`.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "gbraid", "wbraid", "msclkid", "yclid", "mc_cid", "mc_eid", "igshid", "_ga", "_gl",
    "_hsenc", "_hsmi", "mkt_tok", "ref_src",
];

/// Share-link keys that only mean tracking on specific sites, with the
/// registrable domains they apply to (subdomains included).
const SITE_TRACKING_PARAMS: &[(&str, &[&str])] = &[("si", &["youtube.com", "youtu.be", "spotify.com"])];

/// Parse a user-supplied string as an http(s) URL.
///
/// Steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an explicit `http://` or `https://` scheme
/// 3. Require a non-empty host
/// 4. Remove fragment (#...)
///
/// Bare strings such as `example.com` are rejected so that a mistyped local
/// path is never sent to a remote service.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if !trimmed.contains("://") {
        return Err(UrlError::MissingScheme);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

fn is_tracking_param(host: &str, key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    if key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str()) {
        return true;
    }

    SITE_TRACKING_PARAMS
        .iter()
        .filter(|(param, _)| *param == key)
        .flat_map(|(_, domains)| domains.iter())
        .any(|domain| host == *domain || host.strip_suffix(*domain).is_some_and(|sub| sub.ends_with('.')))
}

/// Normalize a parsed URL into its cache-key form.
///
/// - scheme and host lowercased (the `url` crate already does this)
/// - default ports, userinfo and fragment dropped
/// - tracking parameters removed (`si` only on YouTube and Spotify), the rest
///   sorted by key then value
/// - trailing slashes removed from the path, root included
///
/// Path case is preserved.
pub fn normalize(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let mut out = format!("{}://{}", url.scheme(), host);

    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }

    out.push_str(url.path().trim_end_matches('/'));

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(&host, k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if !pairs.is_empty() {
        pairs.sort();
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        out.push('?');
        out.push_str(&query);
    }

    out
}

/// Lowercased extension of the last path segment, if it looks like one.
///
/// Extensions longer than 10 characters are ignored.
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(input: &str) -> String {
        normalize(&canonicalize(input).unwrap())
    }

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_requires_scheme() {
        assert_eq!(canonicalize("example.com"), Err(UrlError::MissingScheme));
        assert_eq!(canonicalize("???"), Err(UrlError::MissingScheme));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com#section").unwrap();
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("ftp://example.com/file.txt");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert_eq!(canonicalize("   "), Err(UrlError::Empty));
    }

    #[test]
    fn test_canonicalize_garbage_after_scheme() {
        assert!(canonicalize("https://").is_err());
        assert!(canonicalize("https://???").is_err());
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(norm("https://example.com/page/"), norm("https://example.com/page"));
        assert_eq!(norm("https://example.com/"), "https://example.com");
        assert_eq!(norm("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_tracking_params() {
        let clean = norm("https://example.com/article?id=7");
        assert_eq!(norm("https://example.com/article?id=7&utm_source=news&utm_medium=email"), clean);
        assert_eq!(norm("https://example.com/article?fbclid=abc&id=7"), clean);
        assert_eq!(norm("https://example.com/article/?id=7&GCLID=x#top"), clean);
        assert_eq!(clean, "https://example.com/article?id=7");
    }

    #[test]
    fn test_normalize_share_param_only_on_share_sites() {
        assert_eq!(norm("https://youtu.be/dQw4w9WgXcQ?si=abc"), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(
            norm("https://www.youtube.com/watch?v=dQw4w9WgXcQ&si=abc"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(norm("https://open.spotify.com/episode/1?si=xyz"), "https://open.spotify.com/episode/1");

        assert_ne!(norm("https://example.com/page?si=1"), norm("https://example.com/page?si=2"));
        assert_eq!(norm("https://example.com/page?si=1"), "https://example.com/page?si=1");
        assert_eq!(norm("https://notyoutube.com/v?si=1"), "https://notyoutube.com/v?si=1");
    }

    #[test]
    fn test_normalize_only_tracking_params() {
        assert_eq!(norm("https://example.com/a?utm_campaign=x"), "https://example.com/a");
    }

    #[test]
    fn test_normalize_sorts_query() {
        assert_eq!(norm("https://example.com/s?b=2&a=1"), norm("https://example.com/s?a=1&b=2"));
        assert_eq!(norm("https://example.com/s?b=2&a=1"), "https://example.com/s?a=1&b=2");
    }

    #[test]
    fn test_normalize_keeps_blank_values() {
        assert_eq!(norm("https://example.com/s?flag=&a=1"), "https://example.com/s?a=1&flag=");
    }

    #[test]
    fn test_normalize_default_port_and_case() {
        assert_eq!(norm("HTTPS://Example.COM:443/Docs"), "https://example.com/Docs");
        assert_eq!(norm("http://example.com:80/"), "http://example.com");
        assert_eq!(norm("http://example.com:8080/x"), "http://example.com:8080/x");
    }

    #[test]
    fn test_normalize_drops_userinfo() {
        assert_eq!(norm("https://user:pw@example.com/x"), "https://example.com/x");
    }

    #[test]
    fn test_normalize_preserves_path_case() {
        assert_ne!(norm("https://youtu.be/AbCdEf"), norm("https://youtu.be/abcdef"));
    }

    #[test]
    fn test_path_extension() {
        let url = canonicalize("https://example.com/files/Report.PDF?dl=1").unwrap();
        assert_eq!(path_extension(&url).as_deref(), Some("pdf"));

        let url = canonicalize("https://example.com/files/").unwrap();
        assert_eq!(path_extension(&url), None);

        let url = canonicalize("https://example.com/.hidden").unwrap();
        assert_eq!(path_extension(&url), None);

        let url = canonicalize("https://example.com/v1.2/page").unwrap();
        assert_eq!(path_extension(&url), None);

        let url = canonicalize("https://example.com/a.verylongextension").unwrap();
        assert_eq!(path_extension(&url), None);
    }
}
