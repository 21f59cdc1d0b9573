//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Serialized origin (`scheme://host[:port]`) of a URL string
///
/// Uses `url` crate for proper parsing, so default ports are dropped and
/// hosts are lowercased the same way browsers compare origins.
///
/// Returns `None` if the URL is invalid or has an opaque origin
///
/// # Examples
/// ```ignore
/// url_origin("https://github.com")            -> Some("https://github.com")
/// url_origin("https://GitHub.com:443/a/b")    -> Some("https://github.com")
/// url_origin("http://127.0.0.1:7242/ingest")  -> Some("http://127.0.0.1:7242")
/// url_origin("invalid")                       -> None
/// ```
pub fn url_origin(url_str: &str) -> Option<String> {
    let parsed = url::Url::parse(url_str).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Whether `url_str` parses as an absolute `http`/`https` URL.
pub fn is_http_url(url_str: &str) -> bool {
    url::Url::parse(url_str).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Find config file by searching upward from `cwd`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/docs/posts/   ← cwd
/// /home/user/site/htmltune.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path, cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_origin() {
        assert_eq!(
            url_origin("https://github.com"),
            Some("https://github.com".to_string())
        );

        // Path, default port and case are normalized away
        assert_eq!(
            url_origin("https://GitHub.com:443/quarto-dev/quarto-cli"),
            Some("https://github.com".to_string())
        );

        // Non-default port is kept
        assert_eq!(
            url_origin("http://127.0.0.1:7242/ingest/abc"),
            Some("http://127.0.0.1:7242".to_string())
        );

        // Invalid URL (no scheme)
        assert_eq!(url_origin("github.com"), None);
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("http://127.0.0.1:7242/ingest"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("/relative/path"));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("docs/posts");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("htmltune.toml"), "").unwrap();

        assert_eq!(
            find_config_file(Path::new("htmltune.toml"), &nested),
            Some(dir.path().join("htmltune.toml"))
        );
        assert_eq!(find_config_file(Path::new("missing.toml"), &nested), None);
    }
}
