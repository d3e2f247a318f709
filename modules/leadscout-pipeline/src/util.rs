//! Small URL and domain helpers shared by the runner and sink.

/// Extract the bare domain from a URL, lowercased.
pub fn extract_domain(url: &str) -> String {
    url.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Prepend https:// when the scheme is missing.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Cheap sanity check before spending a fetch on a URL.
pub fn is_plausible_url(url: &str) -> bool {
    if url.len() < 4 || !url.contains('.') {
        return false;
    }
    !url.chars().any(|c| c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_domain_strips_scheme_and_path() {
        assert_eq!(extract_domain("https://Example.COM/pricing"), "example.com");
        assert_eq!(extract_domain("http://a.b.c/x/y"), "a.b.c");
        assert_eq!(extract_domain("example.org"), "example.org");
    }

    #[test]
    fn normalize_url_adds_scheme_once() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("  example.com "), "https://example.com");
    }

    #[test]
    fn plausible_url_rejects_garbage() {
        assert!(is_plausible_url("example.com"));
        assert!(!is_plausible_url("ex"));
        assert!(!is_plausible_url("no-dot"));
        assert!(!is_plausible_url("has space.com"));
    }
}
