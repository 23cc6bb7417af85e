use crate::url::SkipPatterns;
use url::Url;

/// Schemes that can never point at a downloadable image
const IGNORED_PREFIXES: &[&str] = &["data:", "javascript:", "about:", "blob:"];

/// Normalizes a raw `<img>` source into an absolute image URL
///
/// # Normalization Steps
///
/// 1. Trim whitespace; empty sources and inline/script schemes are dropped
/// 2. Protocol-relative (`//host/path`): prefixed with `https:`
/// 3. Root-relative (`/path`): prefixed with the base URL
/// 4. Anything else that is not already absolute is joined onto the base URL
/// 5. Only HTTP and HTTPS results are kept
/// 6. URLs whose lowercase form contains a skip pattern are dropped
///
/// The skip step is a heuristic: decorative assets without a telling name get
/// through, and real images that happen to contain a pattern are lost.
///
/// # Arguments
///
/// * `raw` - The attribute value as found in the markup
/// * `base` - The site root the feed lives under
/// * `skip` - Substring filter for low-value assets
///
/// # Returns
///
/// * `Some(Url)` - An absolute, wanted image URL
/// * `None` - The source was empty, unresolvable, or filtered out
///
/// # Examples
///
/// ```
/// use feed_gleaner::url::{normalize_image_src, SkipPatterns};
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com").unwrap();
/// let skip = SkipPatterns::default();
///
/// let url = normalize_image_src("//cdn.example.com/a/poster.jpg", &base, &skip).unwrap();
/// assert_eq!(url.as_str(), "https://cdn.example.com/a/poster.jpg");
///
/// assert!(normalize_image_src("/static/site-logo.png", &base, &skip).is_none());
/// ```
pub fn normalize_image_src(raw: &str, base: &Url, skip: &SkipPatterns) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if IGNORED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    let resolved = if raw.starts_with("//") {
        Url::parse(&format!("https:{}", raw)).ok()?
    } else if raw.starts_with('/') {
        let root = base.as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", root, raw)).ok()?
    } else if lowered.starts_with("http://") || lowered.starts_with("https://") {
        Url::parse(raw).ok()?
    } else {
        base.join(raw).ok()?
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if skip.matches(resolved.as_str()) {
        tracing::trace!("Skipping low-value image {}", resolved);
        return None;
    }

    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.example.com").unwrap()
    }

    fn normalize(raw: &str) -> Option<String> {
        normalize_image_src(raw, &base(), &SkipPatterns::default()).map(|u| u.to_string())
    }

    #[test]
    fn test_protocol_relative_gets_https() {
        assert_eq!(
            normalize("//cdn.example.net/img/a.jpg"),
            Some("https://cdn.example.net/img/a.jpg".to_string())
        );
        assert_eq!(
            normalize("//images.other.org/x/y/z.webp?w=800"),
            Some("https://images.other.org/x/y/z.webp?w=800".to_string())
        );
    }

    #[test]
    fn test_root_relative_prefixed_with_base() {
        assert_eq!(
            normalize("/uploads/2021/poster.jpg"),
            Some("https://www.example.com/uploads/2021/poster.jpg".to_string())
        );
    }

    #[test]
    fn test_root_relative_keeps_base_path() {
        let base = Url::parse("https://example.com/mirror/").unwrap();
        let url = normalize_image_src("/a.png", &base, &SkipPatterns::default()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/mirror/a.png");
    }

    #[test]
    fn test_relative_joined_onto_base() {
        let base = Url::parse("https://example.com/blog/feed").unwrap();
        let url = normalize_image_src("media/a.png", &base, &SkipPatterns::default()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog/media/a.png");
    }

    #[test]
    fn test_absolute_passes_through() {
        assert_eq!(
            normalize("http://other.com/a.gif"),
            Some("http://other.com/a.gif".to_string())
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            normalize("  /a/b.jpg\n"),
            Some("https://www.example.com/a/b.jpg".to_string())
        );
    }

    #[test]
    fn test_empty_and_inline_sources_dropped() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("data:image/gif;base64,R0lGODlhAQABAAAAACw="), None);
        assert_eq!(normalize("javascript:void(0)"), None);
    }

    #[test]
    fn test_non_http_scheme_dropped() {
        assert_eq!(normalize("ftp://files.example.com/a.jpg"), None);
    }

    #[test]
    fn test_skip_patterns_case_insensitive() {
        for raw in [
            "/img/ICON-share.png",
            "//cdn.example.com/Logo.svg",
            "https://example.com/users/avatar/42.jpg",
            "/static/PlaceHolder.gif",
            "/favicon.ico",
        ] {
            assert_eq!(normalize(raw), None, "{} should be skipped", raw);
        }
    }

    #[test]
    fn test_skip_pattern_matches_anywhere_in_url() {
        // Pattern in the host, not the path
        assert_eq!(normalize("//logos.cdn.com/ad.jpg"), None);
    }

    #[test]
    fn test_custom_skip_patterns() {
        let skip = SkipPatterns::new(vec!["thumb".to_string()]);
        assert!(normalize_image_src("/thumb/a.jpg", &base(), &skip).is_none());
        // Defaults no longer apply
        assert!(normalize_image_src("/logo.jpg", &base(), &skip).is_some());
    }
}
