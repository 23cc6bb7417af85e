//! HTML parser for extracting image references
//!
//! Each `<img>` element contributes at most one URL: the first non-empty
//! source attribute in priority order (by default `src`, then the lazy-load
//! attributes `data-src` and `data-lazy-src`). Sources are resolved and
//! filtered by the URL normalizer, and the result is deduplicated.

use crate::config::FilterConfig;
use crate::url::{normalize_image_src, SkipPatterns};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Pulls normalized image URLs out of feed page markup
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    base: Url,
    source_attributes: Vec<String>,
    skip: SkipPatterns,
}

impl ImageExtractor {
    /// Creates an extractor resolving relative sources against `base`
    pub fn new(base: Url, source_attributes: Vec<String>, skip: SkipPatterns) -> Self {
        Self {
            base,
            source_attributes,
            skip,
        }
    }

    /// Creates an extractor using the configured attribute and skip tables
    pub fn from_config(base: Url, filters: &FilterConfig) -> Self {
        Self::new(
            base,
            filters.source_attributes.clone(),
            SkipPatterns::new(filters.skip_patterns.clone()),
        )
    }

    /// Extracts the set of image URLs referenced by a page body
    ///
    /// Empty or malformed markup yields an empty set; a page without images
    /// is a valid result, not an error. The set is ordered so downloads
    /// happen in a stable order from run to run.
    ///
    /// # Example
    ///
    /// ```
    /// use feed_gleaner::crawler::ImageExtractor;
    /// use feed_gleaner::url::SkipPatterns;
    /// use url::Url;
    ///
    /// let extractor = ImageExtractor::new(
    ///     Url::parse("https://www.example.com").unwrap(),
    ///     vec!["src".to_string(), "data-src".to_string()],
    ///     SkipPatterns::default(),
    /// );
    ///
    /// let html = r#"<img src="/a.jpg"><img data-src="/a.jpg"><img src="/logo.png">"#;
    /// let images = extractor.extract(html);
    /// assert_eq!(images.len(), 1);
    /// ```
    pub fn extract(&self, html: &str) -> BTreeSet<Url> {
        let mut images = BTreeSet::new();
        if html.trim().is_empty() {
            return images;
        }

        let selector = match Selector::parse("img") {
            Ok(s) => s,
            Err(_) => return images,
        };

        let document = Html::parse_document(html);
        for element in document.select(&selector) {
            let Some(raw) = self.select_source(element.value()) else {
                continue;
            };

            if let Some(url) = normalize_image_src(raw, &self.base, &self.skip) {
                images.insert(url);
            }
        }

        images
    }

    /// Picks the first non-empty source attribute in priority order
    fn select_source<'a>(&self, element: &'a scraper::node::Element) -> Option<&'a str> {
        self.source_attributes
            .iter()
            .filter_map(|name| element.attr(name))
            .find(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ImageExtractor {
        ImageExtractor::from_config(
            Url::parse("https://www.example.com").unwrap(),
            &FilterConfig::default(),
        )
    }

    fn urls(set: &BTreeSet<Url>) -> Vec<&str> {
        set.iter().map(|u| u.as_str()).collect()
    }

    #[test]
    fn test_no_images() {
        let html = r#"<html><body><p>Nothing to see</p><a href="/x.jpg">link</a></body></html>"#;
        assert!(extractor().extract(html).is_empty());
    }

    #[test]
    fn test_empty_body() {
        assert!(extractor().extract("").is_empty());
        assert!(extractor().extract("   \n").is_empty());
    }

    #[test]
    fn test_malformed_body() {
        let html = "<html><body><img src=\"/ok.jpg\"<<div><img src=</body";
        // Must not panic; whatever the parser recovers is still absolute
        let images = extractor().extract(html);
        assert!(images.iter().all(|u| u.scheme() == "https"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let html = r#"
            <img src="/ads/campaign.jpg">
            <img src="/ads/campaign.jpg">
            <img src="https://www.example.com/ads/campaign.jpg">
        "#;
        let images = extractor().extract(html);
        assert_eq!(
            urls(&images),
            vec!["https://www.example.com/ads/campaign.jpg"]
        );
    }

    #[test]
    fn test_attribute_priority() {
        let html = r#"<img src="/real.jpg" data-src="/lazy.jpg" data-lazy-src="/lazier.jpg">"#;
        assert_eq!(
            urls(&extractor().extract(html)),
            vec!["https://www.example.com/real.jpg"]
        );
    }

    #[test]
    fn test_lazy_load_fallbacks() {
        let html = r#"
            <img data-src="/lazy.jpg">
            <img src="" data-lazy-src="/lazier.jpg">
            <img src="   " data-src="" data-lazy-src="/third.jpg">
        "#;
        let images = extractor().extract(html);
        assert_eq!(
            urls(&images),
            vec![
                "https://www.example.com/lazier.jpg",
                "https://www.example.com/lazy.jpg",
                "https://www.example.com/third.jpg",
            ]
        );
    }

    #[test]
    fn test_img_without_any_source_ignored() {
        let html = r#"<img alt="broken"><img src="">"#;
        assert!(extractor().extract(html).is_empty());
    }

    #[test]
    fn test_filtered_images_dropped() {
        let html = r#"
            <img src="/static/logo.svg">
            <img src="//cdn.example.com/u/avatar/9.png">
            <img src="/ads/one.jpg">
        "#;
        assert_eq!(
            urls(&extractor().extract(html)),
            vec!["https://www.example.com/ads/one.jpg"]
        );
    }

    #[test]
    fn test_protocol_relative_and_absolute_mix() {
        let html = r#"
            <img src="//cdn.example.net/a.jpg">
            <img src="https://other.org/b.png">
        "#;
        assert_eq!(
            urls(&extractor().extract(html)),
            vec!["https://cdn.example.net/a.jpg", "https://other.org/b.png"]
        );
    }

    #[test]
    fn test_custom_source_attributes() {
        let extractor = ImageExtractor::new(
            Url::parse("https://www.example.com").unwrap(),
            vec!["data-original".to_string()],
            SkipPatterns::default(),
        );
        let html = r#"<img src="/ignored.jpg" data-original="/full.jpg">"#;
        assert_eq!(
            urls(&extractor.extract(html)),
            vec!["https://www.example.com/full.jpg"]
        );
    }
}
