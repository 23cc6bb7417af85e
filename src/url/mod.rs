//! URL handling module for Feed-Gleaner
//!
//! This module provides image source normalization, the low-value asset
//! filter, feed page addressing, and filename derivation for downloads.

mod filename;
mod normalize;

use crate::config::FeedConfig;
use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use filename::FilenamePolicy;
pub use normalize::normalize_image_src;

/// Case-insensitive substring filter for decorative images
///
/// A URL matches when its lowercase form contains any of the patterns.
#[derive(Debug, Clone)]
pub struct SkipPatterns {
    patterns: Vec<String>,
}

impl SkipPatterns {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Returns true if the URL should be skipped
    pub fn matches(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }
}

impl Default for SkipPatterns {
    fn default() -> Self {
        Self::new(
            ["icon", "logo", "avatar", "placeholder"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

/// Addresses the pages of a paginated feed
///
/// Page `n` lives at `{base}{feed_path}?{page_param}={n}`.
#[derive(Debug, Clone)]
pub struct FeedUrls {
    base: Url,
    feed: Url,
    page_param: String,
}

impl FeedUrls {
    /// Builds the page addressing scheme from the feed configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use feed_gleaner::config::FeedConfig;
    /// use feed_gleaner::url::FeedUrls;
    ///
    /// let feed = FeedUrls::from_config(&FeedConfig {
    ///     base_url: "https://www.example.com".to_string(),
    ///     feed_path: "/blog/feed".to_string(),
    ///     page_param: "page".to_string(),
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(
    ///     feed.page_url(3).as_str(),
    ///     "https://www.example.com/blog/feed?page=3"
    /// );
    /// ```
    pub fn from_config(config: &FeedConfig) -> UrlResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(base.scheme().to_string()));
        }

        let feed_str = format!(
            "{}{}",
            base.as_str().trim_end_matches('/'),
            config.feed_path
        );
        let feed = Url::parse(&feed_str).map_err(|e| UrlError::Parse(e.to_string()))?;

        Ok(Self {
            base,
            feed,
            page_param: config.page_param.clone(),
        })
    }

    /// The site root images are resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of the given feed page
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.feed.clone();
        url.query_pairs_mut()
            .append_pair(&self.page_param, &page.to_string());
        url
    }
}
