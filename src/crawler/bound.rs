//! Page-bound discovery
//!
//! Feeds rarely advertise how many pages they have. Instead of guessing, the
//! crawler binary-searches the page numbers for the last one that still
//! yields images.
//!
//! # Precondition
//!
//! The search assumes content is monotonic: every page up to the true bound
//! has images and no page after it does. A feed with an empty page in the
//! middle, or stray content past the end, produces a wrong bound. This is
//! not detected.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::ImageExtractor;
use crate::url::FeedUrls;
use crate::{GleanError, Result};
use async_trait::async_trait;

/// Answers "does this feed page have images?"
#[async_trait]
pub trait ContentProbe: Send + Sync {
    async fn has_content(&self, page: u32) -> bool;
}

/// Probes the live feed: a page has content when it can be fetched and at
/// least one image survives extraction
pub struct FeedProbe<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a ImageExtractor,
    feed: &'a FeedUrls,
}

impl<'a> FeedProbe<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        extractor: &'a ImageExtractor,
        feed: &'a FeedUrls,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            feed,
        }
    }
}

#[async_trait]
impl ContentProbe for FeedProbe<'_> {
    async fn has_content(&self, page: u32) -> bool {
        let url = self.feed.page_url(page);
        match self.fetcher.fetch_page(&url).await {
            Ok(body) => {
                let count = self.extractor.extract(&body).len();
                tracing::debug!("Probe page {}: {} images", page, count);
                count > 0
            }
            Err(e) => {
                tracing::debug!("Probe page {}: {}", page, e);
                false
            }
        }
    }
}

/// Finds the highest page in `[lower, upper]` that has content
///
/// # Algorithm
///
/// Binary search with a floor that always has content (assumed for `lower`)
/// and a ceiling that never exceeds the true bound. Each probe at
/// `mid = (floor + ceiling + 1) / 2` either raises the floor to `mid` or
/// drops the ceiling to `mid - 1`; the rounding up guarantees progress. When
/// the search settles on `lower` itself, that page is probed once so an
/// empty or unreachable feed is reported instead of silently yielding
/// `lower`.
///
/// # Returns
///
/// * `Ok(u32)` - The last page with content
/// * `Err(GleanError::BoundNotFound)` - Not even `lower` has content
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use feed_gleaner::crawler::{locate_page_bound, ContentProbe};
///
/// struct FirstSeven;
///
/// #[async_trait]
/// impl ContentProbe for FirstSeven {
///     async fn has_content(&self, page: u32) -> bool {
///         page <= 7
///     }
/// }
///
/// # tokio_test(async {
/// let bound = locate_page_bound(&FirstSeven, 1, 20).await.unwrap();
/// assert_eq!(bound, 7);
/// # });
/// # fn tokio_test<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
pub async fn locate_page_bound<P>(probe: &P, lower: u32, upper: u32) -> Result<u32>
where
    P: ContentProbe + ?Sized,
{
    if lower < 1 || upper < lower {
        return Err(GleanError::InvalidRange {
            start: lower,
            end: upper,
        });
    }

    tracing::info!("Locating last page with images between {} and {}", lower, upper);

    let mut floor = lower;
    let mut ceiling = upper;
    let mut probes = 0u32;

    while floor < ceiling {
        let mid = floor + (ceiling - floor + 1) / 2;
        probes += 1;

        if probe.has_content(mid).await {
            floor = mid;
        } else {
            ceiling = mid - 1;
        }
    }

    if floor == lower {
        probes += 1;
        if !probe.has_content(lower).await {
            tracing::error!(
                "No content on page {} after {} probes; check base URL and connectivity",
                lower,
                probes
            );
            return Err(GleanError::BoundNotFound { lower, upper });
        }
    }

    tracing::info!("Found last page with images: {} ({} probes)", floor, probes);
    Ok(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Synthetic feed: pages in `with_content` have images, recording every probe
    struct SyntheticFeed {
        with_content: HashSet<u32>,
        probed: Mutex<Vec<u32>>,
    }

    impl SyntheticFeed {
        fn up_to(last: u32) -> Self {
            Self::pages((1..=last).collect())
        }

        fn pages(with_content: HashSet<u32>) -> Self {
            Self {
                with_content,
                probed: Mutex::new(Vec::new()),
            }
        }

        fn probe_count(&self) -> usize {
            self.probed.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ContentProbe for SyntheticFeed {
        async fn has_content(&self, page: u32) -> bool {
            self.probed.lock().unwrap().push(page);
            self.with_content.contains(&page)
        }
    }

    #[tokio::test]
    async fn test_locates_seven_of_twenty() {
        let feed = SyntheticFeed::up_to(7);
        assert_eq!(locate_page_bound(&feed, 1, 20).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_every_bound_in_range() {
        for last in 1..=20 {
            let feed = SyntheticFeed::up_to(last);
            assert_eq!(
                locate_page_bound(&feed, 1, 20).await.unwrap(),
                last,
                "bound {} not found",
                last
            );
        }
    }

    #[tokio::test]
    async fn test_bound_at_upper_estimate() {
        let feed = SyntheticFeed::up_to(50);
        assert_eq!(locate_page_bound(&feed, 1, 20).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_probe_count_is_logarithmic() {
        let feed = SyntheticFeed::up_to(873);
        assert_eq!(locate_page_bound(&feed, 1, 1400).await.unwrap(), 873);
        // ceil(log2(1400)) = 11
        assert!(feed.probe_count() <= 11, "{} probes", feed.probe_count());
    }

    #[tokio::test]
    async fn test_empty_feed_fails() {
        let feed = SyntheticFeed::pages(HashSet::new());
        let result = locate_page_bound(&feed, 1, 20).await;
        assert!(matches!(
            result,
            Err(GleanError::BoundNotFound { lower: 1, upper: 20 })
        ));
    }

    #[tokio::test]
    async fn test_single_page_range() {
        let feed = SyntheticFeed::up_to(3);
        assert_eq!(locate_page_bound(&feed, 3, 3).await.unwrap(), 3);

        let empty = SyntheticFeed::up_to(2);
        assert!(locate_page_bound(&empty, 3, 3).await.is_err());
    }

    #[tokio::test]
    async fn test_nonzero_lower_bound() {
        let feed = SyntheticFeed::up_to(40);
        assert_eq!(locate_page_bound(&feed, 10, 100).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_invalid_range_rejected() {
        let feed = SyntheticFeed::up_to(5);
        assert!(matches!(
            locate_page_bound(&feed, 10, 5).await,
            Err(GleanError::InvalidRange { start: 10, end: 5 })
        ));
        assert!(locate_page_bound(&feed, 0, 5).await.is_err());
        assert_eq!(feed.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_non_monotonic_feed_gives_wrong_bound() {
        // Pages 1-3 and 9-12 have content; the gap violates the precondition.
        // First probe is mid = 11, which has content, so the search never
        // looks below it and reports 12 instead of 3.
        let pages: HashSet<u32> = (1..=3).chain(9..=12).collect();
        let feed = SyntheticFeed::pages(pages);
        assert_eq!(locate_page_bound(&feed, 1, 20).await.unwrap(), 12);
    }
}
