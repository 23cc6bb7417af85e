//! Crawler module for feed walking and image downloading
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of feed pages
//! - Image extraction from page markup
//! - Page-bound discovery by binary search
//! - Image downloading with resume and content-type checks
//! - Overall crawl coordination

mod bound;
mod coordinator;
mod downloader;
mod fetcher;
mod parser;

pub use bound::{locate_page_bound, ContentProbe, FeedProbe};
pub use coordinator::Coordinator;
pub use downloader::Downloader;
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use parser::ImageExtractor;

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the non-interactive entry point. It will:
/// 1. Build the HTTP client
/// 2. Locate the last page with images
/// 3. Crawl `start-page` through `end-page` (or the located bound)
/// 4. Return the summary
///
/// # Example
///
/// ```no_run
/// use feed_gleaner::config::load_config;
/// use feed_gleaner::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("gleaner.toml"))?;
/// let summary = crawl(config).await?;
/// println!("{} images downloaded", summary.downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlSummary> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
