//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a crawl session through its phases:
//! - Locating the last feed page that still has images
//! - Walking the page range strictly in order, one request at a time
//! - Pacing requests toward the remote server
//! - Handling interruption without losing progress
//! - Producing the final summary

use crate::config::Config;
use crate::crawler::bound::{locate_page_bound, FeedProbe};
use crate::crawler::downloader::Downloader;
use crate::crawler::fetcher::{build_http_client, HttpFetcher, PageFetcher};
use crate::crawler::parser::ImageExtractor;
use crate::output::CrawlSummary;
use crate::state::{CrawlPhase, CrawlState};
use crate::url::{FeedUrls, FilenamePolicy};
use crate::{GleanError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
///
/// Owns every piece of per-session state. There is a single worker, so the
/// counters need no locking; cancellation arrives through a token that is
/// checked between pages and between downloads.
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: ImageExtractor,
    downloader: Downloader,
    feed: FeedUrls,
    state: CrawlState,
    phase: CrawlPhase,
    page_bound: Option<u32>,
    page_range: Option<(u32, u32)>,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a coordinator that fetches pages over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to locate the page bound
    /// * `Err(GleanError)` - The HTTP client or feed URL could not be built
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent)?;
        let fetcher = HttpFetcher::new(client.clone(), config.crawler.fetch_timeout());
        Self::with_fetcher(config, client, Arc::new(fetcher))
    }

    /// Creates a coordinator with a custom page transport
    ///
    /// Images are still downloaded with `client`.
    pub fn with_fetcher(
        config: Config,
        client: Client,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let feed = FeedUrls::from_config(&config.feed)?;
        let extractor = ImageExtractor::from_config(feed.base().clone(), &config.filters);
        let downloader = Downloader::new(
            client,
            config.output.download_root.clone(),
            config.crawler.download_timeout(),
            config.crawler.chunk_size,
            FilenamePolicy::new(
                config.filters.fallback_extension.clone(),
                config.filters.min_filename_length,
            ),
        );

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor,
            downloader,
            feed,
            state: CrawlState::new(),
            phase: CrawlPhase::Idle,
            page_bound: None,
            page_range: None,
            cancel: CancellationToken::new(),
            started_at: Utc::now(),
            config_hash: None,
        })
    }

    /// Records the configuration hash in the summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn page_bound(&self) -> Option<u32> {
        self.page_bound
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(GleanError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        if next.is_terminal() {
            tracing::info!(
                "Session {} after {}s",
                next,
                (Utc::now() - self.started_at).num_seconds()
            );
        }
        Ok(())
    }

    /// Finds the last page with images
    ///
    /// Runs once per session. Cancellation during the search ends the session
    /// as interrupted.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bound))` - The bound was found; `crawl` may follow
    /// * `Ok(None)` - Interrupted before the search finished
    /// * `Err(GleanError::BoundNotFound)` - Not even the first page has images
    pub async fn locate_bound(&mut self) -> Result<Option<u32>> {
        self.transition(CrawlPhase::LocatingBound)?;

        let lower = self.config.crawler.lower_bound;
        let upper = self.config.crawler.upper_estimate;

        let result = {
            let probe = FeedProbe::new(self.fetcher.as_ref(), &self.extractor, &self.feed);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                bound = locate_page_bound(&probe, lower, upper) => Some(bound),
            }
        };

        match result {
            None => {
                tracing::info!("Page bound search interrupted by user");
                self.transition(CrawlPhase::Interrupted)?;
                Ok(None)
            }
            Some(Ok(bound)) => {
                self.page_bound = Some(bound);
                Ok(Some(bound))
            }
            Some(Err(e)) => {
                self.transition(CrawlPhase::Failed)?;
                Err(e)
            }
        }
    }

    /// Crawls pages `start..=end` and downloads their images
    ///
    /// Page fetch failures and download failures are logged and counted but
    /// never stop the crawl. Only cancellation ends it early, and the counters
    /// gathered so far are kept.
    pub async fn crawl(&mut self, start: u32, end: u32) -> Result<CrawlSummary> {
        if start < 1 || end < start {
            return Err(GleanError::InvalidRange { start, end });
        }
        self.transition(CrawlPhase::Crawling)?;
        self.page_range = Some((start, end));

        let interval = u64::from(self.config.crawler.progress_interval.max(1));
        let page_delay = self.config.crawler.page_delay();
        let run_start = Instant::now();
        let mut interrupted = false;

        tracing::info!("Starting to scrape pages {} to {}", start, end);

        for page in start..=end {
            if self.cancel.is_cancelled() || !self.crawl_page(page).await {
                interrupted = true;
                break;
            }

            let completed = u64::from(page - start) + 1;
            if completed % interval == 0 {
                tracing::info!(
                    "Progress: {}/{} pages completed. Total downloaded: {}, Failed: {} ({:.1}s)",
                    page,
                    end,
                    self.state.downloaded,
                    self.state.failed,
                    run_start.elapsed().as_secs_f64()
                );
            }

            if page < end && !self.pause(page_delay).await {
                interrupted = true;
                break;
            }
        }

        if interrupted {
            tracing::info!("Scraping interrupted by user");
            self.transition(CrawlPhase::Interrupted)?;
        } else {
            self.transition(CrawlPhase::Completed)?;
        }

        tracing::info!(
            "Scraping {}! Total downloaded: {}, Failed: {} ({} images seen)",
            self.phase,
            self.state.downloaded,
            self.state.failed,
            self.state.images_seen()
        );

        Ok(self.summary())
    }

    /// Locates the bound, then crawls the configured range
    ///
    /// The range defaults to `start-page` through the located bound.
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        let bound = match self.locate_bound().await? {
            Some(bound) => bound,
            None => return Ok(self.summary()),
        };

        let start = self.config.crawler.start_page;
        let end = self.config.crawler.end_page.unwrap_or(bound);
        self.crawl(start, end).await
    }

    /// Snapshot of the session so far
    pub fn summary(&self) -> CrawlSummary {
        let mut summary = CrawlSummary::from_state(
            &self.state,
            self.phase,
            self.started_at,
            self.downloader.root().to_path_buf(),
        );
        summary.page_bound = self.page_bound;
        summary.page_range = self.page_range;
        summary.config_hash = self.config_hash.clone();
        summary
    }

    /// Processes a single page
    ///
    /// Returns false if the crawl was cancelled partway through the page.
    async fn crawl_page(&mut self, page: u32) -> bool {
        let url = self.feed.page_url(page);
        tracing::info!("Fetching page {}: {}", page, url);

        let body = match self.fetcher.fetch_page(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error fetching page {}: {}", page, e);
                self.state.pages_failed += 1;
                return true;
            }
        };

        let images = self.extractor.extract(&body);
        tracing::info!("Found {} images on page {}", images.len(), page);

        let download_delay = self.config.crawler.download_delay();
        let total = images.len();
        let mut stored = 0;

        for (i, image) in images.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return false;
            }

            let target = self.downloader.download(image, page, &mut self.state).await;
            if target.status.is_success() {
                stored += 1;
            }

            if i + 1 < total && !self.pause(download_delay).await {
                return false;
            }
        }

        self.state.pages_crawled += 1;
        tracing::info!("Page {} completed. Stored {} images.", page, stored);
        true
    }

    /// Sleeps for `delay` unless cancelled first
    ///
    /// Returns false if the crawl was cancelled.
    async fn pause(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.cancel.is_cancelled();
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
