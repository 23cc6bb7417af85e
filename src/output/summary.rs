//! Crawl summary data and output errors

use crate::state::{CrawlPhase, CrawlState};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// End-of-session report
///
/// Produced for every session that got past configuration, whether it
/// completed, was interrupted, or never found a page bound.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub phase: CrawlPhase,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: Option<String>,

    /// Last page with images, if it was located
    pub page_bound: Option<u32>,
    /// First and last page of the crawled range
    pub page_range: Option<(u32, u32)>,

    pub pages_crawled: u64,
    pub pages_failed: u64,
    pub downloaded: u64,
    pub failed: u64,
    pub skipped_existing: u64,

    pub download_root: PathBuf,
}

impl CrawlSummary {
    /// Creates a summary from the session's counters
    pub fn from_state(
        state: &CrawlState,
        phase: CrawlPhase,
        started_at: DateTime<Utc>,
        download_root: PathBuf,
    ) -> Self {
        Self {
            phase,
            started_at,
            finished_at: Utc::now(),
            config_hash: None,
            page_bound: None,
            page_range: None,
            pages_crawled: state.pages_crawled,
            pages_failed: state.pages_failed,
            downloaded: state.downloaded,
            failed: state.failed,
            skipped_existing: state.skipped_existing,
            download_root,
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }

    /// Share of attempted downloads that ended with the image on disk
    pub fn success_rate(&self) -> f64 {
        let attempted = self.downloaded + self.skipped_existing + self.failed;
        if attempted == 0 {
            return 0.0;
        }
        ((self.downloaded + self.skipped_existing) as f64 / attempted as f64) * 100.0
    }
}
