//! Per-session counters and per-image download outcomes

use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Outcome of a single image download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Not attempted yet
    Pending,

    /// The destination file was already on disk; nothing was fetched
    SkippedExisting,

    /// The image was fetched and written
    Downloaded,

    /// Fetch error, non-image content, or write error
    Failed(DownloadFailure),
}

impl DownloadStatus {
    /// Returns true if the image is on disk after this outcome
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SkippedExisting | Self::Downloaded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Why an image could not be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    /// Network error, timeout, or non-2xx response
    Fetch(String),

    /// The server answered with something that is not an image
    NonImageContent(String),

    /// Creating or writing the destination failed
    Io(String),
}

impl fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "fetch failed: {}", e),
            Self::NonImageContent(ct) => write!(f, "non-image content-type '{}'", ct),
            Self::Io(e) => write!(f, "write failed: {}", e),
        }
    }
}

/// An image reference resolved to its place on disk
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    /// Absolute image URL
    pub url: Url,

    /// Feed page the image was found on
    pub page: u32,

    /// Filename within the page directory
    pub filename: String,

    /// `{download_root}/page_{page}/{filename}`
    pub path: PathBuf,

    pub status: DownloadStatus,
}

/// Counters for one crawl session
///
/// `downloaded` and `failed` only change through [`CrawlState::record`],
/// which the downloader calls once per image. Page counters belong to the
/// coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    pub downloaded: u64,
    pub failed: u64,
    pub skipped_existing: u64,
    pub pages_crawled: u64,
    pub pages_failed: u64,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a download outcome to the counters
    pub fn record(&mut self, status: &DownloadStatus) {
        match status {
            DownloadStatus::Downloaded => self.downloaded += 1,
            DownloadStatus::SkippedExisting => self.skipped_existing += 1,
            DownloadStatus::Failed(_) => self.failed += 1,
            DownloadStatus::Pending => {}
        }
    }

    /// Total images handled, whatever the outcome
    pub fn images_seen(&self) -> u64 {
        self.downloaded + self.failed + self.skipped_existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_outcome() {
        let mut state = CrawlState::new();
        state.record(&DownloadStatus::Downloaded);
        state.record(&DownloadStatus::Downloaded);
        state.record(&DownloadStatus::SkippedExisting);
        state.record(&DownloadStatus::Failed(DownloadFailure::NonImageContent(
            "text/html".to_string(),
        )));
        state.record(&DownloadStatus::Pending);

        assert_eq!(state.downloaded, 2);
        assert_eq!(state.skipped_existing, 1);
        assert_eq!(state.failed, 1);
        assert_eq!(state.images_seen(), 4);
    }

    #[test]
    fn test_status_predicates() {
        assert!(DownloadStatus::Downloaded.is_success());
        assert!(DownloadStatus::SkippedExisting.is_success());
        assert!(!DownloadStatus::Pending.is_success());

        let failed = DownloadStatus::Failed(DownloadFailure::Io("disk full".to_string()));
        assert!(failed.is_failure());
        assert!(!failed.is_success());
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(
            DownloadFailure::NonImageContent("text/html".to_string()).to_string(),
            "non-image content-type 'text/html'"
        );
    }
}
