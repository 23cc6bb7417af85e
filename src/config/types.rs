use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Feed-Gleaner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Where the feed lives and how its pages are addressed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Site root, e.g. `https://www.example.com`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated feed below the site root
    #[serde(rename = "feed-path", default = "default_feed_path")]
    pub feed_path: String,

    /// Query parameter carrying the page number
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First page the bound search may settle on
    #[serde(rename = "lower-bound", default = "default_lower_bound")]
    pub lower_bound: u32,

    /// Ceiling above which the feed is assumed to have no content
    #[serde(rename = "upper-estimate", default = "default_upper_estimate")]
    pub upper_estimate: u32,

    /// First page to crawl
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last page to crawl; the located bound when absent
    #[serde(rename = "end-page", default)]
    pub end_page: Option<u32>,

    /// Pause after each page (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause after each image download (milliseconds)
    #[serde(rename = "download-delay-ms", default = "default_download_delay_ms")]
    pub download_delay_ms: u64,

    /// Log a progress line every this many pages
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: u32,

    /// Timeout for a single feed page request (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for a single image request (seconds)
    #[serde(rename = "download-timeout-secs", default = "default_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Write buffer size used while streaming an image to disk (bytes)
    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            lower_bound: default_lower_bound(),
            upper_estimate: default_upper_estimate(),
            start_page: default_start_page(),
            end_page: None,
            page_delay_ms: default_page_delay_ms(),
            download_delay_ms: default_download_delay_ms(),
            progress_interval: default_progress_interval(),
            fetch_timeout_secs: default_timeout_secs(),
            download_timeout_secs: default_timeout_secs(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for the `page_{n}` folders
    #[serde(rename = "download-root")]
    pub download_root: PathBuf,

    /// Optional markdown summary written when the crawl ends
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<PathBuf>,
}

/// Heuristic tables used while extracting and naming images
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Substrings that mark an image URL as decoration rather than content
    #[serde(rename = "skip-patterns", default = "default_skip_patterns")]
    pub skip_patterns: Vec<String>,

    /// `<img>` attributes consulted for a source, in priority order
    #[serde(rename = "source-attributes", default = "default_source_attributes")]
    pub source_attributes: Vec<String>,

    /// Extension given to synthesized filenames
    #[serde(rename = "fallback-extension", default = "default_fallback_extension")]
    pub fallback_extension: String,

    /// Filenames shorter than this are replaced by a synthesized one
    #[serde(rename = "min-filename-length", default = "default_min_filename_length")]
    pub min_filename_length: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_patterns: default_skip_patterns(),
            source_attributes: default_source_attributes(),
            fallback_extension: default_fallback_extension(),
            min_filename_length: default_min_filename_length(),
        }
    }
}

fn default_feed_path() -> String {
    "/blog/feed".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_lower_bound() -> u32 {
    1
}

fn default_upper_estimate() -> u32 {
    1400
}

fn default_start_page() -> u32 {
    1
}

fn default_page_delay_ms() -> u64 {
    2000
}

fn default_download_delay_ms() -> u64 {
    500
}

fn default_progress_interval() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_chunk_size() -> usize {
    8192
}

fn default_skip_patterns() -> Vec<String> {
    ["icon", "logo", "avatar", "placeholder"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_source_attributes() -> Vec<String> {
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_fallback_extension() -> String {
    "jpg".to_string()
}

fn default_min_filename_length() -> usize {
    5
}
