//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the orchestrator's session state machine
//! - `CrawlState`: download and page counters for one session
//! - `DownloadStatus` / `DownloadTarget`: per-image outcome

mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::{CrawlState, DownloadFailure, DownloadStatus, DownloadTarget};
