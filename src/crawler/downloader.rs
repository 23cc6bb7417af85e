//! Image download manager
//!
//! Stores one image at a time under `{root}/page_{n}/{filename}`:
//! - An existing destination file short-circuits the download; this is what
//!   makes a re-run over the same root resume instead of starting over
//! - Responses whose Content-Type is not `image/*` are rejected unwritten
//! - Bodies are streamed to a `.part` file and renamed into place, so an
//!   interrupted write never leaves something that looks finished
//!
//! Nothing here returns an error to the caller. Every outcome is folded into
//! the returned `DownloadTarget` and recorded on the `CrawlState`.

use crate::crawler::fetcher::FetchError;
use crate::state::{CrawlState, DownloadFailure, DownloadStatus, DownloadTarget};
use crate::url::FilenamePolicy;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

/// Fetches, validates, and persists images for one crawl session
pub struct Downloader {
    client: Client,
    root: PathBuf,
    timeout: Duration,
    chunk_size: usize,
    filenames: FilenamePolicy,
}

impl Downloader {
    /// Creates a downloader writing below `root`
    pub fn new(
        client: Client,
        root: impl Into<PathBuf>,
        timeout: Duration,
        chunk_size: usize,
        filenames: FilenamePolicy,
    ) -> Self {
        Self {
            client,
            root: root.into(),
            timeout,
            chunk_size,
            filenames,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the images of one page
    pub fn page_dir(&self, page: u32) -> PathBuf {
        self.root.join(format!("page_{}", page))
    }

    /// Downloads one image found on `page`
    ///
    /// # Steps
    ///
    /// 1. Derive the filename (path segment or synthesized)
    /// 2. Existing file → `SkippedExisting`, no request is made
    /// 3. GET the image; non-2xx or non-`image/*` → `Failed`
    /// 4. Create the page directory if needed
    /// 5. Stream to disk, then count it as `Downloaded`
    pub async fn download(
        &mut self,
        url: &Url,
        page: u32,
        state: &mut CrawlState,
    ) -> DownloadTarget {
        let filename = self.filenames.filename_for(url, page);
        let path = self.page_dir(page).join(&filename);

        let status = self.store(url, page, &path).await;
        state.record(&status);

        match &status {
            DownloadStatus::Downloaded => tracing::info!(
                "Downloaded: {} (Total: {})",
                filename,
                state.downloaded
            ),
            DownloadStatus::SkippedExisting => {
                tracing::info!("Skipping existing file: {}", filename)
            }
            DownloadStatus::Failed(DownloadFailure::NonImageContent(ct)) => {
                tracing::warn!("Skipping non-image content ({}): {}", ct, url)
            }
            DownloadStatus::Failed(reason) => {
                tracing::error!("Failed to download {}: {}", url, reason)
            }
            DownloadStatus::Pending => {}
        }

        DownloadTarget {
            url: url.clone(),
            page,
            filename,
            path,
            status,
        }
    }

    async fn store(&self, url: &Url, page: u32, path: &Path) -> DownloadStatus {
        match fs::try_exists(path).await {
            Ok(true) => return DownloadStatus::SkippedExisting,
            Ok(false) => {}
            Err(e) => return DownloadStatus::Failed(DownloadFailure::Io(e.to_string())),
        }

        let response = match self.request(url).await {
            Ok(r) => r,
            Err(e) => return DownloadStatus::Failed(DownloadFailure::Fetch(e.to_string())),
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.starts_with("image/") {
            return DownloadStatus::Failed(DownloadFailure::NonImageContent(content_type));
        }

        // Only created once there is an image to put in it
        if let Err(e) = fs::create_dir_all(self.page_dir(page)).await {
            return DownloadStatus::Failed(DownloadFailure::Io(e.to_string()));
        }

        match self.stream_to_file(url, response, path).await {
            Ok(bytes) => {
                tracing::debug!("Wrote {} bytes to {}", bytes, path.display());
                DownloadStatus::Downloaded
            }
            Err(failure) => failure,
        }
    }

    async fn request(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Streams the body to `{path}.part` and renames it to `path`
    ///
    /// The partial file is removed on any failure.
    async fn stream_to_file(
        &self,
        url: &Url,
        response: reqwest::Response,
        path: &Path,
    ) -> Result<u64, DownloadStatus> {
        let partial = partial_path(path);

        let written = match self.write_body(url, response, &partial).await {
            Ok(written) => written,
            Err(failure) => {
                let _ = fs::remove_file(&partial).await;
                return Err(failure);
            }
        };

        if let Err(e) = fs::rename(&partial, path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(DownloadStatus::Failed(DownloadFailure::Io(e.to_string())));
        }

        Ok(written)
    }

    async fn write_body(
        &self,
        url: &Url,
        response: reqwest::Response,
        partial: &Path,
    ) -> Result<u64, DownloadStatus> {
        let io_failure =
            |e: std::io::Error| DownloadStatus::Failed(DownloadFailure::Io(e.to_string()));

        let file = fs::File::create(partial).await.map_err(io_failure)?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                DownloadStatus::Failed(DownloadFailure::Fetch(
                    FetchError::from_reqwest(url, e).to_string(),
                ))
            })?;
            writer.write_all(&chunk).await.map_err(io_failure)?;
            written += chunk.len() as u64;
        }

        writer.flush().await.map_err(io_failure)?;
        Ok(written)
    }
}

/// `poster.jpg` → `poster.jpg.part`
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
