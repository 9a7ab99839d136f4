//! Download orchestration.
//!
//! Fetches remote URLs into in-memory [`UploadableFile`] values for
//! re-upload workflows. Downloads run under their own concurrency ceiling
//! and share the batch policy of per-item failure isolation; there is no
//! retry - a failed GET fails that URL's outcome.

use futures::stream::{self, StreamExt};
use url::Url;

use crate::error::UploadError;
use crate::traits::{HttpRequest, TransportContext};
use crate::types::{DownloadOptions, DownloadOutcome, UploadableFile};

/// Name used when no file name can be derived from a URL.
pub const FALLBACK_FILE_NAME: &str = "unknown-filename";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// High-level download operations over an injected transport.
pub struct DownloadOrchestrator<'a> {
    /// Transport context shared by all downloads.
    ctx: &'a TransportContext,
    /// Download options.
    options: DownloadOptions,
}

impl<'a> DownloadOrchestrator<'a> {
    /// Create a new download orchestrator with default options.
    pub fn new(ctx: &'a TransportContext) -> Self {
        Self {
            ctx,
            options: DownloadOptions::default(),
        }
    }

    /// Set download options.
    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Download each URL fully into memory.
    ///
    /// Outcomes preserve input order; a failure for one URL does not abort
    /// the others.
    pub async fn download_files(&self, urls: Vec<String>) -> Vec<DownloadOutcome> {
        let max_concurrency = self.options.max_concurrency.max(1);

        stream::iter(urls)
            .map(|url| async move {
                let result = self.download_one(&url).await;
                if let Err(ref err) = result {
                    log::warn!("Download failed for {url}: {err}");
                }
                DownloadOutcome { url, result }
            })
            .buffered(max_concurrency)
            .collect()
            .await
    }

    /// Fetch one URL into an in-memory file.
    async fn download_one(&self, url: &str) -> Result<UploadableFile, UploadError> {
        let response = self.ctx.fetch_storage(HttpRequest::get(url)).await?;
        if !response.is_success() {
            return Err(UploadError::Network {
                message: format!("Download failed for {url}: HTTP {}", response.status),
                retryable: false,
            });
        }

        let content_type = response
            .header("content-type")
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        log::debug!("Downloaded {url} ({} bytes)", response.body.len());
        Ok(UploadableFile::new(
            Some(file_name_from_url(url)),
            content_type,
            response.body,
        ))
    }
}

/// Derive a file name from a URL's final path segment.
fn file_name_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_FILE_NAME.to_string();
    };

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(ToString::to_string)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}
