//! Shared data structures for upload orchestration.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Name used when a file is supplied without one.
pub const DEFAULT_FILE_NAME: &str = "unnamed-blob";

/// Default batch-wide concurrency ceiling for file pipelines.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 10;

/// Default concurrency ceiling for downloads.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 10;

/// Default retry attempt budget for a single part upload.
pub const DEFAULT_PART_RETRY_ATTEMPTS: u32 = 10;

/// Content-Disposition directive requested for the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDisposition {
    #[default]
    Inline,
    Attachment,
}

impl ContentDisposition {
    /// The directive as it appears in headers and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDisposition::Inline => "inline",
            ContentDisposition::Attachment => "attachment",
        }
    }
}

/// Access-control setting for the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    PublicRead,
    Private,
}

impl Acl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::PublicRead => "public-read",
            Acl::Private => "private",
        }
    }
}

/// A file staged for upload.
///
/// Holds the full content in memory and exposes arbitrary `[offset, end)`
/// range slicing for multipart partitioning. Immutable for the duration of
/// one upload; clones share the underlying buffer.
#[derive(Debug, Clone)]
pub struct UploadableFile {
    /// File name (defaults to [`DEFAULT_FILE_NAME`] if not supplied).
    pub name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Content length in bytes.
    pub size: u64,
    /// Optional caller-supplied identifier, forwarded to the control plane.
    pub custom_id: Option<String>,
    data: Arc<Vec<u8>>,
}

impl UploadableFile {
    /// Create a file from in-memory bytes.
    ///
    /// # Arguments
    /// * `name` - File name; `None` falls back to [`DEFAULT_FILE_NAME`]
    /// * `content_type` - MIME type
    /// * `data` - File content
    pub fn new(name: Option<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            content_type: content_type.into(),
            size: data.len() as u64,
            custom_id: None,
            data: Arc::new(data),
        }
    }

    /// Attach a caller-supplied identifier.
    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    /// Borrow the byte range `[offset, end)`, clamped to the file length.
    pub fn slice(&self, offset: u64, end: u64) -> &[u8] {
        let len = self.data.len() as u64;
        let start = offset.min(len) as usize;
        let stop = end.min(len) as usize;
        &self.data[start..stop.max(start)]
    }

    /// Borrow the full content.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Per-file upload descriptor issued by the control plane.
///
/// The variant is chosen by the control plane, not the client; the two
/// shapes are distinguished structurally (a multipart descriptor carries
/// `urls`, a presigned-post descriptor carries `fields`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UploadDescriptor {
    Multipart(MultipartDescriptor),
    PresignedPost(PresignedPostDescriptor),
}

/// Descriptor for a chunked multipart upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartDescriptor {
    /// Presigned per-part upload URLs, ordered by part number.
    pub urls: Vec<String>,
    /// Storage object key.
    pub key: String,
    /// Final retrieval URL.
    pub file_url: String,
    /// Declared file type.
    pub file_type: String,
    /// Upload transaction id, echoed back on completion.
    pub upload_id: String,
    /// Fixed chunk size in bytes.
    pub chunk_size: u64,
    /// Total chunk count.
    pub chunk_count: u32,
    /// Content-disposition directive for the stored object.
    pub content_disposition: ContentDisposition,
}

/// Descriptor for a single-shot presigned form POST.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedPostDescriptor {
    /// Target URL for the form POST.
    pub url: String,
    /// Form fields to attach, in control-plane iteration order.
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// Storage object key.
    pub key: String,
    /// Final retrieval URL.
    pub file_url: String,
    /// Content-disposition directive for the stored object.
    pub content_disposition: ContentDisposition,
}

/// Acknowledgement for one uploaded part.
///
/// `part_number` is 1-based and matches the part's position in the
/// descriptor's URL list. Serializes to the control plane's
/// `{tag, partNumber}` wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartAck {
    /// Opaque storage-provider ETag for the part.
    #[serde(rename = "tag")]
    pub etag: String,
    /// 1-based part number.
    #[serde(rename = "partNumber")]
    pub part_number: u32,
}

/// Result of one successfully uploaded file.
#[derive(Debug, Clone)]
pub struct UploadResult {
    /// Storage object key.
    pub key: String,
    /// Final retrieval URL.
    pub url: String,
    /// Original file name.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
}

/// Per-file outcome of a batch upload, in input order.
///
/// One failed file does not abort the batch; its error is carried here.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Original file name.
    pub name: String,
    /// Upload result or the error that stopped this file's pipeline.
    pub result: Result<UploadResult, UploadError>,
}

/// Per-URL outcome of a batch download, in input order.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Source URL.
    pub url: String,
    /// Downloaded file or the error for this URL.
    pub result: Result<UploadableFile, UploadError>,
}

/// Exponential backoff schedule shared by part-upload retries and
/// completion polling.
#[derive(Debug, Clone)]
pub struct BackoffSettings {
    /// Initial backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Backoff multiplier (exponential backoff).
    pub backoff_multiplier: f64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 100,
            max_backoff_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl BackoffSettings {
    /// Delay before the retry following `attempt` (0-based).
    ///
    /// Grows by `backoff_multiplier` per attempt, capped at
    /// `max_backoff_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let ms = (self.initial_backoff_ms as f64 * factor) as u64;
        Duration::from_millis(ms.min(self.max_backoff_ms))
    }
}

/// Options for batch upload operations.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Batch-wide ceiling on concurrent file pipelines. Part uploads
    /// inherit this budget; there is no independent per-file part pool.
    pub max_concurrency: usize,
    /// Attempt budget for a single part upload.
    pub part_retry_attempts: u32,
    /// Shared backoff schedule for part retries and completion polling.
    pub backoff: BackoffSettings,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_BATCH_CONCURRENCY,
            part_retry_attempts: DEFAULT_PART_RETRY_ATTEMPTS,
            backoff: BackoffSettings::default(),
        }
    }
}

impl UploadOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch-wide concurrency ceiling.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-part retry attempt budget.
    pub fn with_part_retry_attempts(mut self, attempts: u32) -> Self {
        self.part_retry_attempts = attempts;
        self
    }

    /// Set the shared backoff schedule.
    pub fn with_backoff(mut self, backoff: BackoffSettings) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Options for batch download operations.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Ceiling on concurrent downloads.
    pub max_concurrency: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
        }
    }
}

impl DownloadOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the download concurrency ceiling.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_name() {
        let file = UploadableFile::new(None, "application/octet-stream", vec![1, 2, 3]);
        assert_eq!(file.name, DEFAULT_FILE_NAME);
        assert_eq!(file.size, 3);
    }

    #[test]
    fn test_slice_ranges() {
        let file = UploadableFile::new(Some("a.bin".into()), "application/octet-stream", vec![0, 1, 2, 3, 4]);
        assert_eq!(file.slice(0, 2), &[0, 1]);
        assert_eq!(file.slice(3, 5), &[3, 4]);
        // End past the file length is clamped
        assert_eq!(file.slice(3, 100), &[3, 4]);
        assert_eq!(file.slice(100, 200), &[] as &[u8]);
    }

    #[test]
    fn test_backoff_growth_and_cap() {
        let backoff = BackoffSettings {
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
        };
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(400));
        // Capped
        assert_eq!(backoff.delay_for_attempt(10), Duration::from_millis(1_000));
    }

    #[test]
    fn test_backoff_strictly_increasing_until_cap() {
        let backoff = BackoffSettings::default();
        let mut previous = Duration::ZERO;
        for attempt in 0..8 {
            let delay = backoff.delay_for_attempt(attempt);
            assert!(delay > previous, "delay must grow at attempt {attempt}");
            previous = delay;
        }
    }

    #[test]
    fn test_upload_options_builders() {
        let options = UploadOptions::new()
            .with_max_concurrency(4)
            .with_part_retry_attempts(3);
        assert_eq!(options.max_concurrency, 4);
        assert_eq!(options.part_retry_attempts, 3);
    }

    #[test]
    fn test_descriptor_deserialize_multipart() {
        let json = r#"{
            "urls": ["https://s3/u1", "https://s3/u2"],
            "key": "k1",
            "fileUrl": "https://cdn/k1",
            "fileType": "image/png",
            "uploadId": "txn-1",
            "chunkSize": 1000000,
            "chunkCount": 2,
            "contentDisposition": "inline"
        }"#;
        let descriptor: UploadDescriptor = serde_json::from_str(json).unwrap();
        match descriptor {
            UploadDescriptor::Multipart(m) => {
                assert_eq!(m.urls.len(), 2);
                assert_eq!(m.chunk_size, 1_000_000);
                assert_eq!(m.content_disposition, ContentDisposition::Inline);
            }
            UploadDescriptor::PresignedPost(_) => panic!("expected multipart descriptor"),
        }
    }

    #[test]
    fn test_descriptor_deserialize_presigned_post() {
        let json = r#"{
            "url": "https://s3/post",
            "fields": {"key": "abc", "policy": "xyz"},
            "key": "k2",
            "fileUrl": "https://cdn/k2",
            "contentDisposition": "attachment"
        }"#;
        let descriptor: UploadDescriptor = serde_json::from_str(json).unwrap();
        match descriptor {
            UploadDescriptor::PresignedPost(p) => {
                // Field iteration order must follow the wire order
                let names: Vec<&str> = p.fields.keys().map(String::as_str).collect();
                assert_eq!(names, vec!["key", "policy"]);
                assert_eq!(p.content_disposition, ContentDisposition::Attachment);
            }
            UploadDescriptor::Multipart(_) => panic!("expected presigned-post descriptor"),
        }
    }

    #[test]
    fn test_part_ack_wire_shape() {
        let ack = PartAck {
            etag: "\"abc\"".into(),
            part_number: 2,
        };
        let json = serde_json::to_string(&ack).unwrap();
        assert_eq!(json, r#"{"tag":"\"abc\"","partNumber":2}"#);
    }
}
