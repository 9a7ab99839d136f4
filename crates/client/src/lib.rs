//! Client-side orchestration for presigned file uploads.
//!
//! This crate moves files to remote storage through a two-phase protocol:
//! a control-plane round trip exchanges file metadata for short-lived
//! upload descriptors, then file bytes travel directly to the storage
//! provider - either as one presigned form POST or as a chunked multipart
//! sequence - and completion is confirmed by polling the control plane.
//!
//! All network traffic goes through an injected [`HttpTransport`]; the
//! crate never constructs its own HTTP client. A concrete `reqwest`-backed
//! transport lives in the `uplift-transport-reqwest` crate.
//!
//! # Concurrency
//!
//! File pipelines run under a batch-wide ceiling (default 10); part
//! uploads within a multipart file draw from the same budget rather than
//! an independent pool. Batch outcomes preserve input order regardless of
//! completion order.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use uplift_client::{
//!     read_config, ContentDisposition, TransportContext, UploadOrchestrator, UploadableFile,
//! };
//! use uplift_transport_reqwest::ReqwestTransport;
//!
//! let config = read_config()?;
//! let ctx = TransportContext::new(
//!     Arc::new(ReqwestTransport::new()),
//!     config.headers(),
//!     config.base_url,
//! );
//!
//! let files = vec![UploadableFile::new(
//!     Some("photo.png".into()),
//!     "image/png",
//!     bytes,
//! )];
//! let outcomes = UploadOrchestrator::new(&ctx)
//!     .upload_files(files, serde_json::Value::Null, ContentDisposition::Inline, None)
//!     .await?;
//! ```

mod api;
mod config;
mod download;
mod error;
mod parts;
mod poll;
mod retry;
mod traits;
mod types;
mod upload;

pub use api::{complete_multipart, poll_upload_once, request_presigned_urls, PollStatus, DONE_STATUS};
pub use config::{
    ensure_server_context, read_config, ApiConfig, API_KEY_HEADER, DEFAULT_API_URL, ENV_API_URL,
    ENV_SECRET,
};
pub use download::{DownloadOrchestrator, FALLBACK_FILE_NAME};
pub use error::UploadError;
pub use parts::{expected_part_count, generate_parts, PartRange};
pub use poll::wait_until_done;
pub use retry::retry_with_backoff;
pub use traits::{
    FormField, HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, TransportContext,
};
pub use types::{
    Acl, BackoffSettings, ContentDisposition, DownloadOptions, DownloadOutcome, FileOutcome,
    MultipartDescriptor, PartAck, PresignedPostDescriptor, UploadDescriptor, UploadOptions,
    UploadResult, UploadableFile, DEFAULT_BATCH_CONCURRENCY, DEFAULT_DOWNLOAD_CONCURRENCY,
    DEFAULT_FILE_NAME, DEFAULT_PART_RETRY_ATTEMPTS,
};
pub use upload::UploadOrchestrator;
