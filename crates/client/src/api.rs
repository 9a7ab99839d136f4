//! Control-plane API requests and wire types.
//!
//! One round trip per operation; no retry lives at this layer. The
//! control plane issues upload descriptors, finalizes multipart
//! transactions, and reports upload status.

use serde::{Deserialize, Serialize};

use crate::error::UploadError;
use crate::traits::{HttpRequest, TransportContext};
use crate::types::{Acl, ContentDisposition, PartAck, UploadDescriptor, UploadableFile};

const UPLOAD_FILES_ROUTE: &str = "api/uploadFiles";
const COMPLETE_MULTIPART_ROUTE: &str = "api/completeMultipart";
const POLL_UPLOAD_ROUTE: &str = "api/pollUpload";

/// The only terminal-success poll status.
pub const DONE_STATUS: &str = "done";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    file_type: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignedUrlRequest<'a> {
    files: Vec<FileEntry<'a>>,
    metadata: &'a serde_json::Value,
    content_disposition: ContentDisposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    acl: Option<Acl>,
}

#[derive(Debug, Deserialize)]
struct PresignedUrlResponse {
    data: Vec<UploadDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteMultipartRequest<'a> {
    file_key: &'a str,
    upload_id: &'a str,
    etags: &'a [PartAck],
}

/// Upload status reported by the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct PollStatus {
    pub status: String,
}

impl PollStatus {
    /// Whether this status is terminal-success.
    pub fn is_done(&self) -> bool {
        self.status == DONE_STATUS
    }
}

/// Exchange file metadata for per-file upload descriptors.
///
/// The response must decode into exactly one descriptor per input file,
/// order-aligned; anything else is a contract violation that aborts the
/// batch.
pub async fn request_presigned_urls(
    ctx: &TransportContext,
    files: &[UploadableFile],
    metadata: &serde_json::Value,
    content_disposition: ContentDisposition,
    acl: Option<Acl>,
) -> Result<Vec<UploadDescriptor>, UploadError> {
    let body = PresignedUrlRequest {
        files: files
            .iter()
            .map(|f| FileEntry {
                name: &f.name,
                file_type: &f.content_type,
                size: f.size,
                custom_id: f.custom_id.as_deref(),
            })
            .collect(),
        metadata,
        content_disposition,
        acl,
    };

    let url = ctx.api_url(UPLOAD_FILES_ROUTE)?;
    let response = ctx
        .fetch_api(HttpRequest::post(url.as_str()).json(&body)?)
        .await?;

    if !response.is_success() {
        return Err(UploadError::Network {
            message: format!(
                "Presigned URL request failed: HTTP {} - {}",
                response.status,
                response.text()
            ),
            retryable: false,
        });
    }

    let decoded: PresignedUrlResponse = response.json()?;
    if decoded.data.len() != files.len() {
        return Err(UploadError::contract(format!(
            "Expected {} upload descriptors, got {}",
            files.len(),
            decoded.data.len()
        )));
    }

    log::debug!("Fetched {} upload descriptors", decoded.data.len());
    Ok(decoded.data)
}

/// Finalize a multipart transaction with the ordered part acks.
pub async fn complete_multipart(
    ctx: &TransportContext,
    file_key: &str,
    upload_id: &str,
    etags: &[PartAck],
) -> Result<(), UploadError> {
    let body = CompleteMultipartRequest {
        file_key,
        upload_id,
        etags,
    };

    let url = ctx.api_url(COMPLETE_MULTIPART_ROUTE)?;
    let response = ctx
        .fetch_api(HttpRequest::post(url.as_str()).json(&body)?)
        .await?;

    if !response.is_success() {
        return Err(UploadError::Network {
            message: format!(
                "Multipart completion failed for {file_key}: HTTP {} - {}",
                response.status,
                response.text()
            ),
            retryable: false,
        });
    }

    log::debug!("Completed multipart upload for {file_key}");
    Ok(())
}

/// Fetch the current upload status for an object key.
pub async fn poll_upload_once(
    ctx: &TransportContext,
    key: &str,
) -> Result<PollStatus, UploadError> {
    let url = ctx.api_url(&format!("{POLL_UPLOAD_ROUTE}/{key}"))?;
    let response = ctx.fetch_api(HttpRequest::get(url.as_str())).await?;

    if !response.is_success() {
        return Err(UploadError::Network {
            message: format!(
                "Status poll failed for {key}: HTTP {}",
                response.status
            ),
            retryable: false,
        });
    }

    response.json()
}
