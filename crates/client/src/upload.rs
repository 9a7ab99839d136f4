//! Upload orchestration.
//!
//! This module drives the whole batch: one presigned-URL round trip, then a
//! per-file pipeline (multipart or presigned-post transfer, then completion
//! polling) for every file, under a batch-wide concurrency ceiling.
//!
//! # Upload Strategy
//!
//! The control plane assigns each file a descriptor variant:
//! - Multipart: the file is partitioned into fixed-size parts, each PUT to
//!   its own presigned URL, then finalized via the completion endpoint
//! - Presigned POST: one multipart form POST carries the whole file
//!
//! Part uploads inherit the batch-level budget - parts of one file compete
//! with other files' transfers for the same permits rather than using an
//! independent pool.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Semaphore;

use crate::api;
use crate::error::UploadError;
use crate::parts::{self, PartRange};
use crate::poll;
use crate::retry::retry_with_backoff;
use crate::traits::{FormField, HttpRequest, TransportContext};
use crate::types::{
    Acl, ContentDisposition, FileOutcome, MultipartDescriptor, PartAck, PresignedPostDescriptor,
    UploadDescriptor, UploadOptions, UploadResult, UploadableFile,
};

/// High-level upload operations over an injected transport.
pub struct UploadOrchestrator<'a> {
    /// Transport context shared by all pipelines.
    ctx: &'a TransportContext,
    /// Upload options.
    options: UploadOptions,
}

impl<'a> UploadOrchestrator<'a> {
    /// Create a new upload orchestrator with default options.
    pub fn new(ctx: &'a TransportContext) -> Self {
        Self {
            ctx,
            options: UploadOptions::default(),
        }
    }

    /// Set upload options.
    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }

    /// Upload a batch of files.
    ///
    /// Performs one presigned-URL round trip for the whole batch, then runs
    /// per-file pipelines under the batch-wide concurrency ceiling.
    ///
    /// Failures are isolated per file: one bad file does not abort its
    /// siblings, and the returned outcomes preserve input order. Batch-level
    /// failures (configuration, contract violations, the presign round trip
    /// itself) abort the whole call.
    pub async fn upload_files(
        &self,
        files: Vec<UploadableFile>,
        metadata: serde_json::Value,
        content_disposition: ContentDisposition,
        acl: Option<Acl>,
    ) -> Result<Vec<FileOutcome>, UploadError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let descriptors =
            api::request_presigned_urls(self.ctx, &files, &metadata, content_disposition, acl)
                .await?;

        let max_concurrency = self.options.max_concurrency.max(1);
        let budget = Arc::new(Semaphore::new(max_concurrency));

        // `buffered` preserves input order in the collected outcomes while
        // still running up to the ceiling concurrently.
        let outcomes: Vec<FileOutcome> = stream::iter(files.into_iter().zip(descriptors))
            .map(|(file, descriptor)| {
                let budget = Arc::clone(&budget);
                async move {
                    let name = file.name.clone();
                    let result = self.upload_single(&file, &descriptor, &budget).await;
                    if let Err(ref err) = result {
                        log::error!("Upload failed for {name}: {err}");
                    }
                    FileOutcome { name, result }
                }
            })
            .buffered(max_concurrency)
            .collect()
            .await;

        Ok(outcomes)
    }

    /// Run one file's pipeline: byte transfer, then completion polling.
    async fn upload_single(
        &self,
        file: &UploadableFile,
        descriptor: &UploadDescriptor,
        budget: &Semaphore,
    ) -> Result<UploadResult, UploadError> {
        let (key, file_url) = match descriptor {
            UploadDescriptor::Multipart(multipart) => {
                self.multipart_upload(file, multipart, budget).await?;
                (multipart.key.clone(), multipart.file_url.clone())
            }
            UploadDescriptor::PresignedPost(post) => {
                self.presigned_post_upload(file, post, budget).await?;
                (post.key.clone(), post.file_url.clone())
            }
        };

        poll::wait_until_done(self.ctx, &key, &self.options.backoff).await?;
        log::debug!("Upload finished for {} (key {key})", file.name);

        Ok(UploadResult {
            key,
            url: file_url,
            name: file.name.clone(),
            size: file.size,
        })
    }

    /// Execute a chunked multipart upload.
    async fn multipart_upload(
        &self,
        file: &UploadableFile,
        descriptor: &MultipartDescriptor,
        budget: &Semaphore,
    ) -> Result<(), UploadError> {
        let ranges = parts::generate_parts(file.size, descriptor.chunk_size);
        if ranges.len() != descriptor.urls.len() || ranges.len() != descriptor.chunk_count as usize
        {
            return Err(UploadError::contract(format!(
                "Descriptor for {} declares {} parts with {} URLs, but {} bytes at {} per chunk partition into {}",
                file.name,
                descriptor.chunk_count,
                descriptor.urls.len(),
                file.size,
                descriptor.chunk_size,
                ranges.len()
            )));
        }

        log::debug!(
            "Uploading {} as {} parts of {} bytes",
            file.name,
            ranges.len(),
            descriptor.chunk_size
        );

        let mut acks: Vec<PartAck> = stream::iter(ranges.into_iter().zip(descriptor.urls.iter()))
            .map(|(range, url)| self.upload_part_with_retry(file, range, url, descriptor, budget))
            .buffer_unordered(self.options.max_concurrency.max(1))
            .try_collect()
            .await?;

        // Parts race; storage backends require ascending order at completion
        acks.sort_by_key(|ack| ack.part_number);

        api::complete_multipart(self.ctx, &descriptor.key, &descriptor.upload_id, &acks).await
    }

    /// Upload one part with bounded retry.
    ///
    /// A retryable failure that exhausts the attempt budget escalates to
    /// [`UploadError::RetriesExhausted`]; a part is never silently dropped.
    async fn upload_part_with_retry(
        &self,
        file: &UploadableFile,
        range: PartRange,
        url: &str,
        descriptor: &MultipartDescriptor,
        budget: &Semaphore,
    ) -> Result<PartAck, UploadError> {
        let part_number = range.part_number();
        let attempts = self.options.part_retry_attempts.max(1);
        let disposition =
            content_disposition_header(descriptor.content_disposition, &file.name);

        let outcome = retry_with_backoff(&self.options.backoff, attempts, |_attempt| {
            let disposition = disposition.clone();
            async move {
                // Permits are held only while a request is in flight, not
                // across backoff sleeps.
                let _permit = budget.acquire().await.map_err(|_| UploadError::Other {
                    message: "Concurrency budget closed".into(),
                })?;

                let request = HttpRequest::put(url)
                    .header("Content-Type", descriptor.file_type.clone())
                    .header("Content-Disposition", disposition)
                    .bytes(file.slice(range.offset, range.end()).to_vec());

                let response = self.ctx.fetch_storage(request).await?;
                if !response.is_success() {
                    return Err(UploadError::Network {
                        message: format!(
                            "Part {part_number} upload failed: HTTP {} - {}",
                            response.status,
                            response.text()
                        ),
                        retryable: true,
                    });
                }

                let etag = response.header("etag").ok_or_else(|| {
                    UploadError::transient(format!(
                        "Part {part_number} response carried no ETag header"
                    ))
                })?;

                Ok(PartAck {
                    etag: etag.to_string(),
                    part_number,
                })
            }
        })
        .await;

        match outcome {
            Ok(ack) => {
                log::debug!("Part {part_number} of {} uploaded", file.name);
                Ok(ack)
            }
            Err(err) if err.is_retryable() => Err(UploadError::RetriesExhausted {
                part_number,
                attempts,
                message: err.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Execute a single-shot presigned form POST.
    async fn presigned_post_upload(
        &self,
        file: &UploadableFile,
        descriptor: &PresignedPostDescriptor,
        budget: &Semaphore,
    ) -> Result<(), UploadError> {
        let fields = build_post_fields(file, descriptor);

        let _permit = budget.acquire().await.map_err(|_| UploadError::Other {
            message: "Concurrency budget closed".into(),
        })?;

        let request = HttpRequest::post(&descriptor.url)
            .header("Accept", "application/xml")
            .form(fields);

        let response = self.ctx.fetch_storage(request).await?;
        if !response.is_success() {
            return Err(UploadError::StorageRejected {
                status: response.status,
                body: response.text(),
            });
        }

        log::debug!("Presigned POST accepted for {}", file.name);
        Ok(())
    }
}

/// Assemble the form fields for a presigned POST.
///
/// Descriptor fields keep their control-plane iteration order; the file
/// payload is appended strictly last. The storage provider reads the form
/// sequentially and ignores anything after the file, so an earlier payload
/// corrupts the upload.
fn build_post_fields(file: &UploadableFile, descriptor: &PresignedPostDescriptor) -> Vec<FormField> {
    let mut fields: Vec<FormField> = descriptor
        .fields
        .iter()
        .map(|(name, value)| FormField::Text {
            name: name.clone(),
            value: match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
        .collect();

    fields.push(FormField::File {
        name: "file".to_string(),
        file_name: file.name.clone(),
        content_type: file.content_type.clone(),
        data: file.bytes().to_vec(),
    });

    fields
}

/// Header value for the stored object's content disposition.
fn content_disposition_header(disposition: ContentDisposition, file_name: &str) -> String {
    format!("{}; filename=\"{}\"", disposition.as_str(), file_name)
}
