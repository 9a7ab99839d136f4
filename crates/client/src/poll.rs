//! Completion polling.
//!
//! After byte transfer succeeds the control plane's view of the upload is
//! eventually consistent; the poller retries a status GET under the shared
//! backoff schedule until the terminal `"done"` status appears.

use crate::api;
use crate::error::UploadError;
use crate::traits::TransportContext;
use crate::types::BackoffSettings;

/// Poll until the upload for `key` reaches the terminal `"done"` status.
///
/// Any non-terminal status (including an empty string) schedules another
/// poll after backoff; there is no attempt cap. A transport-level error is
/// fatal, not a reason to keep polling.
pub async fn wait_until_done(
    ctx: &TransportContext,
    key: &str,
    backoff: &BackoffSettings,
) -> Result<(), UploadError> {
    let mut attempt = 0u32;
    loop {
        let status = api::poll_upload_once(ctx, key).await?;
        if status.is_done() {
            log::debug!("Upload {key} reported done after {attempt} retries");
            return Ok(());
        }

        let delay = backoff.delay_for_attempt(attempt);
        log::debug!(
            "Upload {key} not ready (status \"{}\"), polling again in {:?}",
            status.status,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}
