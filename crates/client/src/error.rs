//! Error types for upload orchestration.

use thiserror::Error;

/// Errors that can occur while orchestrating an upload batch.
///
/// Every variant is a stable machine-readable kind; diagnostic detail
/// (raw response bodies, underlying messages) is carried in the fields
/// rather than swallowed.
#[derive(Error, Debug, Clone)]
pub enum UploadError {
    /// Invalid or missing configuration (e.g. no API secret in the
    /// environment, or running outside a server context). Raised before
    /// any network activity.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// The control plane returned a response that violates its contract
    /// (undecodable shape, descriptor count mismatch). Aborts the batch.
    #[error("Control plane contract violation: {message}")]
    Contract { message: String },

    /// Network-level failure or non-2xx response on a retryable operation.
    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    /// A bounded-retry operation exhausted its attempt budget.
    #[error("Part {part_number} failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        part_number: u32,
        attempts: u32,
        message: String,
    },

    /// The storage provider rejected a presigned POST. The response body
    /// text is attached as diagnostic detail.
    #[error("Storage provider rejected upload (HTTP {status}): {body}")]
    StorageRejected { status: u16, body: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl UploadError {
    /// Check if this error is retryable under the backoff schedule.
    pub fn is_retryable(&self) -> bool {
        match self {
            UploadError::Network { retryable, .. } => *retryable,
            UploadError::Config { .. } => false,
            UploadError::Contract { .. } => false,
            UploadError::RetriesExhausted { .. } => false,
            UploadError::StorageRejected { .. } => false,
            UploadError::Other { .. } => false,
        }
    }

    /// Create a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        UploadError::Contract {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        UploadError::Config {
            message: message.into(),
        }
    }

    /// Create a retryable network error.
    pub fn transient(message: impl Into<String>) -> Self {
        UploadError::Network {
            message: message.into(),
            retryable: true,
        }
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::Contract {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(UploadError::transient("connection reset").is_retryable());
        assert!(
            !UploadError::Network {
                message: "bad request".into(),
                retryable: false,
            }
            .is_retryable()
        );
        assert!(!UploadError::config("no secret").is_retryable());
        assert!(!UploadError::contract("count mismatch").is_retryable());
        assert!(
            !UploadError::RetriesExhausted {
                part_number: 3,
                attempts: 10,
                message: "timeout".into(),
            }
            .is_retryable()
        );
        assert!(
            !UploadError::StorageRejected {
                status: 403,
                body: "<Error/>".into(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_decode_failure_is_contract_error() {
        let err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let upload_err: UploadError = err.into();
        assert!(matches!(upload_err, UploadError::Contract { .. }));
    }
}
