//! Error types for the reqwest transport.

use thiserror::Error;
use uplift_client::UploadError;

/// Errors specific to the reqwest transport backend.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP-level failure from reqwest.
    #[error("HTTP error: {message}")]
    Http { message: String, retryable: bool },

    /// The request could not be constructed (e.g. invalid MIME type).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts, connection resets, and interrupted bodies are worth
        // another attempt; builder errors are not.
        let retryable = err.is_timeout() || err.is_connect() || err.is_body();
        TransportError::Http {
            message: err.to_string(),
            retryable,
        }
    }
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { message, retryable } => {
                UploadError::Network { message, retryable }
            }
            TransportError::InvalidRequest(message) => UploadError::Other { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_maps_to_network() {
        let err = TransportError::Http {
            message: "connection reset".into(),
            retryable: true,
        };
        let upload_err: UploadError = err.into();
        assert!(matches!(
            upload_err,
            UploadError::Network { retryable: true, .. }
        ));
    }

    #[test]
    fn test_invalid_request_is_not_retryable() {
        let err = TransportError::InvalidRequest("bad mime".into());
        let upload_err: UploadError = err.into();
        assert!(!upload_err.is_retryable());
    }
}
