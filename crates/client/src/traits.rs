//! Transport abstraction for all network operations.
//!
//! The orchestration never constructs its own HTTP client: every request
//! goes through an injected [`HttpTransport`] implementation, bundled with
//! the caller's outgoing headers and control-plane base URL in a
//! [`TransportContext`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::UploadError;

/// HTTP method subset used by the orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// One field of a multipart form body.
#[derive(Debug, Clone)]
pub enum FormField {
    /// Plain text field.
    Text { name: String, value: String },
    /// File payload field.
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// Request body variants supported by the transport.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// Raw bytes sent as the entire body.
    Bytes(Vec<u8>),
    /// Multipart form; fields are sent in list order.
    Form(Vec<FormField>),
}

/// An outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Build a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Build a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Build a PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body with the matching content type.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Self, UploadError> {
        let bytes = serde_json::to_vec(value).map_err(|e| UploadError::Other {
            message: format!("Failed to encode request body: {e}"),
        })?;
        Ok(self
            .header("Content-Type", "application/json")
            .bytes(bytes))
    }

    /// Set a raw byte body.
    pub fn bytes(mut self, data: Vec<u8>) -> Self {
        self.body = RequestBody::Bytes(data);
        self
    }

    /// Set a multipart form body.
    pub fn form(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }
}

/// An HTTP response surfaced by the transport.
///
/// The body is fully materialized; the orchestration never streams
/// responses.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body as lossy UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON. A decode failure is a contract error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, UploadError> {
        serde_json::from_slice(&self.body).map_err(UploadError::from)
    }
}

/// Injected fetch capability - implemented by each backend.
///
/// Implementations must map their own failures into
/// [`UploadError::Network`], classifying retryability, and must release
/// held resources (open bodies, timers) when the returned future is
/// dropped.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one HTTP exchange.
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, UploadError>;
}

/// Capability bundle threaded through every component entry point.
///
/// Holds the fetch capability, the outgoing headers applied to every
/// control-plane request, and the control-plane base URL. Shared read-only
/// by all concurrent pipelines.
#[derive(Clone)]
pub struct TransportContext {
    transport: Arc<dyn HttpTransport>,
    headers: Vec<(String, String)>,
    base_url: Url,
}

impl TransportContext {
    /// Create a new context.
    ///
    /// # Arguments
    /// * `transport` - The fetch capability
    /// * `headers` - Outgoing headers for control-plane requests
    /// * `base_url` - Control-plane base URL
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        headers: Vec<(String, String)>,
        base_url: Url,
    ) -> Self {
        Self {
            transport,
            headers,
            base_url,
        }
    }

    /// Generate a control-plane endpoint URL.
    pub fn api_url(&self, path: &str) -> Result<Url, UploadError> {
        self.base_url.join(path).map_err(|e| UploadError::Other {
            message: format!("Failed to build endpoint URL for {path}: {e}"),
        })
    }

    /// Send a request to the control plane, attaching the context headers.
    pub async fn fetch_api(&self, mut request: HttpRequest) -> Result<HttpResponse, UploadError> {
        for (name, value) in &self.headers {
            request.headers.push((name.clone(), value.clone()));
        }
        self.transport.fetch(request).await
    }

    /// Send a request to the storage provider as-is (no context headers;
    /// presigned URLs carry their own authorization).
    pub async fn fetch_storage(&self, request: HttpRequest) -> Result<HttpResponse, UploadError> {
        self.transport.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("ETag".into(), "\"abc\"".into())],
            body: Vec::new(),
        };
        assert_eq!(response.header("etag"), Some("\"abc\""));
        assert_eq!(response.header("ETAG"), Some("\"abc\""));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn test_success_status_range() {
        for (status, expected) in [(199, false), (200, true), (204, true), (299, true), (300, false), (500, false)] {
            let response = HttpResponse {
                status,
                headers: Vec::new(),
                body: Vec::new(),
            };
            assert_eq!(response.is_success(), expected, "status {status}");
        }
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::put("https://example.test/part")
            .header("Content-Type", "image/png")
            .bytes(vec![1, 2, 3]);
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.headers.len(), 1);
        assert!(matches!(request.body, RequestBody::Bytes(ref b) if b.len() == 3));
    }
}
