//! reqwest-backed HttpTransport implementation.

use async_trait::async_trait;
use reqwest::multipart;

use uplift_client::{
    FormField, HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, UploadError,
};

use crate::error::TransportError;

/// [`HttpTransport`] implementation using a shared [`reqwest::Client`].
///
/// The underlying client pools connections; clone-cheap and safe to share
/// across concurrent pipelines. Dropping an in-flight request aborts it and
/// releases the connection.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport from a pre-configured client (custom timeouts,
    /// proxies, TLS settings).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, UploadError> {
        log::trace!("{} {}", request.method.as_str(), request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(data) => builder.body(data),
            RequestBody::Form(fields) => {
                let mut form = multipart::Form::new();
                for field in fields {
                    form = match field {
                        FormField::Text { name, value } => form.text(name, value),
                        FormField::File {
                            name,
                            file_name,
                            content_type,
                            data,
                        } => {
                            let part = multipart::Part::bytes(data)
                                .file_name(file_name)
                                .mime_str(&content_type)
                                .map_err(|e| {
                                    TransportError::InvalidRequest(format!(
                                        "Invalid content type {content_type}: {e}"
                                    ))
                                })?;
                            form.part(name, part)
                        }
                    };
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(TransportError::from)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from)?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
