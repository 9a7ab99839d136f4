//! reqwest backend for the uplift upload orchestration.
//!
//! This crate provides an [`uplift_client::HttpTransport`] implementation
//! backed by `reqwest`, covering raw byte bodies for multipart part PUTs
//! and multipart form assembly for presigned POSTs.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use uplift_client::{read_config, TransportContext};
//! use uplift_transport_reqwest::ReqwestTransport;
//!
//! let config = read_config()?;
//! let ctx = TransportContext::new(
//!     Arc::new(ReqwestTransport::new()),
//!     config.headers(),
//!     config.base_url,
//! );
//! ```

mod client;
mod error;

pub use client::ReqwestTransport;
pub use error::TransportError;
