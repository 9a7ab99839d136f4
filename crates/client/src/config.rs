//! Environment-derived configuration.
//!
//! The API secret and control-plane base URL are resolved from the
//! environment (with `.env` support). A missing secret is a fatal
//! configuration error raised before any network activity, distinct from
//! upload failures.

use dotenvy::dotenv;
use serde::Deserialize;
use url::Url;

use crate::error::UploadError;

/// Environment variable holding the API secret.
pub const ENV_SECRET: &str = "UPLIFT_SECRET";

/// Environment variable overriding the control-plane base URL.
pub const ENV_API_URL: &str = "UPLIFT_API_URL";

/// Default control-plane base URL.
pub const DEFAULT_API_URL: &str = "https://api.uplift.dev";

/// Header carrying the API secret on control-plane requests.
pub const API_KEY_HEADER: &str = "x-uplift-api-key";

#[derive(Debug, Deserialize)]
struct ConfigEnv {
    uplift_secret: Option<String>,
    uplift_api_url: Option<String>,
}

/// Resolved control-plane configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Control-plane base URL.
    pub base_url: Url,
    /// API secret sent on every control-plane request.
    pub secret: String,
}

impl ApiConfig {
    /// Outgoing headers for a [`crate::TransportContext`] built from this
    /// configuration.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![(API_KEY_HEADER.to_string(), self.secret.clone())]
    }
}

/// Reject execution outside a server context.
///
/// The engine handles the API secret and must only run server-side;
/// browser (wasm32) builds are refused up front.
pub fn ensure_server_context() -> Result<(), UploadError> {
    if cfg!(target_arch = "wasm32") {
        return Err(UploadError::config(
            "uplift-client must run server-side; it cannot be used from a browser context",
        ));
    }
    Ok(())
}

/// Read configuration from the environment.
///
/// Loads `.env` if present, then resolves [`ENV_SECRET`] (required) and
/// [`ENV_API_URL`] (defaulting to [`DEFAULT_API_URL`]).
pub fn read_config() -> Result<ApiConfig, UploadError> {
    ensure_server_context()?;
    let _ = dotenv();

    let env_config = envy::from_env::<ConfigEnv>().map_err(|e| {
        UploadError::config(format!("Invalid environment configuration: {e}"))
    })?;

    let secret = env_config.uplift_secret.ok_or_else(|| {
        UploadError::config(format!("No API secret found; set {ENV_SECRET}"))
    })?;

    let base_url = resolve_base_url(env_config.uplift_api_url)?;

    Ok(ApiConfig { base_url, secret })
}

/// Resolve the control-plane base URL, defaulting when the override is
/// unset. A malformed override is a configuration error naming the
/// variable, not a missing-secret report.
fn resolve_base_url(raw: Option<String>) -> Result<Url, UploadError> {
    match raw {
        Some(raw) => Url::parse(&raw).map_err(|e| {
            UploadError::config(format!("Invalid {ENV_API_URL} value \"{raw}\": {e}"))
        }),
        None => Url::parse(DEFAULT_API_URL).map_err(|e| UploadError::Other {
            message: format!("Invalid default API URL: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_carry_secret() {
        let config = ApiConfig {
            base_url: Url::parse(DEFAULT_API_URL).unwrap(),
            secret: "sk_test_123".into(),
        };
        let headers = config.headers();
        assert_eq!(headers, vec![(API_KEY_HEADER.to_string(), "sk_test_123".to_string())]);
    }

    #[test]
    fn test_server_context_allowed_on_native_targets() {
        assert!(ensure_server_context().is_ok());
    }

    #[test]
    fn test_base_url_defaults_when_unset() {
        let url = resolve_base_url(None).unwrap();
        assert_eq!(url.as_str(), "https://api.uplift.dev/");
    }

    #[test]
    fn test_base_url_override_is_used() {
        let url = resolve_base_url(Some("https://api.example.test".into())).unwrap();
        assert_eq!(url.host_str(), Some("api.example.test"));
    }

    #[test]
    fn test_malformed_base_url_is_a_config_error() {
        let err = resolve_base_url(Some("not a url".into())).unwrap_err();
        match err {
            UploadError::Config { message } => {
                assert!(message.contains(ENV_API_URL), "message: {message}");
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
