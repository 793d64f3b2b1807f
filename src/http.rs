//! Shared HTTP plumbing: client construction and response handling used by
//! every adapter.

use std::time::Duration;

use serde_json::Value;

use crate::error::{GenError, classify_http_status, network_error};

/// HTTP behavior applied to the shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Whole-request timeout. Keeps calls against unreachable custom
    /// endpoints from hanging indefinitely.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("tripmuse/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Build the shared client. One client is reused across all adapters so
/// connection pools are shared.
pub fn build_client(settings: &HttpSettings) -> Result<reqwest::Client, GenError> {
    reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(settings.user_agent.clone())
        .build()
        .map_err(|e| GenError::ConfigurationError(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request, mapping transport failures to
/// [`GenError::NetworkError`] with the connectivity hint.
pub(crate) async fn send(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, GenError> {
    request.send().await.map_err(|e| network_error(provider, &e))
}

/// Read a response body and classify it.
///
/// Non-2xx statuses are classified via [`classify_http_status`]; a 2xx body
/// that is not valid JSON is a [`GenError::ResponseShapeError`]. The body is
/// always read as text first so non-JSON error bodies survive.
pub(crate) async fn read_json(
    provider: &str,
    response: reqwest::Response,
) -> Result<Value, GenError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| network_error(provider, &e))?;

    if !(200..300).contains(&status) {
        return Err(classify_http_status(provider, status, &text));
    }

    serde_json::from_str(&text)
        .map_err(|e| GenError::shape(provider, format!("body is not valid JSON ({e})")))
}

/// Like [`read_json`], but for probes that only care about the status class.
/// Returns the status code on any HTTP response.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<u16, GenError> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(status);
    }
    let text = response
        .text()
        .await
        .map_err(|e| network_error(provider, &e))?;
    Err(classify_http_status(provider, status, &text))
}

/// Join a base endpoint and a path without doubling slashes, tolerating
/// stored endpoints with or without a trailing slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
