//! Error types shared by every adapter and the client facade.
//!
//! Adapters classify failures at the HTTP boundary and return one of the
//! variants below; nothing in this crate catches and hides an error. The
//! facade is a pass-through, so callers always see the adapter's
//! classification.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for generation and connectivity calls.
#[derive(Debug, Error, Clone)]
pub enum GenError {
    /// No usable credential for the requested provider/category. Raised
    /// before any network traffic.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// HTTP 401/403 from the provider.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// HTTP 429 from the provider. Never retried by this crate.
    #[error("Rate limit error: {0}")]
    RateLimitError(String),

    /// A 2xx response whose body is missing the fields the provider
    /// documents, or is not valid JSON at all.
    #[error("Response shape error: {0}")]
    ResponseShapeError(String),

    /// Transport-level failure: no HTTP response was received.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A polling adapter exhausted its attempt budget.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// The facade was handed a provider id it has no adapter for.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Any other non-2xx HTTP response, with the parsed error body when the
    /// provider returned one.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<Value>,
    },

    /// Caller-supplied input rejected before any call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller abandoned an in-flight polling operation.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Credential storage backend failure (I/O, corrupt record).
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl GenError {
    /// HTTP status associated with this error, when one exists.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::RateLimitError(_) => Some(429),
            _ => None,
        }
    }

    /// Whether a caller-side retry could plausibly succeed. This crate never
    /// retries on its own; the hint is for the policy layer above it.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitError(_) | Self::NetworkError(_) | Self::TimeoutError(_) => true,
            Self::ApiError { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Shorthand for a response-shape failure with provider context.
    pub(crate) fn shape(provider: &str, what: impl std::fmt::Display) -> Self {
        Self::ResponseShapeError(format!("{provider}: unexpected response shape: {what}"))
    }
}

/// Classify a non-2xx HTTP response into an error variant.
///
/// The body is parsed as JSON on a best-effort basis; non-JSON error bodies
/// are carried verbatim (truncated) so proxies and gateways that return HTML
/// still produce a readable message.
pub fn classify_http_status(provider: &str, status: u16, body: &str) -> GenError {
    let details: Option<Value> = serde_json::from_str(body).ok();
    let snippet = error_message_from_body(details.as_ref(), body);

    match status {
        401 | 403 => GenError::AuthenticationError(format!(
            "{provider}: invalid or expired API key (HTTP {status}): {snippet}"
        )),
        429 => GenError::RateLimitError(format!(
            "{provider}: rate limited, retry later (HTTP 429): {snippet}"
        )),
        _ => GenError::ApiError {
            code: status,
            message: format!("{provider}: request failed (HTTP {status}): {snippet}"),
            details,
        },
    }
}

/// Map a transport-level `reqwest` failure to [`GenError::NetworkError`].
///
/// This failure mode is indistinguishable from a misconfigured endpoint
/// without the hint, so the hint always names the usual suspects.
pub fn network_error(provider: &str, err: &reqwest::Error) -> GenError {
    GenError::NetworkError(format!(
        "{provider}: request could not be sent ({err}); check network connectivity, \
         proxy settings, or the CORS configuration of a custom endpoint"
    ))
}

/// Pull the most useful human-readable message out of a provider error body.
///
/// Understands the OpenAI envelope (`{"error":{"message":...}}`), bare
/// `message` fields, and plain-string `error` fields; otherwise returns a
/// truncated body snippet.
fn error_message_from_body(details: Option<&Value>, raw: &str) -> String {
    if let Some(json) = details {
        if let Some(msg) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = json.get("error").and_then(|e| e.as_str()) {
            return msg.to_string();
        }
        if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }
    truncate(raw.trim(), 200)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_statuses() {
        for status in [401, 403] {
            let err = classify_http_status("openai", status, r#"{"error":{"message":"bad key"}}"#);
            match err {
                GenError::AuthenticationError(msg) => {
                    assert!(msg.contains("invalid or expired"));
                    assert!(msg.contains("bad key"));
                }
                other => panic!("unexpected variant: {other:?}"),
            }
        }
    }

    #[test]
    fn classifies_rate_limit_with_status_in_message() {
        let err = classify_http_status("deepseek", 429, "slow down");
        match err {
            GenError::RateLimitError(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("rate limited, retry later"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn classifies_other_statuses_as_api_error() {
        let err = classify_http_status("stability", 500, "boom");
        assert_eq!(err.status_code(), Some(500));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn tolerates_non_json_error_bodies() {
        let err = classify_http_status("openai", 502, "<html>Bad Gateway</html>");
        match err {
            GenError::ApiError { code, message, details } => {
                assert_eq!(code, 502);
                assert!(message.contains("Bad Gateway"));
                assert!(details.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn rate_limit_reports_status_code() {
        let err = GenError::RateLimitError("x".into());
        assert_eq!(err.status_code(), Some(429));
        assert!(err.is_retryable());
    }

    #[test]
    fn shape_errors_are_not_retryable() {
        assert!(!GenError::shape("openai", "missing choices").is_retryable());
    }
}
