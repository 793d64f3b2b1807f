//! Provider adapters.
//!
//! Each adapter translates the uniform generate/test contract into one
//! external service's HTTP protocol. OpenAI-compatible chat services share a
//! single implementation parameterized by their descriptor row; everything
//! else is a dedicated adapter.

pub mod anthropic;
pub mod gemini;
pub mod openai_compatible;
pub mod openai_images;
pub mod pollinations;
pub mod stability;
pub mod wavespeed;

use crate::error::GenError;
use crate::provider::{AuthScheme, ProviderDescriptor};

/// Attach the provider's credential header. The shape is fixed per provider:
/// sending a Bearer prefix to a raw-header service (or vice versa) produces
/// silent 401s.
pub(crate) fn apply_auth(
    request: reqwest::RequestBuilder,
    auth: AuthScheme,
    api_key: &str,
) -> reqwest::RequestBuilder {
    match auth {
        AuthScheme::Bearer => request.bearer_auth(api_key),
        AuthScheme::RawAuthorization => request.header("Authorization", api_key),
        AuthScheme::XApiKey => request.header("x-api-key", api_key),
        // Query-key providers put the key in the URL themselves.
        AuthScheme::QueryKey | AuthScheme::None => request,
    }
}

/// Reject calls that would go out without a key the provider requires.
/// Raised before any network traffic.
pub(crate) fn require_key(
    descriptor: &ProviderDescriptor,
    api_key: &str,
) -> Result<(), GenError> {
    if descriptor.requires_api_key && api_key.trim().is_empty() {
        return Err(GenError::ConfigurationError(format!(
            "{} API key not configured",
            descriptor.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let desc = provider::descriptor("openai").unwrap();
        let err = require_key(desc, "  ").unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn free_providers_skip_the_key_check() {
        let desc = provider::descriptor("pollinations").unwrap();
        assert!(require_key(desc, "").is_ok());
    }
}
