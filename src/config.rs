//! Config resolution: which provider, key, endpoint, and model a logical
//! request should use.
//!
//! Precedence is always explicit per-call override > stored configuration >
//! compiled-in provider default, implemented as pure functions so the rules
//! are testable without any storage or network.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::GenError;
use crate::provider::{self, ProviderDescriptor};
use crate::store::CredentialStore;
use crate::types::Category;

/// Caller-side fallback policy. This crate only stores and reports it; the
/// adapter layer never switches providers on its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalPolicy {
    /// Prefer configured paid services over free ones when both exist.
    pub prefer_paid_services: bool,
    /// Whether a failed paid call may be retried against a free provider.
    pub fallback_to_free: bool,
}

impl Default for GlobalPolicy {
    fn default() -> Self {
        Self {
            prefer_paid_services: false,
            fallback_to_free: true,
        }
    }
}

/// Fully resolved call target for one category.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub provider: String,
    pub api_key: SecretString,
    pub endpoint: String,
    pub model: String,
}

/// Endpoint precedence: explicit override > stored custom endpoint >
/// provider default. Trailing slashes are stripped so later path joins are
/// uniform.
pub fn resolve_endpoint(explicit: Option<&str>, stored: Option<&str>, default: &str) -> String {
    explicit
        .or(stored)
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// Model precedence, same layering as [`resolve_endpoint`].
pub fn resolve_model(explicit: Option<&str>, stored: Option<&str>, default: &str) -> String {
    explicit.or(stored).unwrap_or(default).to_string()
}

/// Resolve the active stored configuration for a category.
///
/// Fails closed: a missing credential yields a [`GenError::ConfigurationError`]
/// ("not configured"), never a demo key, so callers can report the condition
/// instead of attempting a call that is doomed to 401.
pub fn resolve_category(
    store: &CredentialStore,
    category: Category,
) -> Result<ResolvedTarget, GenError> {
    let Some(credential) = store.get(category)? else {
        return Err(GenError::ConfigurationError(format!(
            "{} generation provider not configured",
            category.as_str()
        )));
    };

    let descriptor = lookup(&credential.provider)?;
    Ok(ResolvedTarget {
        endpoint: resolve_endpoint(
            None,
            credential.endpoint.as_deref(),
            descriptor.default_endpoint,
        ),
        model: resolve_model(None, credential.model.as_deref(), descriptor.default_model),
        provider: credential.provider,
        api_key: credential.api_key,
    })
}

fn lookup(provider_id: &str) -> Result<&'static ProviderDescriptor, GenError> {
    provider::descriptor(provider_id).ok_or_else(|| {
        GenError::UnsupportedProvider(format!("no adapter registered for \"{provider_id}\""))
    })
}
