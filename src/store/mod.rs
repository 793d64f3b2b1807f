//! Credential persistence.
//!
//! All key material flows through [`CredentialStore`], which talks to an
//! injected [`StorageBackend`]: in-memory for tests, a JSON file in
//! production. Nothing else in the crate touches storage, and keys are held
//! as [`SecretString`] once loaded.
//!
//! Records are written whole (last-write-wins); concurrent writers from
//! another process can race, which is an accepted limitation.

mod file;
mod memory;

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::GlobalPolicy;
use crate::error::GenError;
use crate::provider;
use crate::types::Category;

/// A stored credential for one provider.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    pub provider: String,
    pub api_key: SecretString,
    /// Custom endpoint override for self-hosted/proxy/mirror deployments.
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

impl ApiCredential {
    pub fn new(provider: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: SecretString::from(api_key.into()),
            endpoint: None,
            model: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The raw key, exposed only at the HTTP boundary.
    pub fn key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Pluggable blob storage. Values are opaque JSON strings under namespaced
/// keys; backends never interpret them.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    fn load(&self, key: &str) -> Result<Option<String>, GenError>;
    fn save(&self, key: &str, value: &str) -> Result<(), GenError>;
    fn remove(&self, key: &str) -> Result<(), GenError>;
}

/// Wire form of a credential record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    provider: String,
    api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl From<StoredCredential> for ApiCredential {
    fn from(raw: StoredCredential) -> Self {
        Self {
            provider: raw.provider,
            api_key: SecretString::from(raw.api_key),
            endpoint: raw.endpoint,
            model: raw.model,
        }
    }
}

const KEY_PREFIX: &str = "tripmuse.credential";
const KEY_POLICY: &str = "tripmuse.policy";
const KEY_IMAGE_MODEL: &str = "tripmuse.image-model";

fn category_key(category: Category) -> String {
    format!("{KEY_PREFIX}.{}", category.as_str())
}

/// Credential store scoped to one user profile.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// In-memory store, mainly for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Save the active credential for a category.
    ///
    /// The key must be non-empty after trimming. Provider key-prefix
    /// mismatches are logged but never block the save: format hints are
    /// advisory, providers change key formats.
    pub fn set(
        &self,
        category: Category,
        provider: &str,
        api_key: &str,
        endpoint: Option<&str>,
        model: Option<&str>,
    ) -> Result<(), GenError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GenError::InvalidInput(
                "API key must not be empty".to_string(),
            ));
        }
        if provider.trim().is_empty() {
            return Err(GenError::InvalidInput(
                "provider id must not be empty".to_string(),
            ));
        }
        if let Some(hint) = provider::key_format_hint(provider, api_key) {
            warn!(provider, "{hint}");
        }

        let record = StoredCredential {
            provider: provider.to_string(),
            api_key: api_key.to_string(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            model: model.map(str::to_string),
        };
        let blob = serde_json::to_string(&record)
            .map_err(|e| GenError::StorageError(format!("failed to encode credential: {e}")))?;
        self.backend.save(&category_key(category), &blob)
    }

    /// The active credential for a category, if one is stored.
    pub fn get(&self, category: Category) -> Result<Option<ApiCredential>, GenError> {
        let Some(blob) = self.backend.load(&category_key(category))? else {
            return Ok(None);
        };
        let raw: StoredCredential = serde_json::from_str(&blob)
            .map_err(|e| GenError::StorageError(format!("corrupt credential record: {e}")))?;
        // An empty key on disk means the credential was cleared in place.
        if raw.api_key.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(raw.into()))
    }

    pub fn clear(&self, category: Category) -> Result<(), GenError> {
        self.backend.remove(&category_key(category))
    }

    /// Whether a usable credential exists for a category. Backend failures
    /// are reported as "no credential" so callers fail closed.
    pub fn has(&self, category: Category) -> bool {
        match self.get(category) {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!(category = category.as_str(), "credential lookup failed: {e}");
                false
            }
        }
    }

    /// Persist the caller-side fallback policy.
    pub fn set_global_policy(&self, policy: &GlobalPolicy) -> Result<(), GenError> {
        let blob = serde_json::to_string(policy)
            .map_err(|e| GenError::StorageError(format!("failed to encode policy: {e}")))?;
        self.backend.save(KEY_POLICY, &blob)
    }

    /// The stored fallback policy, or defaults when none was saved.
    pub fn global_policy(&self) -> GlobalPolicy {
        let loaded = self
            .backend
            .load(KEY_POLICY)
            .ok()
            .flatten()
            .and_then(|blob| serde_json::from_str(&blob).ok());
        loaded.unwrap_or_default()
    }

    /// Save the standalone image-model credential (the aggregator slot kept
    /// separate from the per-category configuration).
    pub fn set_image_model(&self, provider: &str, api_key: &str) -> Result<(), GenError> {
        let api_key = api_key.trim();
        if provider.trim().is_empty() || api_key.is_empty() {
            return Err(GenError::InvalidInput(
                "image-model provider and API key must not be empty".to_string(),
            ));
        }
        let record = StoredCredential {
            provider: provider.to_string(),
            api_key: api_key.to_string(),
            endpoint: None,
            model: None,
        };
        let blob = serde_json::to_string(&record)
            .map_err(|e| GenError::StorageError(format!("failed to encode credential: {e}")))?;
        self.backend.save(KEY_IMAGE_MODEL, &blob)
    }

    pub fn image_model(&self) -> Result<Option<ApiCredential>, GenError> {
        let Some(blob) = self.backend.load(KEY_IMAGE_MODEL)? else {
            return Ok(None);
        };
        let raw: StoredCredential = serde_json::from_str(&blob)
            .map_err(|e| GenError::StorageError(format!("corrupt credential record: {e}")))?;
        Ok(Some(raw.into()))
    }

    pub fn clear_image_model(&self) -> Result<(), GenError> {
        self.backend.remove(KEY_IMAGE_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_clear() {
        let store = CredentialStore::in_memory();
        assert!(!store.has(Category::Text));

        store
            .set(Category::Text, "openai", "sk-test", None, None)
            .unwrap();
        let cred = store.get(Category::Text).unwrap().unwrap();
        assert_eq!(cred.provider, "openai");
        assert_eq!(cred.key(), "sk-test");
        assert!(store.has(Category::Text));

        store.clear(Category::Text).unwrap();
        assert!(!store.has(Category::Text));
    }

    #[test]
    fn categories_are_independent() {
        let store = CredentialStore::in_memory();
        store
            .set(Category::Image, "stability", "sk-img", None, None)
            .unwrap();
        assert!(store.has(Category::Image));
        assert!(!store.has(Category::Text));
    }

    #[test]
    fn rejects_empty_key_but_not_odd_formats() {
        let store = CredentialStore::in_memory();
        assert!(matches!(
            store.set(Category::Text, "openai", "   ", None, None),
            Err(GenError::InvalidInput(_))
        ));
        // Key prefix mismatch is advisory only.
        store
            .set(Category::Text, "openai", "not-an-sk-key", None, None)
            .unwrap();
        assert!(store.has(Category::Text));
    }

    #[test]
    fn key_is_trimmed_on_write() {
        let store = CredentialStore::in_memory();
        store
            .set(Category::Text, "deepseek", "  sk-x  ", None, None)
            .unwrap();
        assert_eq!(store.get(Category::Text).unwrap().unwrap().key(), "sk-x");
    }

    #[test]
    fn endpoint_trailing_slash_is_normalized() {
        let store = CredentialStore::in_memory();
        store
            .set(
                Category::Text,
                "openai",
                "sk-x",
                Some("https://proxy.example.com/v1/"),
                Some("gpt-4o-mini"),
            )
            .unwrap();
        let cred = store.get(Category::Text).unwrap().unwrap();
        assert_eq!(cred.endpoint.as_deref(), Some("https://proxy.example.com/v1"));
        assert_eq!(cred.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn image_model_slot_is_separate() {
        let store = CredentialStore::in_memory();
        store.set_image_model("wavespeed", "ws-key").unwrap();
        assert!(store.get(Category::Image).unwrap().is_none());
        let cred = store.image_model().unwrap().unwrap();
        assert_eq!(cred.provider, "wavespeed");
        store.clear_image_model().unwrap();
        assert!(store.image_model().unwrap().is_none());
    }

    #[test]
    fn policy_defaults_when_unset() {
        let store = CredentialStore::in_memory();
        let policy = store.global_policy();
        assert!(!policy.prefer_paid_services);
        assert!(policy.fallback_to_free);
    }
}
