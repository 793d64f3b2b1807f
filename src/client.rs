//! Unified client facade.
//!
//! One entry point for the three logical operations (generate text,
//! generate image, test connection), dispatching by provider id through the
//! adapter registry. The facade resolves credentials (explicit argument >
//! stored configuration) and merges option layers, but performs no retries
//! and hides no errors: adapters' classifications pass straight through.

use std::sync::Arc;

use tracing::debug;

use crate::config::{self, GlobalPolicy};
use crate::error::GenError;
use crate::http::{HttpSettings, build_client};
use crate::provider;
use crate::registry::AdapterRegistry;
use crate::store::{ApiCredential, CredentialStore, JsonFileBackend, StorageBackend};
use crate::types::{
    Category, ConnectionTestResult, GenerationResult, ImageOptions, ImageRef, TextOptions,
};

/// Unified generation client.
pub struct Client {
    registry: AdapterRegistry,
    store: CredentialStore,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Client with default HTTP settings and an in-memory credential store.
    pub fn new() -> Result<Self, GenError> {
        Self::builder().build()
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// The stored caller-side fallback policy. Reported, never acted on
    /// here: provider switching is the caller's decision.
    pub fn global_policy(&self) -> GlobalPolicy {
        self.store.global_policy()
    }

    /// Generate text with an explicit provider.
    ///
    /// `credential` overrides the stored configuration; when `None`, the
    /// stored text-category credential is used if it belongs to
    /// `provider_id`. Rejects with [`GenError`] on any failure.
    pub async fn generate_text(
        &self,
        provider_id: &str,
        prompt: &str,
        credential: Option<&ApiCredential>,
        options: &TextOptions,
    ) -> Result<String, GenError> {
        non_empty_prompt(prompt)?;
        let adapter = self
            .registry
            .text(provider_id)
            .ok_or_else(|| unsupported(provider_id))?;

        let credential = self.credential_for(provider_id, Category::Text, credential);
        let merged = merge_text_options(options, credential.as_ref());
        let api_key = credential.as_ref().map(|c| c.key().to_string());

        debug!(provider = provider_id, "generate_text dispatch");
        adapter
            .generate(prompt, api_key.as_deref().unwrap_or(""), &merged)
            .await
    }

    /// Generate an image with an explicit provider. Same conventions as
    /// [`Self::generate_text`]; the result is always a displayable
    /// reference (data URI or hosted URL).
    pub async fn generate_image(
        &self,
        provider_id: &str,
        prompt: &str,
        credential: Option<&ApiCredential>,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError> {
        non_empty_prompt(prompt)?;
        let adapter = self
            .registry
            .image(provider_id)
            .ok_or_else(|| unsupported(provider_id))?;

        let credential = self.credential_for(provider_id, Category::Image, credential);
        let merged = merge_image_options(options, credential.as_ref());
        let api_key = credential.as_ref().map(|c| c.key().to_string());

        debug!(provider = provider_id, "generate_image dispatch");
        adapter
            .generate(prompt, api_key.as_deref().unwrap_or(""), &merged)
            .await
    }

    /// Probe a provider's connectivity.
    ///
    /// Always resolves with a report: missing keys, unknown providers, and
    /// network failures all land in `{ success: false, .. }`. Endpoint and
    /// model overrides for the probe ride on the `credential` argument.
    pub async fn test_connection(
        &self,
        provider_id: &str,
        credential: Option<&ApiCredential>,
    ) -> ConnectionTestResult {
        if let Some(adapter) = self.registry.text(provider_id) {
            let credential = self.credential_for(provider_id, Category::Text, credential);
            let options = merge_text_options(&TextOptions::default(), credential.as_ref());
            let api_key = credential.as_ref().map(|c| c.key().to_string());
            return adapter
                .test_connection(api_key.as_deref().unwrap_or(""), &options)
                .await;
        }
        if let Some(adapter) = self.registry.image(provider_id) {
            let credential = self.credential_for(provider_id, Category::Image, credential);
            let options = merge_image_options(&ImageOptions::default(), credential.as_ref());
            let api_key = credential.as_ref().map(|c| c.key().to_string());
            return adapter
                .test_connection(api_key.as_deref().unwrap_or(""), &options)
                .await;
        }
        ConnectionTestResult::fail(format!(
            "unsupported provider \"{provider_id}\"; no adapter is registered for it"
        ))
    }

    /// Generate text with whatever the store says is the active text
    /// provider. Fails closed with a "not configured" error when none is.
    pub async fn generate_text_configured(
        &self,
        prompt: &str,
        options: &TextOptions,
    ) -> Result<String, GenError> {
        let target = config::resolve_category(&self.store, Category::Text)?;
        let credential = ApiCredential {
            provider: target.provider.clone(),
            api_key: target.api_key.clone(),
            endpoint: Some(target.endpoint.clone()),
            model: Some(target.model.clone()),
        };
        self.generate_text(&target.provider, prompt, Some(&credential), options)
            .await
    }

    /// Image-category counterpart of [`Self::generate_text_configured`].
    pub async fn generate_image_configured(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError> {
        let target = config::resolve_category(&self.store, Category::Image)?;
        let credential = ApiCredential {
            provider: target.provider.clone(),
            api_key: target.api_key.clone(),
            endpoint: Some(target.endpoint.clone()),
            model: Some(target.model.clone()),
        };
        self.generate_image(&target.provider, prompt, Some(&credential), options)
            .await
    }

    /// Run either configured pipeline and wrap the outcome in the
    /// category-tagged result union.
    pub async fn generate_configured(
        &self,
        category: Category,
        prompt: &str,
    ) -> Result<GenerationResult, GenError> {
        match category {
            Category::Text => {
                let content = self
                    .generate_text_configured(prompt, &TextOptions::default())
                    .await?;
                Ok(GenerationResult::Text { content })
            }
            Category::Image => {
                let image = self
                    .generate_image_configured(prompt, &ImageOptions::default())
                    .await?;
                Ok(GenerationResult::Image { image })
            }
        }
    }

    /// Probe the active provider for a category.
    pub async fn test_configured(&self, category: Category) -> ConnectionTestResult {
        match config::resolve_category(&self.store, category) {
            Ok(target) => {
                let credential = ApiCredential {
                    provider: target.provider.clone(),
                    api_key: target.api_key,
                    endpoint: Some(target.endpoint),
                    model: Some(target.model),
                };
                self.test_connection(&target.provider, Some(&credential))
                    .await
            }
            Err(e) => ConnectionTestResult::fail(e.to_string()),
        }
    }

    /// Explicit credential wins; otherwise the stored category credential is
    /// used when it belongs to the requested provider.
    fn credential_for(
        &self,
        provider_id: &str,
        category: Category,
        explicit: Option<&ApiCredential>,
    ) -> Option<ApiCredential> {
        if let Some(credential) = explicit {
            return Some(credential.clone());
        }
        self.store
            .get(category)
            .ok()
            .flatten()
            .filter(|stored| stored.provider == provider_id)
    }
}

fn unsupported(provider_id: &str) -> GenError {
    GenError::UnsupportedProvider(format!(
        "no adapter registered for \"{provider_id}\" ({})",
        provider::display_name(provider_id)
    ))
}

fn non_empty_prompt(prompt: &str) -> Result<(), GenError> {
    if prompt.trim().is_empty() {
        return Err(GenError::InvalidInput("prompt must not be empty".to_string()));
    }
    Ok(())
}

/// Layer the stored credential's overrides under the per-call options:
/// explicit option > credential field > adapter default.
fn merge_text_options(options: &TextOptions, credential: Option<&ApiCredential>) -> TextOptions {
    let mut merged = options.clone();
    if let Some(credential) = credential {
        merged.endpoint = merged.endpoint.or_else(|| credential.endpoint.clone());
        merged.model = merged.model.or_else(|| credential.model.clone());
    }
    merged
}

fn merge_image_options(options: &ImageOptions, credential: Option<&ApiCredential>) -> ImageOptions {
    let mut merged = options.clone();
    if let Some(credential) = credential {
        merged.endpoint = merged.endpoint.or_else(|| credential.endpoint.clone());
        merged.model = merged.model.or_else(|| credential.model.clone());
    }
    merged
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    http_settings: HttpSettings,
    backend: Option<Arc<dyn StorageBackend>>,
}

impl ClientBuilder {
    pub fn http_settings(mut self, settings: HttpSettings) -> Self {
        self.http_settings = settings;
        self
    }

    /// Inject a storage backend (defaults to in-memory).
    pub fn storage_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Persist credentials to a JSON file at `path`.
    pub fn storage_file(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.storage_backend(Arc::new(JsonFileBackend::new(path.into())))
    }

    pub fn build(self) -> Result<Client, GenError> {
        let http = build_client(&self.http_settings)?;
        let store = match self.backend {
            Some(backend) => CredentialStore::new(backend),
            None => CredentialStore::in_memory(),
        };
        Ok(Client {
            registry: AdapterRegistry::builtin(&http),
            store,
        })
    }
}
