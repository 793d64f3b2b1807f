//! Adapter contracts.
//!
//! One implementation per provider. The two operations deliberately use
//! different failure conventions: `generate` is a command (cost, quota) and
//! returns `Result`, while `test_connection` is a query and always resolves
//! with a [`ConnectionTestResult`], even for missing keys or network
//! failures. Callers rely on that asymmetry.

use async_trait::async_trait;

use crate::error::GenError;
use crate::types::{ConnectionTestResult, ImageOptions, ImageRef, TextOptions};

/// A text-generation provider.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Provider id this adapter serves (matches its descriptor row).
    fn id(&self) -> &'static str;

    /// Generate text for `prompt`. On success the returned string is
    /// trimmed and never empty. An empty `api_key` is a configuration
    /// error for providers that require one.
    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &TextOptions,
    ) -> Result<String, GenError>;

    /// Minimal, low-cost connectivity probe. Never returns an error.
    async fn test_connection(&self, api_key: &str, options: &TextOptions) -> ConnectionTestResult;
}

/// An image-generation provider.
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    fn id(&self) -> &'static str;

    /// Generate an image for `prompt`. The result is always a displayable
    /// reference: a `data:image/...;base64,...` URI or a hosted URL.
    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError>;

    /// Minimal, low-cost connectivity probe. Never returns an error and
    /// must not trigger a full (billed) generation.
    async fn test_connection(&self, api_key: &str, options: &ImageOptions)
    -> ConnectionTestResult;
}
