//! Adapter registry: provider id → adapter instance.
//!
//! Built once at client construction; dispatch is a map lookup, and adding a
//! provider is a registration, not a code-wide edit.

use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::PROVIDERS;
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::gemini::GeminiAdapter;
use crate::providers::openai_compatible::CompatChatAdapter;
use crate::providers::openai_images::OpenAiImagesAdapter;
use crate::providers::pollinations::PollinationsAdapter;
use crate::providers::stability::StabilityAdapter;
use crate::providers::wavespeed::WaveSpeedAdapter;
use crate::traits::{ImageGeneration, TextGeneration};

#[derive(Default)]
pub struct AdapterRegistry {
    text: HashMap<&'static str, Arc<dyn TextGeneration>>,
    image: HashMap<&'static str, Arc<dyn ImageGeneration>>,
}

impl AdapterRegistry {
    /// Registry with no adapters; useful for tests that register their own.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry wired with every compiled-in provider.
    pub fn builtin(http: &reqwest::Client) -> Self {
        let mut registry = Self::empty();

        for descriptor in PROVIDERS {
            match descriptor.id {
                "claude" => {
                    registry.register_text(Arc::new(AnthropicAdapter::new(http.clone())));
                }
                "gemini" => {
                    registry.register_text(Arc::new(GeminiAdapter::new(http.clone())));
                }
                "stability" => {
                    registry.register_image(Arc::new(StabilityAdapter::new(http.clone())));
                }
                "wavespeed" => {
                    registry.register_image(Arc::new(WaveSpeedAdapter::new(http.clone())));
                }
                "pollinations" => {
                    registry.register_image(Arc::new(PollinationsAdapter::new(http.clone())));
                }
                "openai_dalle" | "hunyuan_image" | "dmxapi" | "b3n" => {
                    registry.register_image(Arc::new(OpenAiImagesAdapter::new(
                        http.clone(),
                        descriptor,
                    )));
                }
                _ if descriptor.category.serves_text() => {
                    registry
                        .register_text(Arc::new(CompatChatAdapter::new(http.clone(), descriptor)));
                }
                other => {
                    debug_assert!(false, "descriptor {other} has no adapter wiring");
                }
            }
        }

        registry
    }

    pub fn register_text(&mut self, adapter: Arc<dyn TextGeneration>) {
        self.text.insert(adapter.id(), adapter);
    }

    pub fn register_image(&mut self, adapter: Arc<dyn ImageGeneration>) {
        self.image.insert(adapter.id(), adapter);
    }

    pub fn text(&self, provider_id: &str) -> Option<Arc<dyn TextGeneration>> {
        self.text.get(provider_id).cloned()
    }

    pub fn image(&self, provider_id: &str) -> Option<Arc<dyn ImageGeneration>> {
        self.image.get(provider_id).cloned()
    }

    pub fn text_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.text.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn image_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.image.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
