//! Stability AI text-to-image adapter.
//!
//! `POST {base}/v1/generation/{engine}/text-to-image` with weighted
//! `text_prompts`; the reply carries base64 payloads in `artifacts[]`. The
//! connectivity probe hits the free account endpoint instead of burning
//! generation credits.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::GenError;
use crate::http::{join_url, read_json, send};
use crate::provider::{self, ProviderDescriptor};
use crate::traits::ImageGeneration;
use crate::types::{ConnectionTestResult, ImageOptions, ImageRef};

use super::require_key;

const DEFAULT_DIMENSION: u32 = 1024;
const DEFAULT_STEPS: u32 = 30;
const DEFAULT_CFG_SCALE: f32 = 7.0;

/// Style presets accepted by the v1 generation API.
pub const STYLE_PRESETS: &[&str] = &[
    "enhance",
    "anime",
    "photographic",
    "digital-art",
    "comic-book",
    "fantasy-art",
    "line-art",
    "analog-film",
    "neon-punk",
    "isometric",
    "low-poly",
    "origami",
    "modeling-compound",
    "cinematic",
    "pixel-art",
];

pub struct StabilityAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
}

impl StabilityAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            descriptor: provider::descriptor("stability")
                .expect("stability descriptor is compiled in"),
        }
    }
}

#[async_trait]
impl ImageGeneration for StabilityAdapter {
    fn id(&self) -> &'static str {
        "stability"
    }

    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError> {
        require_key(self.descriptor, api_key)?;

        let engine = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);
        let base = resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        );
        let url = join_url(&base, &format!("v1/generation/{engine}/text-to-image"));

        let mut text_prompts = vec![json!({ "text": prompt, "weight": 1.0 })];
        if let Some(negative) = &options.negative_prompt {
            text_prompts.push(json!({ "text": negative, "weight": -1.0 }));
        }

        let mut body = json!({
            "text_prompts": text_prompts,
            "cfg_scale": options.cfg_scale.unwrap_or(DEFAULT_CFG_SCALE),
            "width": options.width.unwrap_or(DEFAULT_DIMENSION),
            "height": options.height.unwrap_or(DEFAULT_DIMENSION),
            "samples": 1,
            "steps": options.steps.unwrap_or(DEFAULT_STEPS),
        });
        if let Some(preset) = &options.style_preset {
            body["style_preset"] = json!(preset);
        }
        if let Some(seed) = options.seed {
            body["seed"] = json!(seed);
        }

        debug!(provider = "stability", %engine, %url, "text-to-image request");

        let request = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(&body);
        let response = send("stability", request).await?;
        let json = read_json("stability", response).await?;

        let artifact = json
            .get("artifacts")
            .and_then(|a| a.get(0))
            .ok_or_else(|| GenError::shape("stability", "missing `artifacts[0]`"))?;

        if let Some(reason) = artifact.get("finish_reason").and_then(Value::as_str)
            && reason == "CONTENT_FILTERED"
        {
            return Err(GenError::ApiError {
                code: 200,
                message: "stability: generation blocked by the content filter".to_string(),
                details: Some(artifact.clone()),
            });
        }

        let b64 = artifact
            .get("base64")
            .and_then(Value::as_str)
            .ok_or_else(|| GenError::shape("stability", "missing `artifacts[0].base64`"))?;
        Ok(ImageRef::data_uri("png", b64))
    }

    async fn test_connection(
        &self,
        api_key: &str,
        options: &ImageOptions,
    ) -> ConnectionTestResult {
        if api_key.trim().is_empty() {
            return ConnectionTestResult::not_configured(self.descriptor.name);
        }

        let base = resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        );
        let url = join_url(&base, "v1/user/account");
        let request = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .header("Accept", "application/json");

        let outcome = match send("stability", request).await {
            Ok(response) => read_json("stability", response).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(account) => ConnectionTestResult::ok_with(
                "Stability AI API connection successful",
                json!({
                    "credits": account.get("credits").cloned().unwrap_or(Value::Null),
                    "id": account.get("id").cloned().unwrap_or(Value::Null),
                }),
            ),
            Err(e) => ConnectionTestResult::fail_with(
                "Stability AI API connection failed",
                json!({ "error": e.to_string() }),
            ),
        }
    }
}
