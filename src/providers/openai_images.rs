//! Adapter for OpenAI-style image generation endpoints.
//!
//! Serves DALL-E itself plus the aggregators that clone its wire format:
//! Tencent Hunyuan's image API, DMXAPI (Seedream models), and B3N (which
//! clones the body but expects a bare `Authorization: <key>` header). The
//! response carries `data[0].b64_json` or `data[0].url`; both normalize to
//! one displayable [`ImageRef`].

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::GenError;
use crate::http::{check_status, join_url, read_json, send};
use crate::provider::ProviderDescriptor;
use crate::traits::ImageGeneration;
use crate::types::{ConnectionTestResult, ImageOptions, ImageRef};

use super::{apply_auth, require_key};

const DEFAULT_SIZE: &str = "1024x1024";

pub struct OpenAiImagesAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
}

impl OpenAiImagesAdapter {
    pub fn new(http: reqwest::Client, descriptor: &'static ProviderDescriptor) -> Self {
        Self { http, descriptor }
    }

    fn base_url(&self, options: &ImageOptions) -> String {
        resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        )
    }

    fn size(options: &ImageOptions) -> String {
        if let Some(size) = &options.size {
            return size.clone();
        }
        match (options.width, options.height) {
            (Some(w), Some(h)) => format!("{w}x{h}"),
            _ => DEFAULT_SIZE.to_string(),
        }
    }
}

#[async_trait]
impl ImageGeneration for OpenAiImagesAdapter {
    fn id(&self) -> &'static str {
        self.descriptor.id
    }

    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError> {
        require_key(self.descriptor, api_key)?;

        let model = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);
        let mut body = json!({
            "model": model,
            "prompt": prompt,
            "n": 1,
            "size": Self::size(options),
            "response_format": "b64_json",
        });
        if let Some(quality) = &options.quality {
            body["quality"] = json!(quality);
        }
        if let Some(style) = &options.style {
            body["style"] = json!(style);
        }
        if let Some(negative) = &options.negative_prompt {
            body["negative_prompt"] = json!(negative);
        }

        let url = join_url(&self.base_url(options), "images/generations");
        debug!(provider = self.descriptor.id, %model, %url, "image generation request");

        let request = apply_auth(
            self.http.post(&url).json(&body),
            self.descriptor.auth,
            api_key,
        );
        let response = send(self.descriptor.id, request).await?;
        let json = read_json(self.descriptor.id, response).await?;

        let first = json
            .get("data")
            .and_then(|d| d.get(0))
            .ok_or_else(|| GenError::shape(self.descriptor.id, "missing `data[0]`"))?;

        if let Some(b64) = first.get("b64_json").and_then(Value::as_str) {
            return Ok(ImageRef::data_uri("png", b64));
        }
        if let Some(url) = first.get("url").and_then(Value::as_str) {
            return Ok(ImageRef::url(url));
        }
        Err(GenError::shape(
            self.descriptor.id,
            "`data[0]` has neither `b64_json` nor `url`",
        ))
    }

    async fn test_connection(
        &self,
        api_key: &str,
        options: &ImageOptions,
    ) -> ConnectionTestResult {
        if api_key.trim().is_empty() {
            return ConnectionTestResult::not_configured(self.descriptor.name);
        }

        // Model listing is free, unlike an image generation.
        let url = join_url(&self.base_url(options), "models");
        let request = apply_auth(self.http.get(&url), self.descriptor.auth, api_key);

        let outcome = match send(self.descriptor.id, request).await {
            Ok(response) => check_status(self.descriptor.id, response).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(_) => ConnectionTestResult::ok(format!(
                "{} API connection successful",
                self.descriptor.name
            )),
            Err(e) => ConnectionTestResult::fail_with(
                format!("{} API connection failed", self.descriptor.name),
                json!({ "error": e.to_string() }),
            ),
        }
    }
}
