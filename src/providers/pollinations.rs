//! Pollinations.AI adapter: the free, no-key image provider.
//!
//! Generation is a plain GET of `{base}/prompt/{urlencoded prompt}`; the
//! service renders the image when the URL is fetched, so the adapter returns
//! the request URL itself as the hosted-URL form of [`ImageRef`]. An API key
//! is accepted and ignored so the provider fits the uniform contract.

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::GenError;
use crate::http::{check_status, join_url, send};
use crate::provider::{self, ProviderDescriptor};
use crate::traits::ImageGeneration;
use crate::types::{ConnectionTestResult, ImageOptions, ImageRef};

const DEFAULT_DIMENSION: u32 = 1024;
/// The service truncates long prompts anyway; clamping client-side keeps the
/// URL well under header limits.
const MAX_PROMPT_CHARS: usize = 200;

pub struct PollinationsAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
}

impl PollinationsAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            descriptor: provider::descriptor("pollinations")
                .expect("pollinations descriptor is compiled in"),
        }
    }

    fn image_url(&self, prompt: &str, options: &ImageOptions) -> String {
        let base = resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        );
        let model = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);
        let seed = options
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..1_000_000_000));

        let encoded = urlencoding::encode(&sanitize_prompt(prompt)).into_owned();
        format!(
            "{}?width={}&height={}&model={}&seed={}&enhance=true&nologo=true",
            join_url(&base, &format!("prompt/{encoded}")),
            options.width.unwrap_or(DEFAULT_DIMENSION),
            options.height.unwrap_or(DEFAULT_DIMENSION),
            model,
            seed,
        )
    }
}

/// Strip control characters and clamp length; the prompt travels in the URL
/// path.
fn sanitize_prompt(prompt: &str) -> String {
    prompt
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_PROMPT_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

#[async_trait]
impl ImageGeneration for PollinationsAdapter {
    fn id(&self) -> &'static str {
        "pollinations"
    }

    async fn generate(
        &self,
        prompt: &str,
        _api_key: &str,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError> {
        let sanitized = sanitize_prompt(prompt);
        if sanitized.is_empty() {
            return Err(GenError::InvalidInput(
                "pollinations: prompt is empty after sanitization".to_string(),
            ));
        }

        let url = self.image_url(prompt, options);
        debug!(provider = "pollinations", %url, "image URL built");
        Ok(ImageRef::url(url))
    }

    async fn test_connection(
        &self,
        _api_key: &str,
        options: &ImageOptions,
    ) -> ConnectionTestResult {
        // Fetch a tiny probe image; the render cost is negligible at 64px.
        let probe_options = ImageOptions {
            width: Some(64),
            height: Some(64),
            seed: Some(1),
            endpoint: options.endpoint.clone(),
            ..ImageOptions::default()
        };

        let url = self.image_url("test", &probe_options);
        let request = self.http.get(&url).header("Accept", "image/*");

        let outcome = match send("pollinations", request).await {
            Ok(response) => check_status("pollinations", response).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(_) => ConnectionTestResult::ok(
                "Pollinations.AI reachable; no API key required",
            ),
            Err(e) => ConnectionTestResult::fail_with(
                "Pollinations.AI connection failed",
                json!({ "error": e.to_string() }),
            ),
        }
    }
}
