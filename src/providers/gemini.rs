//! Google Gemini adapter.
//!
//! The third auth shape in the fleet: the key travels as a `?key=` query
//! parameter, not a header. Generation is
//! `POST {base}/models/{model}:generateContent`; the reply carries
//! `candidates[0].content.parts[0].text`. The connectivity probe lists
//! models, which is free.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::GenError;
use crate::http::{join_url, read_json, send};
use crate::provider::{self, ProviderDescriptor};
use crate::traits::TextGeneration;
use crate::types::{ConnectionTestResult, TextOptions};

use super::require_key;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4000;

pub struct GeminiAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
}

impl GeminiAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            descriptor: provider::descriptor("gemini").expect("gemini descriptor is compiled in"),
        }
    }

    fn base_url(&self, options: &TextOptions) -> String {
        resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        )
    }
}

#[async_trait]
impl TextGeneration for GeminiAdapter {
    fn id(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &TextOptions,
    ) -> Result<String, GenError> {
        require_key(self.descriptor, api_key)?;

        let model = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);
        let url = join_url(&self.base_url(options), &format!("models/{model}:generateContent"));

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                "maxOutputTokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            },
        });
        if let Some(system) = &options.system_prompt {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        debug!(provider = "gemini", %model, %url, "generateContent request");

        let request = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body);
        let response = send("gemini", request).await?;
        let json = read_json("gemini", response).await?;

        let content = json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GenError::shape("gemini", "missing `candidates[0].content.parts[0].text`")
            })?;

        let content = content.trim();
        if content.is_empty() {
            return Err(GenError::shape("gemini", "empty completion text"));
        }
        Ok(content.to_string())
    }

    async fn test_connection(&self, api_key: &str, options: &TextOptions) -> ConnectionTestResult {
        if api_key.trim().is_empty() {
            return ConnectionTestResult::not_configured(self.descriptor.name);
        }

        let url = join_url(&self.base_url(options), "models");
        let request = self.http.get(&url).query(&[("key", api_key)]);

        let outcome = match send("gemini", request).await {
            Ok(response) => read_json("gemini", response).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(json) if json.get("models").is_some_and(Value::is_array) => {
                let count = json["models"].as_array().map_or(0, Vec::len);
                ConnectionTestResult::ok_with(
                    "Google Gemini API connection successful",
                    json!({ "models": count }),
                )
            }
            Ok(_) => ConnectionTestResult::fail(
                "Google Gemini responded without a `models` array; check the endpoint",
            ),
            Err(e) => ConnectionTestResult::fail_with(
                "Google Gemini API connection failed",
                json!({ "error": e.to_string() }),
            ),
        }
    }
}
